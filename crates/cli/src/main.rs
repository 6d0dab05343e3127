use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use milemax_classify::{ClassifierConfig, OpenAiClassifier};
use milemax_engine::{MilesConverter, PartialRatioScorer, RewardEngine};
use milemax_import::{
    export_miles_to_path, export_points_matrix_to_path, load_rate_tables_from_paths,
    load_statement_from_path,
};

mod config;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(statement_path) = args.next().map(PathBuf::from) else {
        bail!("Usage: milemax <statement.csv> [config.toml]");
    };
    let config_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("milemax.toml"));

    let config = config::Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let rates = load_rate_tables_from_paths(
        &config.rates.general,
        &config.rates.special,
        &config.rates.miles,
    )
    .context("Failed to load rate tables")?;
    tracing::info!(
        cards = rates.general().len(),
        special_rules = rates.special().len(),
        miles_rates = rates.miles().len(),
        "Loaded rate tables"
    );

    let statement = load_statement_from_path(&statement_path)
        .with_context(|| format!("Failed to load statement {}", statement_path.display()))?;
    for row in &statement.rejected {
        tracing::warn!(line = row.line, reason = %row.reason, "Rejected statement row");
    }
    tracing::info!(
        transactions = statement.transactions.len(),
        rejected = statement.rejected.len(),
        "Loaded statement"
    );

    let api_key = config
        .classifier
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .context("No classifier API key: set [classifier].api_key or OPENAI_API_KEY")?;
    let classifier = OpenAiClassifier::new(ClassifierConfig::new(api_key, config.classifier.model));

    let engine = RewardEngine::new(&rates, PartialRatioScorer, classifier);
    let matrix = engine
        .calculate(&statement.transactions)
        .context("Reward calculation failed")?;

    let miles = MilesConverter::convert(rates.miles(), &matrix);

    export_points_matrix_to_path(&config.output.points, &statement.transactions, &matrix)
        .context("Failed to write points export")?;
    export_miles_to_path(&config.output.miles, &miles)
        .context("Failed to write miles export")?;

    for card in matrix.cards() {
        println!("{card}: {} points", matrix.total(card).unwrap_or(0));
    }
    match MilesConverter::best(&miles) {
        Some(best) => println!(
            "Best pairing: {} with {} — {} miles",
            best.card_name, best.airline_service, best.calculated_miles
        ),
        None => println!("No miles conversion rates configured"),
    }

    Ok(())
}
