use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Run configuration: where the rate sheets live, where results go, and how
/// to reach the classifier. Credentials stay here (or in the environment)
/// and are handed to the classifier explicitly — never set process-wide.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub rates: RatesConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

#[derive(Debug, Deserialize)]
pub struct RatesConfig {
    pub general: PathBuf,
    pub special: PathBuf,
    pub miles: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub points: PathBuf,
    pub miles: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ClassifierSection {
    /// Falls back to the OPENAI_API_KEY environment variable when absent.
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        ClassifierSection {
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
