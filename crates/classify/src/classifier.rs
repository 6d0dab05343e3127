use std::collections::HashMap;

use milemax_core::Transaction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Response contained no completion choices")]
    EmptyResponse,
    #[error("Non-boolean verdict token '{token}' in response line {line}")]
    MalformedToken { line: usize, token: String },
    #[error("Verdict number {number} outside 1..={count}")]
    NumberOutOfRange { number: usize, count: usize },
    #[error("Failed to start runtime: {0}")]
    Runtime(String),
}

/// One boolean judgment, explicitly paired with the transaction it belongs
/// to. The ordering guarantee (verdict k is for transaction k) is still the
/// contract, but the pairing is carried in the data so the consumer can
/// verify it rather than trust array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub transaction_index: usize,
    pub satisfied: bool,
}

/// Abstraction over the natural-language condition oracle.
///
/// One call judges the whole ordered transaction list against a single
/// condition, so external traffic scales with the number of special rules,
/// not with the number of transactions.
pub trait ConditionClassifier: Send + Sync {
    fn classify(
        &self,
        condition: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<Verdict>, ClassifyError>;
}

// ── Scripted backend (always available, used for tests) ───────────────────────

/// Returns pre-scripted verdicts per condition — lets the engine be tested
/// deterministically without network access. Unknown conditions get an
/// all-false verdict list of the right length.
///
/// A script whose length differs from the transaction count is returned
/// verbatim, which is exactly how tests provoke contract violations.
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    scripts: HashMap<String, Vec<bool>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, condition: impl Into<String>, verdicts: Vec<bool>) -> Self {
        self.scripts.insert(condition.into(), verdicts);
        self
    }
}

impl ConditionClassifier for ScriptedClassifier {
    fn classify(
        &self,
        condition: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<Verdict>, ClassifyError> {
        let bools = match self.scripts.get(condition) {
            Some(script) => script.clone(),
            None => vec![false; transactions.len()],
        };
        Ok(bools
            .into_iter()
            .enumerate()
            .map(|(i, satisfied)| Verdict {
                transaction_index: i,
                satisfied,
            })
            .collect())
    }
}
