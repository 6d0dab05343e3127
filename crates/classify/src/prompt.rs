use std::sync::OnceLock;

use milemax_core::Transaction;
use regex::Regex;

use crate::classifier::{ClassifyError, Verdict};

/// Fixed domain framing for every classification call. Locality assumptions
/// and service-category disambiguation live here, not in the per-call data.
pub(crate) const SYSTEM_PROMPT: &str = "\
You are a financial assistant who reads Thai fluently.
You will receive a spending condition and a numbered list of transactions.
There are multiple questions, and you need to answer all of them.
For each numbered line, answer only 'true' or 'false', keeping the same numbering.
You should know that
  - The cardholder is in Thailand, which means THB is not a foreign currency.
  - Grab is an online food delivery service, not a restaurant.";

/// One numbered line per transaction, so the model's numbered answers map
/// back to transaction indices.
pub(crate) fn build_user_prompt(condition: &str, transactions: &[Transaction]) -> String {
    let mut prompt = format!("Check whether each transaction satisfies this condition: '{condition}'");
    for (i, tx) in transactions.iter().enumerate() {
        prompt.push_str(&format!(
            "\n{}) spent {} {} {}",
            i + 1,
            tx.spending_detail,
            tx.spending_amount,
            tx.currency
        ));
    }
    prompt
}

fn re_verdict() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(\d+)\)\s*(\w+)").expect("invalid regex"))
}

/// Parse `N) true/false` lines into verdicts. Anything other than a boolean
/// token, or a number outside the transaction range, is an error — the
/// caller must abort rather than truncate or pad.
pub(crate) fn parse_verdicts(
    text: &str,
    transaction_count: usize,
) -> Result<Vec<Verdict>, ClassifyError> {
    let mut verdicts = Vec::new();
    for (line, caps) in re_verdict().captures_iter(text).enumerate() {
        let number: usize = caps[1]
            .parse()
            .map_err(|_| ClassifyError::MalformedToken {
                line,
                token: caps[1].to_string(),
            })?;
        if number == 0 || number > transaction_count {
            return Err(ClassifyError::NumberOutOfRange {
                number,
                count: transaction_count,
            });
        }
        let satisfied = match caps[2].to_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(ClassifyError::MalformedToken {
                    line,
                    token: other.to_string(),
                })
            }
        };
        verdicts.push(Verdict {
            transaction_index: number - 1,
            satisfied,
        });
    }
    Ok(verdicts)
}
