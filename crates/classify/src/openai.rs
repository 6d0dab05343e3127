use milemax_core::Transaction;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifyError, ConditionClassifier, Verdict};
use crate::prompt;

/// Explicit classifier credentials and endpoint settings, passed in at
/// construction. Nothing here touches process environment.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl ClassifierConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        ClassifierConfig {
            api_key: api_key.into(),
            model: model.into(),
            api_base: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Chat-completions-backed condition oracle. The trait is synchronous (the
/// engine is a sequential batch computation), so this bridges into a tokio
/// runtime internally.
pub struct OpenAiClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl OpenAiClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        OpenAiClassifier {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn classify_async(
        &self,
        condition: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<Verdict>, ClassifyError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: RespMsg,
        }

        #[derive(Deserialize)]
        struct RespMsg {
            content: String,
        }

        let user = prompt::build_user_prompt(condition, transactions);
        let body = Req {
            model: &self.config.model,
            messages: vec![
                Msg { role: "system", content: prompt::SYSTEM_PROMPT },
                Msg { role: "user", content: &user },
            ],
        };

        tracing::debug!(
            condition,
            transactions = transactions.len(),
            "Sending classification request"
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Classification request failed");
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Resp = resp.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ClassifyError::EmptyResponse)?;

        prompt::parse_verdicts(&content, transactions.len())
    }
}

impl ConditionClassifier for OpenAiClassifier {
    fn classify(
        &self,
        condition: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<Verdict>, ClassifyError> {
        block_on_future(self.classify_async(condition, transactions))?
    }
}

/// Drive a future to completion from synchronous code, whatever runtime the
/// caller is (or is not) inside.
///
/// - No runtime: create one and block on it.
/// - Multi-thread runtime: `block_in_place` + `Handle::block_on`.
/// - Current-thread runtime: `block_in_place` panics there, and the handle
///   cannot be driven while this thread is blocked — run the future on a
///   fresh runtime on a scoped thread.
fn block_on_future<F>(future: F) -> Result<F::Output, ClassifyError>
where
    F: std::future::Future + Send,
    F::Output: Send,
{
    use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Ok(_) => std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let rt =
                        Runtime::new().map_err(|e| ClassifyError::Runtime(e.to_string()))?;
                    Ok(rt.block_on(future))
                })
                .join()
                .map_err(|_| ClassifyError::Runtime("classifier thread panicked".to_string()))?
        }),
        Err(_) => {
            let rt = Runtime::new().map_err(|e| ClassifyError::Runtime(e.to_string()))?;
            Ok(rt.block_on(future))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_openai_endpoint() {
        let config = ClassifierConfig::new("sk-test", "gpt-4o-mini");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn bridge_runs_without_a_runtime() {
        assert_eq!(block_on_future(async { 41 + 1 }).unwrap(), 42);
    }

    #[tokio::test]
    async fn bridge_runs_inside_current_thread_runtime() {
        assert_eq!(block_on_future(async { 7 }).unwrap(), 7);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bridge_runs_inside_multi_thread_runtime() {
        assert_eq!(block_on_future(async { 7 }).unwrap(), 7);
    }
}
