pub mod classifier;
pub mod openai;
pub(crate) mod prompt;

pub use classifier::{ClassifyError, ConditionClassifier, ScriptedClassifier, Verdict};
pub use openai::{ClassifierConfig, OpenAiClassifier};
