pub mod chat_gpt;
pub mod gemini;

use async_trait::async_trait;

pub use chat_gpt::ChatGptModel;
pub use gemini::GeminiModel;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to set up model client: {0}")]
    Setup(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("model API error: {0}")]
    Api(String),

    #[error("model returned an empty reply")]
    EmptyReply,
}

/// A text-in/text-out generative model. Every call is exactly one outbound
/// request; nothing here retries.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}
