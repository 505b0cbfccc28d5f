use std::time::Duration;

use async_trait::async_trait;
use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::CompletionResponse;

use super::{ModelError, TextModel};

pub struct ChatGptModel {
    chat_gpt: ChatGPT,
}

impl ChatGptModel {
    pub fn new(api_key: &str, engine: ChatGPTEngine, timeout: Duration) -> Result<Self, ModelError> {
        let mut chat_gpt =
            ChatGPT::new(api_key).map_err(|e| ModelError::Setup(e.to_string()))?;

        chat_gpt.config.engine = engine;
        chat_gpt.config.timeout = timeout;

        Ok(Self { chat_gpt })
    }
}

/// Maps the engine names accepted in configuration onto chatgpt_rs engines.
pub fn engine_from_name(name: &str) -> Option<ChatGPTEngine> {
    match name {
        "gpt-3.5-turbo" => Some(ChatGPTEngine::Gpt35Turbo),
        "gpt-4" => Some(ChatGPTEngine::Gpt4),
        "gpt-4-32k" => Some(ChatGPTEngine::Gpt4_32k),
        _ => None,
    }
}

#[async_trait]
impl TextModel for ChatGptModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        log::debug!("Sending prompt to ChatGPT ({} bytes)", prompt.len());

        let response: CompletionResponse = self
            .chat_gpt
            .send_message(prompt)
            .await
            .map_err(|e| match e {
                chatgpt::err::Error::BackendError {
                    message,
                    error_type,
                } => ModelError::Api(format!("{}: {}", error_type, message)),
                other => ModelError::Network(other.to_string()),
            })?;
        let content = response.message().clone().content;

        if content.trim().is_empty() {
            return Err(ModelError::EmptyReply);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_engine_names_resolve() {
        assert!(matches!(
            engine_from_name("gpt-3.5-turbo"),
            Some(ChatGPTEngine::Gpt35Turbo)
        ));
        assert!(matches!(engine_from_name("gpt-4"), Some(ChatGPTEngine::Gpt4)));
        assert!(engine_from_name("davinci").is_none());
    }

    #[test]
    fn client_setup_does_not_touch_the_network() {
        let model =
            ChatGptModel::new("sk-test", ChatGPTEngine::Gpt35Turbo, Duration::from_secs(5));
        assert!(model.is_ok());

        let err = ModelError::Setup("invalid header value".to_string());
        assert_eq!(
            err.to_string(),
            "failed to set up model client: invalid header value"
        );
    }
}
