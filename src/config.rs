use std::time::Duration;

use crate::model::{chat_gpt, ChatGptModel, GeminiModel, ModelError, TextModel};

const DEFAULT_CHATGPT_ENGINE: &str = "gpt-3.5-turbo";
const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(&'static str),

    #[error("{var} has unsupported value {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("failed to set up the model client: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelProvider {
    ChatGpt { api_key: String, engine: String },
    Gemini { api_key: String, model: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub provider: ModelProvider,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let provider = match lookup("QUIZ_MODEL_PROVIDER").as_deref() {
            None | Some("chatgpt") => {
                let engine = lookup("CHATGPT_ENGINE")
                    .unwrap_or_else(|| DEFAULT_CHATGPT_ENGINE.to_string());
                if chat_gpt::engine_from_name(&engine).is_none() {
                    return Err(ConfigError::Invalid {
                        var: "CHATGPT_ENGINE",
                        value: engine,
                    });
                }
                ModelProvider::ChatGpt {
                    api_key: required("CHATGPT_API_KEY")?,
                    engine,
                }
            }
            Some("gemini") => ModelProvider::Gemini {
                api_key: required("GOOGLE_API_KEY")?,
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "QUIZ_MODEL_PROVIDER",
                    value: other.to_string(),
                })
            }
        };

        let timeout = match lookup("QUIZ_MODEL_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "QUIZ_MODEL_TIMEOUT_SECS",
                value,
            })?,
        };

        Ok(Self {
            provider,
            timeout: Duration::from_secs(timeout),
        })
    }

    pub fn build_model(&self) -> Result<Box<dyn TextModel>, ConfigError> {
        let model: Box<dyn TextModel> = match &self.provider {
            ModelProvider::ChatGpt { api_key, engine } => {
                let engine = chat_gpt::engine_from_name(engine).ok_or_else(|| {
                    ConfigError::Invalid {
                        var: "CHATGPT_ENGINE",
                        value: engine.clone(),
                    }
                })?;
                Box::new(ChatGptModel::new(api_key, engine, self.timeout)?)
            }
            ModelProvider::Gemini { api_key, model } => Box::new(GeminiModel::new(
                api_key.clone(),
                model.clone(),
                self.timeout,
            )?),
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn chatgpt_is_the_default_provider() {
        let config = load(&[("CHATGPT_API_KEY", "sk-test")]).unwrap();

        assert_eq!(
            config.provider,
            ModelProvider::ChatGpt {
                api_key: "sk-test".to_string(),
                engine: "gpt-3.5-turbo".to_string(),
            }
        );
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn gemini_needs_google_key() {
        assert!(matches!(
            load(&[("QUIZ_MODEL_PROVIDER", "gemini")]),
            Err(ConfigError::Missing("GOOGLE_API_KEY"))
        ));

        let config = load(&[
            ("QUIZ_MODEL_PROVIDER", "gemini"),
            ("GOOGLE_API_KEY", "g-key"),
            ("QUIZ_MODEL_TIMEOUT_SECS", "15"),
        ])
        .unwrap();
        assert_eq!(
            config.provider,
            ModelProvider::Gemini {
                api_key: "g-key".to_string(),
                model: "gemini-pro".to_string(),
            }
        );
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(matches!(
            load(&[("QUIZ_MODEL_PROVIDER", "llama")]),
            Err(ConfigError::Invalid { var: "QUIZ_MODEL_PROVIDER", .. })
        ));
        assert!(matches!(
            load(&[("CHATGPT_API_KEY", "k"), ("CHATGPT_ENGINE", "davinci")]),
            Err(ConfigError::Invalid { var: "CHATGPT_ENGINE", .. })
        ));
        assert!(matches!(
            load(&[("CHATGPT_API_KEY", "k"), ("QUIZ_MODEL_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid { var: "QUIZ_MODEL_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn missing_chatgpt_key_is_reported() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("CHATGPT_API_KEY"))
        ));
    }
}
