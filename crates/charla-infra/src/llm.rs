//! OpenAI-backed summary model.
//!
//! Implements the core [`SummaryModel`] trait over the chat completions API
//! using [`async_openai`]. One request per summary, no streaming, no retry;
//! provider failures are mapped into the [`SummaryError`] taxonomy.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use secrecy::{ExposeSecret, SecretString};

use charla_core::summary::SummaryModel;
use charla_types::error::SummaryError;

/// Summary model backed by an OpenAI-compatible chat completions endpoint.
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
#[derive(Clone)]
pub struct OpenAiSummaryModel {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryModel {
    pub fn new(api_key: &SecretString, model: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl SummaryModel for OpenAiSummaryModel {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, SummaryError> {
        let request = CreateChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: ChatCompletionRequestSystemMessageContent::Text(system.to_string()),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(user.to_string()),
                    name: None,
                }),
            ],
            max_completion_tokens: Some(max_tokens),
            ..Default::default()
        };

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            return Err(SummaryError::EmptyCompletion);
        }
        Ok(content.to_string())
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`SummaryError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> SummaryError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "authentication_error"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
                || api_err.message.contains("Invalid API key")
            {
                SummaryError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                SummaryError::RateLimited
            } else {
                SummaryError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => {
            if let Some(status) = reqwest_err.status() {
                match status.as_u16() {
                    401 => SummaryError::AuthenticationFailed,
                    429 => SummaryError::RateLimited,
                    _ => SummaryError::Provider {
                        message: err.to_string(),
                    },
                }
            } else {
                // No HTTP status means the request never got an answer
                SummaryError::Network(err.to_string())
            }
        }
        _ => SummaryError::Provider {
            message: err.to_string(),
        },
    }
}
