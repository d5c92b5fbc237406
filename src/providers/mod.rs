mod anthropic;
mod factory;
mod fallback;
mod google;
mod ollama;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use fallback::FallbackProvider;
pub use google::GoogleProvider;
pub use ollama::OllamaProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{
    build_convert_units_prompt, build_transform_prompt, build_translate_prompt, language_name,
    IMAGE_TRANSCRIBE_PROMPT,
};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::ProviderError;

/// Media sent to the model alongside the prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Base64 image data with its MIME type
    InlineImage { mime_type: String, data: String },
    /// A remote video the model fetches itself (e.g. a YouTube link)
    RemoteVideo { url: String },
}

impl Attachment {
    /// Parse a `data:<mime>;base64,<payload>` URI.
    ///
    /// The payload must decode as base64 so malformed uploads are caught
    /// before a model call is made.
    pub fn from_data_uri(uri: &str) -> Result<Self, String> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or("image must be a data URI starting with 'data:'")?;
        let (header, data) = rest
            .split_once(',')
            .ok_or("data URI is missing the ',' separator")?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or("data URI must be base64 encoded")?;

        if mime_type.is_empty() {
            return Err("data URI is missing a MIME type".to_string());
        }
        if data.is_empty() {
            return Err("data URI has no payload".to_string());
        }
        STANDARD
            .decode(data)
            .map_err(|e| format!("data URI payload is not valid base64: {}", e))?;

        Ok(Attachment::InlineImage {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Render back to a data URI (OpenAI accepts images in this form).
    pub fn to_data_uri(&self) -> Option<String> {
        match self {
            Attachment::InlineImage { mime_type, data } => {
                Some(format!("data:{};base64,{}", mime_type, data))
            }
            Attachment::RemoteVideo { .. } => None,
        }
    }
}

/// A single model call
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Instructions for the model
    pub system: String,
    /// The content to work on
    pub user: String,
    /// Images or videos, in order
    pub attachments: Vec<Attachment>,
    /// Ask the provider for a JSON-only reply when it supports it
    pub json: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            attachments: Vec::new(),
            json: false,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "google")
    fn provider_name(&self) -> &str;

    /// Run one completion and return the model's text reply
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Fail with the upstream body when the provider answered with a non-2xx status.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        provider,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri() {
        let attachment = Attachment::from_data_uri("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(
            attachment,
            Attachment::InlineImage {
                mime_type: "image/jpeg".to_string(),
                data: "aGVsbG8=".to_string(),
            }
        );
        assert_eq!(
            attachment.to_data_uri().as_deref(),
            Some("data:image/jpeg;base64,aGVsbG8=")
        );
    }

    #[test]
    fn test_reject_malformed_data_uris() {
        assert!(Attachment::from_data_uri("https://example.com/a.jpg").is_err());
        assert!(Attachment::from_data_uri("data:image/png,plain").is_err());
        assert!(Attachment::from_data_uri("data:;base64,aGVsbG8=").is_err());
        assert!(Attachment::from_data_uri("data:image/png;base64,").is_err());
        assert!(Attachment::from_data_uri("data:image/png;base64,!!not-base64!!").is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("system", "user")
            .with_attachments(vec![Attachment::RemoteVideo {
                url: "https://youtu.be/abc".to_string(),
            }])
            .json();

        assert!(request.json);
        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.system, "system");
    }
}
