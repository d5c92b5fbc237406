use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::{check_status, Attachment, CompletionRequest, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or(ProviderError::MissingApiKey("ANTHROPIC_API_KEY"))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.anthropic.com".to_string());

        Ok(AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    fn user_content(request: &CompletionRequest) -> Vec<Value> {
        // Images first, in page order, then the instructions that refer to them
        let mut blocks: Vec<Value> = request
            .attachments
            .iter()
            .filter_map(|attachment| match attachment {
                Attachment::InlineImage { mime_type, data } => Some(json!({
                    "type": "image",
                    "source": {"type": "base64", "media_type": mime_type, "data": data}
                })),
                Attachment::RemoteVideo { .. } => None,
            })
            .collect();

        let mut text = request.user.clone();
        for attachment in &request.attachments {
            if let Attachment::RemoteVideo { url } = attachment {
                text.push_str(&format!("\n\nVideo: {}", url));
            }
        }
        blocks.push(json!({"type": "text", "text": text}));
        blocks
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": request.system,
                "messages": [
                    {
                        "role": "user",
                        "content": Self::user_content(request)
                    }
                ]
            }))
            .send()
            .await?;
        let response = check_status("anthropic", response).await?;

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let content = response_body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "Failed to extract content from Anthropic response".to_string(),
                )
            })?
            .to_string();

        Ok(content)
    }
}
