use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::{check_status, Attachment, CompletionRequest, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

/// Google Gemini. The only provider here that can watch a video link itself.
pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or(ProviderError::MissingApiKey("GOOGLE_API_KEY"))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());

        Ok(GoogleProvider {
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
        GoogleProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    fn parts(request: &CompletionRequest) -> Vec<Value> {
        let mut parts: Vec<Value> = request
            .attachments
            .iter()
            .map(|attachment| match attachment {
                Attachment::InlineImage { mime_type, data } => {
                    json!({"inline_data": {"mime_type": mime_type, "data": data}})
                }
                Attachment::RemoteVideo { url } => {
                    json!({"file_data": {"mime_type": "video/*", "file_uri": url}})
                }
            })
            .collect();
        parts.push(json!({"text": request.user}));
        parts
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut generation_config = json!({
            "temperature": self.temperature,
            "maxOutputTokens": self.max_tokens
        });
        if request.json {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "system_instruction": {"parts": [{"text": request.system}]},
                "contents": [{
                    "role": "user",
                    "parts": Self::parts(request)
                }],
                "generationConfig": generation_config
            }))
            .send()
            .await?;
        let response = check_status("google", response).await?;

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let content = response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "Failed to extract content from Google Gemini response".to_string(),
                )
            })?
            .to_string();

        Ok(content)
    }
}
