use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::{check_status, Attachment, CompletionRequest, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

/// A local Ollama server. Needs no API key; use a vision model (e.g. llava)
/// for photographed recipes.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .clone()
            .or_else(|| std::env::var("OLLAMA_HOST").ok())
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        Ok(OllamaProvider {
            client: Client::new(),
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let images: Vec<&str> = request
            .attachments
            .iter()
            .filter_map(|attachment| match attachment {
                Attachment::InlineImage { data, .. } => Some(data.as_str()),
                Attachment::RemoteVideo { .. } => None,
            })
            .collect();

        let mut user = json!({"role": "user", "content": request.user});
        if !images.is_empty() {
            user["images"] = json!(images);
        }

        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                user
            ],
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens
            }
        });
        if request.json {
            body["format"] = json!("json");
        }

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;
        let response = check_status("ollama", response).await?;

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let content = response_body["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "Failed to extract content from Ollama response".to_string(),
                )
            })?
            .to_string();

        Ok(content)
    }
}
