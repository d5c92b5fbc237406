use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::{check_status, Attachment, CompletionRequest, LlmProvider};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(ProviderError::MissingApiKey("OPENAI_API_KEY"))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        Ok(OpenAIProvider {
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
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    fn user_content(request: &CompletionRequest) -> Value {
        if request.attachments.is_empty() {
            return json!(request.user);
        }

        let mut parts = vec![json!({"type": "text", "text": request.user})];
        for attachment in &request.attachments {
            match attachment {
                Attachment::InlineImage { .. } => {
                    if let Some(uri) = attachment.to_data_uri() {
                        parts.push(json!({"type": "image_url", "image_url": {"url": uri}}));
                    }
                }
                // Chat completions cannot watch videos; the link travels in the text
                Attachment::RemoteVideo { url } => {
                    parts.push(json!({"type": "text", "text": format!("Video: {}", url)}));
                }
            }
        }
        Value::Array(parts)
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": Self::user_content(request)}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens
        });
        if request.json {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let response = check_status("openai", response).await?;

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);
        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "Failed to extract content from OpenAI response".to_string(),
                )
            })?
            .to_string();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_complete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer fake_api_key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": "{\"title\": \"Pasta\"}"}}]}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let request = CompletionRequest::new("system", "recipe").json();

        let result = provider.complete(&request).await.unwrap();
        assert_eq!(result, r#"{"title": "Pasta"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_images_are_sent_in_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": [
                        {"type": "text"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}},
                        {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,BBBB"}}
                    ]}
                ]
            })))
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"content": "ok"}}]}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );
        let request = CompletionRequest::new("system", "pages").with_attachments(vec![
            Attachment::InlineImage {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            },
            Attachment::InlineImage {
                mime_type: "image/jpeg".to_string(),
                data: "BBBB".to_string(),
            },
        ]);

        assert_eq!(provider.complete(&request).await.unwrap(), "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Invalid request"}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o-mini".to_string(),
        );

        let result = provider
            .complete(&CompletionRequest::new("system", "step"))
            .await;
        match result {
            Err(ProviderError::Api { status, body, .. }) => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid request"));
            }
            other => panic!("Expected API error, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_name() {
        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            "http://localhost".to_string(),
            "gpt-4o".to_string(),
        );
        assert_eq!(provider.provider_name(), "openai");
    }
}
