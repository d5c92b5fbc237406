use async_trait::async_trait;
use log::{debug, info};

use super::{parse_recipe_reply, parse_transcript_reply, ExtractionService};
use crate::config::AppConfig;
use crate::error::{ProviderError, TransformError};
use crate::model::{MeasurementSystem, StructuredRecipe};
use crate::providers::{
    build_transform_prompt, Attachment, CompletionRequest, LlmProvider, ProviderFactory,
    IMAGE_TRANSCRIBE_PROMPT,
};

/// [`ExtractionService`] backed by a generative model.
pub struct LlmExtractionService {
    provider: Box<dyn LlmProvider>,
}

impl LlmExtractionService {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Use the provider (or fallback chain) named in the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(ProviderFactory::from_config(config)?))
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, TransformError> {
        self.provider.complete(request).await.map_err(|e| {
            TransformError::ExtractionFailed(format!(
                "{} model call failed: {}",
                self.provider.provider_name(),
                e
            ))
        })
    }

    async fn structured_call(
        &self,
        request: CompletionRequest,
    ) -> Result<StructuredRecipe, TransformError> {
        let reply = self.complete(&request.json()).await?;
        debug!("Transform reply: {}", reply);
        parse_recipe_reply(&reply)
    }
}

#[async_trait]
impl ExtractionService for LlmExtractionService {
    async fn extract_from_images(&self, images: &[String]) -> Result<String, TransformError> {
        if images.is_empty() {
            return Err(TransformError::InvalidInput(
                "at least one image is required".to_string(),
            ));
        }

        let attachments = images
            .iter()
            .enumerate()
            .map(|(i, uri)| {
                Attachment::from_data_uri(uri)
                    .map_err(|e| TransformError::InvalidInput(format!("image {}: {}", i + 1, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Transcribing {} image(s) with {}",
            attachments.len(),
            self.provider.provider_name()
        );
        let request = CompletionRequest::new(
            IMAGE_TRANSCRIBE_PROMPT,
            format!(
                "Transcribe the recipe shown on these {} page(s), in order.",
                attachments.len()
            ),
        )
        .with_attachments(attachments)
        .json();

        let reply = self.complete(&request).await?;
        let transcript = parse_transcript_reply(&reply);
        if transcript.is_empty() {
            return Err(TransformError::ExtractionEmpty);
        }
        debug!("Transcript has {} characters", transcript.len());
        Ok(transcript)
    }

    async fn transform(
        &self,
        content: &str,
        target_language: &str,
        system: MeasurementSystem,
    ) -> Result<StructuredRecipe, TransformError> {
        info!(
            "Transforming {} characters into {} / {} with {}",
            content.len(),
            target_language,
            system,
            self.provider.provider_name()
        );
        let request = CompletionRequest::new(
            build_transform_prompt(target_language, system),
            format!("Recipe source:\n{}", content),
        );
        self.structured_call(request).await
    }

    async fn transform_video(
        &self,
        url: &str,
        target_language: &str,
        system: MeasurementSystem,
    ) -> Result<StructuredRecipe, TransformError> {
        info!(
            "Transforming video {} into {} / {} with {}",
            url,
            target_language,
            system,
            self.provider.provider_name()
        );
        let request = CompletionRequest::new(
            build_transform_prompt(target_language, system),
            format!(
                "Recipe source: this is a cooking video. Give the detailed recipe shown in it: {}",
                url
            ),
        )
        .with_attachments(vec![Attachment::RemoteVideo {
            url: url.to_string(),
        }]);
        self.structured_call(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every request and answers with a canned reply
    struct CannedProvider {
        reply: Result<String, String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedProvider {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for std::sync::Arc<CannedProvider> {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply
                .clone()
                .map_err(ProviderError::MalformedResponse)
        }
    }

    fn service(provider: &std::sync::Arc<CannedProvider>) -> LlmExtractionService {
        LlmExtractionService::new(Box::new(provider.clone()))
    }

    #[tokio::test]
    async fn test_images_are_attached_in_order() {
        let provider = std::sync::Arc::new(CannedProvider::ok(
            r#"{"recipeText": "Page one\nPage two"}"#,
        ));
        let images = vec![
            "data:image/png;base64,AAAA".to_string(),
            "data:image/jpeg;base64,BBBB".to_string(),
        ];

        let transcript = service(&provider).extract_from_images(&images).await.unwrap();
        assert_eq!(transcript, "Page one\nPage two");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].json);
        let uris: Vec<String> = requests[0]
            .attachments
            .iter()
            .filter_map(Attachment::to_data_uri)
            .collect();
        assert_eq!(uris, images);
    }

    #[tokio::test]
    async fn test_empty_transcript() {
        let provider = std::sync::Arc::new(CannedProvider::ok(r#"{"recipeText": "  "}"#));
        let err = service(&provider)
            .extract_from_images(&["data:image/png;base64,AAAA".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err, TransformError::ExtractionEmpty);
    }

    #[tokio::test]
    async fn test_bad_image_is_invalid_input_without_model_call() {
        let provider = std::sync::Arc::new(CannedProvider::ok("{}"));
        let err = service(&provider)
            .extract_from_images(&["not-a-data-uri".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, TransformError::InvalidInput(_)));
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transform_builds_prompt_and_parses_reply() {
        let provider = std::sync::Arc::new(CannedProvider::ok(
            r#"{"title": "Tarte", "ingredients": ["200 g farine"], "instructions": ["Cuire."]}"#,
        ));

        let recipe = service(&provider)
            .transform("<html>pie</html>", "fr", MeasurementSystem::Metric)
            .await
            .unwrap();
        assert_eq!(recipe.title, "Tarte");

        let requests = provider.requests.lock().unwrap();
        assert!(requests[0].system.contains("French"));
        assert!(requests[0].user.contains("<html>pie</html>"));
        assert!(requests[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn test_transform_video_attaches_link() {
        let provider = std::sync::Arc::new(CannedProvider::ok(r#"{"title": "Ramen"}"#));

        service(&provider)
            .transform_video("https://youtu.be/abc", "en", MeasurementSystem::Us)
            .await
            .unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(
            requests[0].attachments,
            vec![Attachment::RemoteVideo {
                url: "https://youtu.be/abc".to_string()
            }]
        );
        assert!(requests[0].user.contains("https://youtu.be/abc"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_extraction_failed() {
        let provider = std::sync::Arc::new(CannedProvider::failing("quota exceeded"));
        let err = service(&provider)
            .transform("text", "en", MeasurementSystem::Metric)
            .await
            .unwrap_err();

        match err {
            TransformError::ExtractionFailed(message) => assert!(message.contains("quota exceeded")),
            other => panic!("Expected ExtractionFailed, got {:?}", other),
        }
    }
}
