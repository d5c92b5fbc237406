pub mod image;
pub mod text;
pub mod url;
pub mod video;

use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{AppError, TransformError};
use crate::extraction::{ExtractionService, LlmExtractionService};
use crate::fetchers::{ContentFetcher, RequestFetcher};
use crate::model::{RecipeSource, TransformRequest, TransformResult};
use crate::providers::Attachment;

/// Resolves a [`TransformRequest`] into one structured recipe or one error.
///
/// Which external calls are needed depends on the input modality; callers
/// never see the intermediate steps. Clones share the same fetcher and
/// extraction service, nothing per-request.
#[derive(Clone)]
pub struct Transformer {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn ExtractionService>,
}

impl Transformer {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, extractor: Arc<dyn ExtractionService>) -> Self {
        Self { fetcher, extractor }
    }

    /// HTTP fetcher plus the configured model provider
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let fetcher = RequestFetcher::new(Some(Duration::from_secs(config.timeout)))?;
        let extractor = LlmExtractionService::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), Arc::new(extractor)))
    }

    pub async fn transform(&self, request: TransformRequest) -> TransformResult {
        let modality = request.source.modality();
        info!(
            "Starting {} transform (language: {}, units: {})",
            modality, request.target_language, request.measurement_system
        );

        let result = self.run(request).await;
        match &result {
            Ok(recipe) => info!(
                "{} transform produced '{}' ({} ingredients, {} steps)",
                modality,
                recipe.title,
                recipe.ingredients.len(),
                recipe.instructions.len()
            ),
            Err(e) => warn!("{} transform failed: {}", modality, e),
        }
        result
    }

    async fn run(&self, request: TransformRequest) -> TransformResult {
        validate(&request)?;

        let TransformRequest {
            source,
            target_language,
            measurement_system,
        } = request;
        let language = target_language.trim();
        let extractor = self.extractor.as_ref();

        let mut recipe = match &source {
            RecipeSource::Url { url } => {
                url::process(
                    self.fetcher.as_ref(),
                    extractor,
                    url.trim(),
                    language,
                    measurement_system,
                )
                .await?
            }
            RecipeSource::Text { text } => {
                text::process(extractor, text, language, measurement_system).await?
            }
            RecipeSource::Images { data_uris } => {
                image::process(extractor, data_uris, language, measurement_system).await?
            }
            RecipeSource::Video { url } => {
                video::process(extractor, url, language, measurement_system).await?
            }
        };

        if recipe.is_empty() {
            return Err(TransformError::ExtractionFailed(
                "no title, ingredients or instructions were found".to_string(),
            ));
        }

        // Only links have a canonical origin; pasted text and photos never do
        recipe.source = source.origin_url().map(|url| url.trim().to_string());
        Ok(recipe)
    }
}

/// Reject malformed requests before any network call is made.
pub fn validate(request: &TransformRequest) -> Result<(), TransformError> {
    if request.target_language.trim().is_empty() {
        return Err(TransformError::InvalidInput(
            "target language cannot be empty".to_string(),
        ));
    }

    match &request.source {
        RecipeSource::Url { url } | RecipeSource::Video { url } => validate_url(url),
        RecipeSource::Text { text } => {
            if text.trim().is_empty() {
                Err(TransformError::InvalidInput(
                    "Source cannot be empty.".to_string(),
                ))
            } else {
                Ok(())
            }
        }
        RecipeSource::Images { data_uris } => {
            if data_uris.is_empty() {
                return Err(TransformError::InvalidInput(
                    "at least one image is required".to_string(),
                ));
            }
            for (i, uri) in data_uris.iter().enumerate() {
                Attachment::from_data_uri(uri)
                    .map_err(|e| TransformError::InvalidInput(format!("image {}: {}", i + 1, e)))?;
            }
            Ok(())
        }
    }
}

fn validate_url(url: &str) -> Result<(), TransformError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(TransformError::InvalidInput(
            "Source cannot be empty.".to_string(),
        ));
    }

    let parsed = ::url::Url::parse(url)
        .map_err(|e| TransformError::InvalidInput(format!("'{}' is not a valid URL: {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(TransformError::InvalidInput(format!(
            "'{}' must be an absolute http(s) URL",
            url
        )));
    }
    Ok(())
}
