use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::{AppError, TransformError};
use crate::model::{MeasurementSystem, RecipeSource, StructuredRecipe, TransformRequest};
use crate::pipelines::{validate, Transformer};

/// Represents the input source for a recipe
#[derive(Debug, Clone)]
enum InputSource {
    Source(RecipeSource),
    /// Photos on disk, read and encoded when the builder runs
    ImageFiles(Vec<PathBuf>),
}

/// Optional LLM provider configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
    Google,
    Ollama,
}

impl LlmProvider {
    /// Convert to provider name string used by the factory
    fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Google => "google",
            LlmProvider::Ollama => "ollama",
        }
    }
}

fn default_model(provider_name: &str) -> &'static str {
    match provider_name {
        "openai" => "gpt-4o-mini",
        "anthropic" => "claude-3-5-sonnet-20241022",
        "ollama" => "llama3.2",
        _ => "gemini-2.0-flash",
    }
}

/// Builder for configuring and running a recipe transform
#[derive(Debug, Default)]
pub struct RecipeTransformerBuilder {
    source: Option<InputSource>,
    target_language: Option<String>,
    measurement_system: Option<MeasurementSystem>,
    provider: Option<LlmProvider>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl RecipeTransformerBuilder {
    /// Set the input source to a recipe web page
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeTransformer;
    ///
    /// let builder = RecipeTransformer::builder()
    ///     .url("https://example.com/recipe");
    /// ```
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.source = Some(InputSource::Source(RecipeSource::Url { url: url.into() }));
        self
    }

    /// Set the input source to pasted recipe text
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeTransformer;
    ///
    /// let builder = RecipeTransformer::builder()
    ///     .text("2 eggs, 1 cup flour. Mix and bake at 350F for 30 minutes.");
    /// ```
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.source = Some(InputSource::Source(RecipeSource::Text { text: text.into() }));
        self
    }

    /// Set the input source to photos given as `data:` URIs, in page order
    pub fn images(mut self, data_uris: Vec<String>) -> Self {
        self.source = Some(InputSource::Source(RecipeSource::Images { data_uris }));
        self
    }

    /// Add a photo file to the input. Calling it again adds the next page.
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeTransformer;
    ///
    /// let builder = RecipeTransformer::builder()
    ///     .image_file("/path/to/page-1.jpg")
    ///     .image_file("/path/to/page-2.jpg");
    /// ```
    pub fn image_file(mut self, path: impl Into<PathBuf>) -> Self {
        match &mut self.source {
            Some(InputSource::ImageFiles(paths)) => paths.push(path.into()),
            _ => self.source = Some(InputSource::ImageFiles(vec![path.into()])),
        }
        self
    }

    /// Set the input source to a cooking video link
    pub fn video(mut self, url: impl Into<String>) -> Self {
        self.source = Some(InputSource::Source(RecipeSource::Video { url: url.into() }));
        self
    }

    /// Language code of the output recipe, e.g. `"fr"`.
    /// Defaults to the configured target language.
    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    pub fn measurement_system(mut self, system: MeasurementSystem) -> Self {
        self.measurement_system = Some(system);
        self
    }

    /// Set the LLM provider; disables the fallback chain
    ///
    /// # Example
    /// ```
    /// use mealie_import::{RecipeTransformer, LlmProvider};
    ///
    /// let builder = RecipeTransformer::builder()
    ///     .url("https://example.com/recipe")
    ///     .provider(LlmProvider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: LlmProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set a timeout for fetching the recipe page
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the API key for the LLM provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the LLM provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the provider at a proxy or self-hosted endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build and run the transform
    ///
    /// # Errors
    /// Returns `AppError` if:
    /// - No input source was specified
    /// - Configuration could not be loaded or names no usable provider
    /// - The transform itself fails (wrapped as `AppError::Transform`)
    ///
    /// # Example
    /// ```no_run
    /// # use mealie_import::RecipeTransformer;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let recipe = RecipeTransformer::builder()
    ///     .url("https://example.com/recipe")
    ///     .target_language("de")
    ///     .build()
    ///     .await?;
    /// println!("{}", recipe.title);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<StructuredRecipe, AppError> {
        let config = AppConfig::load()?;
        self.build_with_config(config).await
    }

    /// Same as [`build`](Self::build) with an explicit base configuration
    /// instead of `config.toml` and the environment.
    pub async fn build_with_config(self, config: AppConfig) -> Result<StructuredRecipe, AppError> {
        let source = match &self.source {
            Some(InputSource::Source(source)) => source.clone(),
            Some(InputSource::ImageFiles(paths)) => {
                let mut data_uris = Vec::with_capacity(paths.len());
                for path in paths {
                    data_uris.push(read_image_file(path).await?);
                }
                RecipeSource::Images { data_uris }
            }
            None => {
                return Err(TransformError::InvalidInput(
                    "No input source specified. Use .url(), .text(), .images(), .image_file() or .video()"
                        .to_string(),
                )
                .into())
            }
        };

        let config = self.apply_overrides(config);
        let request = TransformRequest::new(
            source,
            self.target_language
                .clone()
                .unwrap_or_else(|| config.defaults.target_language.clone()),
            self.measurement_system
                .unwrap_or(config.defaults.measurement_system),
        );
        validate(&request)?;

        let transformer = Transformer::from_config(&config)?;
        Ok(transformer.transform(request).await?)
    }

    fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(provider) = self.provider {
            config.default_provider = provider.as_str().to_string();
            config.fallback.enabled = false;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout.as_secs().max(1);
        }

        if self.provider.is_none()
            && self.api_key.is_none()
            && self.model.is_none()
            && self.base_url.is_none()
        {
            return config;
        }

        let name = config.default_provider.clone();
        let provider_config = config
            .providers
            .entry(name.clone())
            .or_insert_with(|| ProviderConfig::with_model(default_model(&name)));
        provider_config.enabled = true;
        if let Some(key) = &self.api_key {
            provider_config.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            provider_config.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            provider_config.base_url = Some(url.clone());
        }
        config
    }
}

/// Read a photo from disk into a `data:` URI
async fn read_image_file(path: &Path) -> Result<String, TransformError> {
    let mime_type = image_mime_type(path).ok_or_else(|| {
        TransformError::InvalidInput(format!("{} is not a supported image type", path.display()))
    })?;
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        TransformError::InvalidInput(format!("could not read {}: {}", path.display(), e))
    })?;
    Ok(format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)))
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Main entry point for the builder API
pub struct RecipeTransformer;

impl RecipeTransformer {
    /// Creates a new builder for transforming recipes
    ///
    /// # Example
    /// ```
    /// use mealie_import::RecipeTransformer;
    ///
    /// let builder = RecipeTransformer::builder();
    /// ```
    pub fn builder() -> RecipeTransformerBuilder {
        RecipeTransformerBuilder::default()
    }
}
