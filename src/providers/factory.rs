use crate::config::{AppConfig, ProviderConfig};
use crate::error::ProviderError;
use crate::providers::{
    AnthropicProvider, FallbackProvider, GoogleProvider, LlmProvider, OllamaProvider,
    OpenAIProvider,
};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(ProviderError::Disabled(provider_name.to_string()));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            "google" => Ok(Box::new(GoogleProvider::new(config)?)),
            "ollama" => Ok(Box::new(OllamaProvider::new(config)?)),
            _ => Err(ProviderError::UnknownProvider(provider_name.to_string())),
        }
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(
        config: &AppConfig,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        let provider_name = &config.default_provider;
        let provider_config = config
            .providers
            .get(provider_name)
            .ok_or_else(|| ProviderError::NotConfigured(provider_name.clone()))?;

        Self::create(provider_name, provider_config)
    }

    /// The provider the service should use: the fallback chain when enabled,
    /// otherwise the default provider alone.
    pub fn from_config(config: &AppConfig) -> Result<Box<dyn LlmProvider>, ProviderError> {
        if config.fallback.enabled {
            Ok(Box::new(FallbackProvider::new(config)?))
        } else {
            Self::get_default_provider(config)
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic", "google", "ollama"]
    }
}
