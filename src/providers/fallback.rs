use crate::config::AppConfig;
use crate::error::ProviderError;
use crate::providers::{CompletionRequest, LlmProvider, ProviderFactory};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::sleep;

/// Tries each configured provider in order, retrying each a few times.
///
/// The import pipeline itself never retries; this chain only smooths over
/// transient model outages and is off unless `fallback.enabled` is set.
pub struct FallbackProvider {
    providers: Vec<Box<dyn LlmProvider>>,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl FallbackProvider {
    /// Create a new fallback provider from configuration
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        if !config.fallback.enabled {
            // If fallback is disabled, just use the default provider
            let default_provider = ProviderFactory::get_default_provider(config)?;
            return Ok(FallbackProvider {
                providers: vec![default_provider],
                retry_attempts: 1,
                retry_delay_ms: 0,
            });
        }

        let mut providers = Vec::new();

        // Create providers in fallback order
        for provider_name in &config.fallback.order {
            if let Some(provider_config) = config.providers.get(provider_name) {
                if provider_config.enabled {
                    match ProviderFactory::create(provider_name, provider_config) {
                        Ok(provider) => {
                            info!("Added '{}' to fallback chain", provider_name);
                            providers.push(provider);
                        }
                        Err(e) => {
                            warn!("Failed to initialize provider '{}': {}", provider_name, e);
                        }
                    }
                }
            } else {
                warn!(
                    "Provider '{}' in fallback order not found in configuration",
                    provider_name
                );
            }
        }

        Self::with_providers(
            providers,
            config.fallback.retry_attempts,
            config.fallback.retry_delay_ms,
        )
    }

    /// Build a chain from ready-made providers
    pub fn with_providers(
        providers: Vec<Box<dyn LlmProvider>>,
        retry_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, ProviderError> {
        if providers.is_empty() {
            return Err(ProviderError::NoProviders);
        }

        Ok(FallbackProvider {
            providers,
            retry_attempts: retry_attempts.max(1),
            retry_delay_ms,
        })
    }

    /// Try a provider, waiting a little longer after each failed attempt
    async fn try_provider_with_retry(
        &self,
        provider: &dyn LlmProvider,
        request: &CompletionRequest,
    ) -> Result<String, String> {
        let mut last_error = String::new();

        for attempt in 1..=self.retry_attempts {
            debug!(
                "Attempting completion with {} (attempt {}/{})",
                provider.provider_name(),
                attempt,
                self.retry_attempts
            );

            match provider.complete(request).await {
                Ok(result) => {
                    info!("Model call succeeded using {}", provider.provider_name());
                    return Ok(result);
                }
                Err(e) => {
                    warn!(
                        "Provider {} failed (attempt {}/{}): {}",
                        provider.provider_name(),
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.retry_attempts {
                let delay = Duration::from_millis(self.retry_delay_ms * attempt as u64);
                debug!("Waiting {:?} before retry", delay);
                sleep(delay).await;
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl LlmProvider for FallbackProvider {
    fn provider_name(&self) -> &str {
        "fallback"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let mut all_errors: Vec<String> = Vec::new();

        for provider in &self.providers {
            match self
                .try_provider_with_retry(provider.as_ref(), request)
                .await
            {
                Ok(result) => return Ok(result),
                Err(e) => {
                    all_errors.push(format!("{}: {}", provider.provider_name(), e));
                }
            }
        }

        Err(ProviderError::AllFailed(all_errors.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackConfig, ProviderConfig, ServerConfig, TransformDefaults};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct ScriptedProvider {
        name: &'static str,
        failures_before_success: u32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(ProviderError::MalformedResponse(format!("{} down", self.name)))
            } else {
                Ok(format!("answer from {}", self.name))
            }
        }
    }

    fn scripted(name: &'static str, failures: u32) -> (Box<dyn LlmProvider>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let provider = ScriptedProvider {
            name,
            failures_before_success: failures,
            calls: calls.clone(),
        };
        (Box::new(provider), calls)
    }

    fn provider_config(key: &str) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "test-model".to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            api_key: Some(key.to_string()),
            base_url: None,
        }
    }

    fn config_with(providers: HashMap<String, ProviderConfig>, fallback: FallbackConfig) -> AppConfig {
        AppConfig {
            default_provider: "openai".to_string(),
            providers,
            fallback,
            mealie: Default::default(),
            defaults: TransformDefaults::default(),
            server: ServerConfig::default(),
            timeout: 30,
        }
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let (provider, calls) = scripted("flaky", 2);
        let fallback = FallbackProvider::with_providers(vec![provider], 3, 0).unwrap();

        let result = fallback
            .complete(&CompletionRequest::new("s", "u"))
            .await
            .unwrap();
        assert_eq!(result, "answer from flaky");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_moves_to_next_provider() {
        let (down, down_calls) = scripted("down", u32::MAX);
        let (up, _) = scripted("up", 0);
        let fallback = FallbackProvider::with_providers(vec![down, up], 2, 0).unwrap();

        let result = fallback
            .complete(&CompletionRequest::new("s", "u"))
            .await
            .unwrap();
        assert_eq!(result, "answer from up");
        assert_eq!(down_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_failed_lists_every_provider() {
        let (a, _) = scripted("a", u32::MAX);
        let (b, _) = scripted("b", u32::MAX);
        let fallback = FallbackProvider::with_providers(vec![a, b], 1, 0).unwrap();

        let err = fallback
            .complete(&CompletionRequest::new("s", "u"))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("a: "));
        assert!(message.contains("b: "));
    }

    #[test]
    fn test_fallback_disabled_uses_default_provider() {
        let mut providers = HashMap::new();
        providers.insert("openai".to_string(), provider_config("test-key"));
        let fallback = FallbackProvider::new(&config_with(providers, FallbackConfig::default())).unwrap();

        assert_eq!(fallback.providers.len(), 1);
        assert_eq!(fallback.retry_attempts, 1);
    }

    #[test]
    fn test_fallback_no_providers() {
        let config = config_with(
            HashMap::new(),
            FallbackConfig {
                enabled: true,
                order: vec!["openai".to_string()],
                retry_attempts: 3,
                retry_delay_ms: 100,
            },
        );

        let result = FallbackProvider::new(&config);
        assert!(matches!(result, Err(ProviderError::NoProviders)));
    }

    #[test]
    fn test_fallback_multiple_providers() {
        let mut providers = HashMap::new();
        providers.insert("openai".to_string(), provider_config("test-key-1"));
        providers.insert("anthropic".to_string(), provider_config("test-key-2"));

        let config = config_with(
            providers,
            FallbackConfig {
                enabled: true,
                order: vec!["openai".to_string(), "anthropic".to_string()],
                retry_attempts: 2,
                retry_delay_ms: 50,
            },
        );

        let fallback = FallbackProvider::new(&config).unwrap();
        assert_eq!(fallback.providers.len(), 2);
        assert_eq!(fallback.provider_name(), "fallback");
    }
}
