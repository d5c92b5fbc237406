pub mod builder;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fetchers;
pub mod model;
pub mod normalizer;
pub mod pipelines;
pub mod providers;
pub mod publisher;
pub mod review;
pub mod server;
pub mod session;

// Re-export main types
pub use builder::{LlmProvider, RecipeTransformer, RecipeTransformerBuilder};
pub use config::AppConfig;
pub use error::{AppError, ProviderError, ReviewError, StoreError, TransformError};
pub use model::{
    MeasurementSystem, RecipeSource, StructuredRecipe, TransformRequest, TransformResult,
};
pub use normalizer::Normalizer;
pub use pipelines::Transformer;
pub use publisher::MealieClient;
pub use review::{EditableList, RecipeDraft};
pub use session::{FileStore, MemoryStore, SessionStore, UserSettings};

/// Convenience function to transform a recipe web page
///
/// # Example
/// ```no_run
/// # use mealie_import::transform_url;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let recipe = transform_url("https://example.com/recipe", "fr").await?;
/// println!("{}", recipe.title);
/// # Ok(())
/// # }
/// ```
pub async fn transform_url(url: &str, target_language: &str) -> Result<StructuredRecipe, AppError> {
    RecipeTransformer::builder()
        .url(url)
        .target_language(target_language)
        .build()
        .await
}

/// Convenience function to transform pasted recipe text
///
/// # Example
/// ```no_run
/// # use mealie_import::{transform_text, MeasurementSystem};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let recipe = transform_text("2 eggs, 1 cup flour. Mix and fry.", "en", MeasurementSystem::Metric).await?;
/// # Ok(())
/// # }
/// ```
pub async fn transform_text(
    text: &str,
    target_language: &str,
    system: MeasurementSystem,
) -> Result<StructuredRecipe, AppError> {
    RecipeTransformer::builder()
        .text(text)
        .target_language(target_language)
        .measurement_system(system)
        .build()
        .await
}

/// Convenience function to send a recipe to Mealie, returning its slug
pub async fn publish_recipe(
    recipe: &StructuredRecipe,
    mealie_url: &str,
    api_token: &str,
) -> Result<String, TransformError> {
    MealieClient::new(
        Some(mealie_url.to_string()),
        Some(api_token.to_string()),
        None,
    )?
    .publish(recipe)
    .await
}
