//! In-review quick fixes: translate or convert units of a recipe that has
//! already been imported.
//!
//! The import pipeline does both in its single transform call; these are for
//! when the user changes their mind on the review screen.

use log::info;

use crate::config::AppConfig;
use crate::error::{ProviderError, TransformError};
use crate::extraction::parse_recipe_reply;
use crate::model::{MeasurementSystem, StructuredRecipe};
use crate::providers::{
    build_convert_units_prompt, build_translate_prompt, CompletionRequest, LlmProvider,
    ProviderFactory,
};

pub struct Normalizer {
    provider: Box<dyn LlmProvider>,
}

impl Normalizer {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(ProviderFactory::from_config(config)?))
    }

    /// Translate free recipe text
    pub async fn translate(
        &self,
        recipe_text: &str,
        target_language: &str,
    ) -> Result<String, TransformError> {
        require_text(recipe_text)?;
        require_language(target_language)?;
        let request =
            CompletionRequest::new(build_translate_prompt(target_language, false), recipe_text);
        self.text_call(&request).await
    }

    /// Convert the measurements in free recipe text
    pub async fn convert_units(
        &self,
        recipe_text: &str,
        system: MeasurementSystem,
    ) -> Result<String, TransformError> {
        require_text(recipe_text)?;
        let request =
            CompletionRequest::new(build_convert_units_prompt(system, false), recipe_text);
        self.text_call(&request).await
    }

    /// Translate a structured recipe, keeping its shape
    pub async fn translate_recipe(
        &self,
        recipe: &StructuredRecipe,
        target_language: &str,
    ) -> Result<StructuredRecipe, TransformError> {
        require_language(target_language)?;
        info!("Translating '{}' into {}", recipe.title, target_language);
        let request = CompletionRequest::new(
            build_translate_prompt(target_language, true),
            recipe_to_text(recipe),
        );
        self.structured_call(recipe, request).await
    }

    /// Convert the units of a structured recipe, keeping its shape
    pub async fn convert_recipe_units(
        &self,
        recipe: &StructuredRecipe,
        system: MeasurementSystem,
    ) -> Result<StructuredRecipe, TransformError> {
        info!("Converting '{}' to {} units", recipe.title, system);
        let request =
            CompletionRequest::new(build_convert_units_prompt(system, true), recipe_to_text(recipe));
        self.structured_call(recipe, request).await
    }

    async fn text_call(&self, request: &CompletionRequest) -> Result<String, TransformError> {
        let reply = self.provider.complete(request).await.map_err(|e| {
            TransformError::ExtractionFailed(format!(
                "{} model call failed: {}",
                self.provider.provider_name(),
                e
            ))
        })?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(TransformError::ExtractionFailed(
                "the model returned no text".to_string(),
            ));
        }
        Ok(reply.to_string())
    }

    async fn structured_call(
        &self,
        original: &StructuredRecipe,
        request: CompletionRequest,
    ) -> Result<StructuredRecipe, TransformError> {
        let reply = self.text_call(&request.json()).await?;
        let updated = parse_recipe_reply(&reply)?;
        Ok(merge_rewritten(original, updated))
    }
}

/// Take the model's rewrite but never lose what the model dropped.
fn merge_rewritten(original: &StructuredRecipe, updated: StructuredRecipe) -> StructuredRecipe {
    StructuredRecipe {
        title: if updated.title.trim().is_empty() {
            original.title.clone()
        } else {
            updated.title
        },
        description: updated.description.or_else(|| original.description.clone()),
        servings: updated.servings.or_else(|| original.servings.clone()),
        prep_time: updated.prep_time.or_else(|| original.prep_time.clone()),
        cooking_time: updated.cooking_time.or_else(|| original.cooking_time.clone()),
        total_time: updated.total_time.or_else(|| original.total_time.clone()),
        ingredients: if updated.ingredients.is_empty() {
            original.ingredients.clone()
        } else {
            updated.ingredients
        },
        instructions: if updated.instructions.is_empty() {
            original.instructions.clone()
        } else {
            updated.instructions
        },
        source: original.source.clone(),
        image: original.image.clone(),
    }
}

/// Render a recipe as labelled plain text. Empty sections are left out.
pub fn recipe_to_text(recipe: &StructuredRecipe) -> String {
    let mut text = format!("Title: {}\n", recipe.title);
    let labelled = [
        ("Description", &recipe.description),
        ("Prep Time", &recipe.prep_time),
        ("Cook Time", &recipe.cooking_time),
        ("Total Time", &recipe.total_time),
        ("Servings", &recipe.servings),
    ];
    for (label, value) in labelled {
        if let Some(value) = value {
            text.push_str(&format!("{}: {}\n", label, value));
        }
    }
    if !recipe.ingredients.is_empty() {
        text.push_str(&format!("Ingredients:\n{}\n", recipe.ingredients.join("\n")));
    }
    if !recipe.instructions.is_empty() {
        text.push_str(&format!(
            "Instructions:\n{}\n",
            recipe.instructions.join("\n")
        ));
    }
    text
}

fn require_text(text: &str) -> Result<(), TransformError> {
    if text.trim().is_empty() {
        return Err(TransformError::InvalidInput(
            "recipe text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn require_language(language: &str) -> Result<(), TransformError> {
    if language.trim().is_empty() {
        return Err(TransformError::InvalidInput(
            "target language cannot be empty".to_string(),
        ));
    }
    Ok(())
}
