use log::{debug, info};

use crate::error::TransformError;
use crate::extraction::ExtractionService;
use crate::fetchers::{find_recipe_image, ContentFetcher};
use crate::model::{MeasurementSystem, StructuredRecipe};

/// Process a recipe web page
///
/// This pipeline:
/// 1. Fetches the page markup (one attempt; failures end the pipeline)
/// 2. Hands the markup to the combined transform call
/// 3. Fills in the page's main image when the model did not give one
pub async fn process(
    fetcher: &dyn ContentFetcher,
    extractor: &dyn ExtractionService,
    url: &str,
    target_language: &str,
    system: MeasurementSystem,
) -> Result<StructuredRecipe, TransformError> {
    let html = fetcher.fetch(url).await?;
    info!("Fetched {} bytes of markup from {}", html.len(), url);

    let page_image = find_recipe_image(&html, url);
    debug!("Page image: {:?}", page_image);

    let mut recipe = extractor.transform(&html, target_language, system).await?;
    if recipe.image.is_none() {
        recipe.image = page_image;
    }
    Ok(recipe)
}
