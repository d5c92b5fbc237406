use log::debug;

use crate::error::TransformError;
use crate::extraction::ExtractionService;
use crate::model::{MeasurementSystem, StructuredRecipe};

/// The link itself is the content; the model is responsible for watching it.
pub async fn process(
    extractor: &dyn ExtractionService,
    url: &str,
    target_language: &str,
    system: MeasurementSystem,
) -> Result<StructuredRecipe, TransformError> {
    debug!("Handing video {} to the extraction service", url);
    extractor
        .transform_video(url.trim(), target_language, system)
        .await
}
