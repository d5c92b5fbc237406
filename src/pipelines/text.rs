use crate::error::TransformError;
use crate::extraction::ExtractionService;
use crate::model::{MeasurementSystem, StructuredRecipe};

/// Pasted text goes to the model verbatim; nothing is fetched.
pub async fn process(
    extractor: &dyn ExtractionService,
    text: &str,
    target_language: &str,
    system: MeasurementSystem,
) -> Result<StructuredRecipe, TransformError> {
    extractor.transform(text, target_language, system).await
}
