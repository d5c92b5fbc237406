use log::info;

use crate::error::TransformError;
use crate::extraction::ExtractionService;
use crate::model::{MeasurementSystem, StructuredRecipe};

/// Photographed pages are transcribed together, then the transcript is
/// transformed like pasted text.
pub async fn process(
    extractor: &dyn ExtractionService,
    data_uris: &[String],
    target_language: &str,
    system: MeasurementSystem,
) -> Result<StructuredRecipe, TransformError> {
    let transcript = extractor.extract_from_images(data_uris).await?;
    if transcript.trim().is_empty() {
        return Err(TransformError::ExtractionEmpty);
    }
    info!(
        "Read {} characters from {} image(s)",
        transcript.len(),
        data_uris.len()
    );

    extractor
        .transform(&transcript, target_language, system)
        .await
}
