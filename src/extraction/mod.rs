mod coerce;
mod llm;

pub use coerce::{parse_recipe_reply, parse_transcript_reply};
pub use llm::LlmExtractionService;

use async_trait::async_trait;

use crate::error::TransformError;
use crate::model::{MeasurementSystem, StructuredRecipe};

/// The model-backed extraction capability the transformer composes.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Read photographed pages (data URIs, in page order) into one combined
    /// recipe transcript.
    async fn extract_from_images(&self, images: &[String]) -> Result<String, TransformError>;

    /// Extract, translate and convert units in one call.
    async fn transform(
        &self,
        content: &str,
        target_language: &str,
        system: MeasurementSystem,
    ) -> Result<StructuredRecipe, TransformError>;

    /// Same as [`transform`](Self::transform) for a video link. Services that
    /// can hand the video itself to the model override this.
    async fn transform_video(
        &self,
        url: &str,
        target_language: &str,
        system: MeasurementSystem,
    ) -> Result<StructuredRecipe, TransformError> {
        self.transform(url, target_language, system).await
    }
}
