mod metadata;
mod request;

pub use metadata::find_recipe_image;
pub use request::RequestFetcher;

use async_trait::async_trait;

use crate::error::TransformError;

/// Retrieves the raw markup behind a recipe URL
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// One GET attempt. Non-2xx statuses and transport errors surface as
    /// `TransformError::SourceUnreachable`.
    async fn fetch(&self, url: &str) -> Result<String, TransformError>;
}
