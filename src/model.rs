use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a recipe comes from. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecipeSource {
    /// A recipe web page
    Url { url: String },
    /// Pasted recipe text
    Text { text: String },
    /// Photos of a recipe, as `data:<mime>;base64,<payload>` URIs, in page order
    Images {
        #[serde(rename = "dataUris")]
        data_uris: Vec<String>,
    },
    /// A cooking video (e.g. YouTube) handed to the model as-is
    Video { url: String },
}

impl RecipeSource {
    /// Short name of the modality, used in logs.
    pub fn modality(&self) -> &'static str {
        match self {
            RecipeSource::Url { .. } => "url",
            RecipeSource::Text { .. } => "text",
            RecipeSource::Images { .. } => "images",
            RecipeSource::Video { .. } => "video",
        }
    }

    /// The canonical origin URL, only for modalities that have one.
    pub fn origin_url(&self) -> Option<&str> {
        match self {
            RecipeSource::Url { url } | RecipeSource::Video { url } => Some(url),
            RecipeSource::Text { .. } | RecipeSource::Images { .. } => None,
        }
    }
}

/// Target measurement system for unit conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    #[default]
    Metric,
    Us,
}

impl MeasurementSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementSystem::Metric => "metric",
            MeasurementSystem::Us => "us",
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(MeasurementSystem::Metric),
            "us" => Ok(MeasurementSystem::Us),
            other => Err(format!(
                "Unknown measurement system '{}' (expected 'metric' or 'us')",
                other
            )),
        }
    }
}

/// The normalized recipe record shown for review and sent to Mealie.
///
/// Timings and servings stay free-form strings: sources express them too
/// inconsistently to parse. Ingredient and instruction order is the recipe's
/// order and is never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRecipe {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl StructuredRecipe {
    /// True when the record carries nothing a user could import.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.ingredients.is_empty() && self.instructions.is_empty()
    }
}

/// One user submission, consumed once by the transformer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub source: RecipeSource,
    pub target_language: String,
    #[serde(default)]
    pub measurement_system: MeasurementSystem,
}

impl TransformRequest {
    pub fn new(
        source: RecipeSource,
        target_language: impl Into<String>,
        measurement_system: MeasurementSystem,
    ) -> Self {
        Self {
            source,
            target_language: target_language.into(),
            measurement_system,
        }
    }
}

/// Outcome of a transform: the whole recipe or one error, never a partial record.
pub type TransformResult = Result<StructuredRecipe, crate::error::TransformError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_deserializes_from_tagged_json() {
        let source: RecipeSource = serde_json::from_value(json!({
            "kind": "images",
            "dataUris": ["data:image/png;base64,AAAA", "data:image/png;base64,BBBB"]
        }))
        .unwrap();

        match source {
            RecipeSource::Images { data_uris } => assert_eq!(data_uris.len(), 2),
            other => panic!("Expected images, got {:?}", other),
        }

        let source: RecipeSource =
            serde_json::from_value(json!({"kind": "url", "url": "https://example.com/r1"}))
                .unwrap();
        assert_eq!(source.origin_url(), Some("https://example.com/r1"));
        assert_eq!(source.modality(), "url");
    }

    #[test]
    fn test_origin_url_only_for_url_and_video() {
        let text = RecipeSource::Text {
            text: "2 eggs".to_string(),
        };
        let images = RecipeSource::Images {
            data_uris: vec!["data:image/png;base64,AAAA".to_string()],
        };
        let video = RecipeSource::Video {
            url: "https://youtu.be/abc".to_string(),
        };

        assert_eq!(text.origin_url(), None);
        assert_eq!(images.origin_url(), None);
        assert_eq!(video.origin_url(), Some("https://youtu.be/abc"));
    }

    #[test]
    fn test_measurement_system_parsing() {
        assert_eq!("metric".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Metric));
        assert_eq!(" US ".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Us));
        assert!("imperial".parse::<MeasurementSystem>().is_err());
        assert_eq!(MeasurementSystem::default(), MeasurementSystem::Metric);
        assert_eq!(
            serde_json::to_value(MeasurementSystem::Us).unwrap(),
            json!("us")
        );
    }

    #[test]
    fn test_recipe_skips_absent_fields() {
        let recipe = StructuredRecipe {
            title: "Pancakes".to_string(),
            ingredients: vec!["2 eggs".to_string()],
            ..Default::default()
        };

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["title"], "Pancakes");
        assert!(value.get("description").is_none());
        assert!(value.get("source").is_none());
        assert_eq!(value["instructions"], json!([]));
    }

    #[test]
    fn test_request_defaults_measurement_system() {
        let request: TransformRequest = serde_json::from_value(json!({
            "source": {"kind": "text", "text": "2 eggs"},
            "targetLanguage": "fr"
        }))
        .unwrap();

        assert_eq!(request.measurement_system, MeasurementSystem::Metric);
        assert_eq!(request.target_language, "fr");
    }
}
