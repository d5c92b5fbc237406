use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::error::TransformError;
use crate::model::StructuredRecipe;

const CREATE_PATH: &str = "/api/recipes/create/html-or-json";

/// Sends reviewed recipes to a Mealie instance.
pub struct MealieClient {
    client: Client,
    base_url: Option<String>,
    api_token: Option<String>,
}

impl MealieClient {
    /// A missing URL or token is reported by [`publish`](Self::publish), not here.
    pub fn new(
        base_url: Option<String>,
        api_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransformError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransformError::PublishFailed {
            status: None,
            detail: format!("could not create HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            base_url: base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            api_token: api_token
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
        })
    }

    /// Create the recipe in Mealie and return its slug.
    pub async fn publish(&self, recipe: &StructuredRecipe) -> Result<String, TransformError> {
        let (base_url, api_token) = match (&self.base_url, &self.api_token) {
            (Some(url), Some(token)) => (url, token),
            _ => {
                return Err(TransformError::PublishFailed {
                    status: None,
                    detail: "Mealie URL and API token must be set in settings".to_string(),
                })
            }
        };
        if recipe.title.trim().is_empty() {
            return Err(TransformError::PublishFailed {
                status: None,
                detail: "the recipe has no name".to_string(),
            });
        }

        let data = to_schema_org(recipe).to_string();
        debug!("Mealie payload: {}", data);

        let url = format!("{}{}", base_url, CREATE_PATH);
        info!("Publishing '{}' to {}", recipe.title, base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_token)
            .json(&json!({"data": data, "includeTags": false}))
            .send()
            .await
            .map_err(|e| TransformError::PublishFailed {
                status: e.status().map(|s| s.as_u16()),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not read Mealie response ({}): {}", status, e);
                return Err(TransformError::PublishFailed {
                    status: Some(status.as_u16()),
                    detail: format!("could not read Mealie response: {}", e),
                });
            }
        };
        if !status.is_success() {
            let detail = error_detail(&body);
            warn!("Mealie rejected the recipe ({}): {}", status, detail);
            return Err(TransformError::PublishFailed {
                status: Some(status.as_u16()),
                detail,
            });
        }

        // Mealie answers with the slug as a bare JSON string
        let slug = match serde_json::from_str::<Value>(&body) {
            Ok(Value::String(slug)) => slug,
            _ => body.trim().trim_matches('"').to_string(),
        };
        let slug = slug.trim();
        if slug.is_empty() {
            warn!("Mealie accepted '{}' but returned no slug", recipe.title);
            return Err(TransformError::PublishFailed {
                status: Some(status.as_u16()),
                detail: "Mealie returned no recipe slug".to_string(),
            });
        }
        info!("Mealie created recipe '{}'", slug);
        Ok(slug.to_string())
    }
}

/// Pull a readable reason out of a Mealie error body
fn error_detail(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let detail = parsed.as_ref().and_then(|v| v.get("detail"));

    match detail {
        Some(Value::String(message)) => message.clone(),
        Some(detail) => detail
            .get("message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| detail.to_string()),
        None if body.trim().is_empty() => "empty response".to_string(),
        None => body.trim().to_string(),
    }
}

/// The schema.org `Recipe` object Mealie's importer understands.
///
/// Fields the recipe does not have are left out entirely.
pub fn to_schema_org(recipe: &StructuredRecipe) -> Value {
    let mut object = Map::new();
    object.insert("@context".to_string(), json!("https://schema.org"));
    object.insert("@type".to_string(), json!("Recipe"));
    object.insert("name".to_string(), json!(recipe.title.trim()));

    let optional = [
        ("description", &recipe.description),
        ("image", &recipe.image),
        ("recipeYield", &recipe.servings),
        ("prepTime", &recipe.prep_time),
        ("cookTime", &recipe.cooking_time),
        ("totalTime", &recipe.total_time),
        ("org_url", &recipe.source),
    ];
    for (key, value) in optional {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            object.insert(key.to_string(), json!(value));
        }
    }
    if !object.contains_key("totalTime") {
        if let Some(cook_time) = object.get("cookTime").cloned() {
            object.insert("totalTime".to_string(), cook_time);
        }
    }

    object.insert("recipeIngredient".to_string(), json!(recipe.ingredients));
    let steps: Vec<Value> = recipe
        .instructions
        .iter()
        .map(|text| json!({"@type": "HowToStep", "text": text}))
        .collect();
    object.insert("recipeInstructions".to_string(), Value::Array(steps));

    Value::Object(object)
}
