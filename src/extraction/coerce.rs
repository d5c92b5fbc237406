//! Turning free-form model replies into schema-conformant values.
//!
//! Models wrap JSON in code fences, add a sentence before it, return numbers
//! where strings were asked for, or give list entries as objects. All of that
//! is accepted here; anything that is still not a recipe is an error.

use serde::Deserialize;
use serde_json::Value;

use crate::error::TransformError;
use crate::model::StructuredRecipe;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractedRecipe {
    #[serde(alias = "name")]
    title: Option<TextValue>,
    description: Option<TextValue>,
    #[serde(alias = "recipeYield")]
    servings: Option<TextValue>,
    prep_time: Option<TextValue>,
    #[serde(alias = "cookTime")]
    cooking_time: Option<TextValue>,
    total_time: Option<TextValue>,
    #[serde(alias = "recipeIngredient")]
    ingredients: Option<ListValue>,
    #[serde(alias = "recipeInstructions", alias = "steps")]
    instructions: Option<ListValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextValue {
    String(String),
    Number(serde_json::Number),
}

impl TextValue {
    fn into_text(self) -> Option<String> {
        let text = match self {
            TextValue::String(s) => s.trim().to_string(),
            TextValue::Number(n) => n.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListValue {
    // one newline-separated block
    Block(String),
    Items(Vec<ListItem>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListItem {
    String(String),
    Number(serde_json::Number),
    Object(ItemObject),
}

#[derive(Debug, Deserialize)]
struct ItemObject {
    value: Option<String>,
    text: Option<String>,
    name: Option<String>,
}

impl ListValue {
    fn into_lines(self) -> Vec<String> {
        let lines: Vec<String> = match self {
            ListValue::Block(block) => block.lines().map(String::from).collect(),
            ListValue::Items(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    ListItem::String(s) => Some(s),
                    ListItem::Number(n) => Some(n.to_string()),
                    ListItem::Object(obj) => obj.value.or(obj.text).or(obj.name),
                })
                .collect(),
        };

        lines
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

impl From<ExtractedRecipe> for StructuredRecipe {
    fn from(extracted: ExtractedRecipe) -> Self {
        StructuredRecipe {
            title: extracted
                .title
                .and_then(TextValue::into_text)
                .unwrap_or_default(),
            description: extracted.description.and_then(TextValue::into_text),
            servings: extracted.servings.and_then(TextValue::into_text),
            prep_time: extracted.prep_time.and_then(TextValue::into_text),
            cooking_time: extracted.cooking_time.and_then(TextValue::into_text),
            total_time: extracted.total_time.and_then(TextValue::into_text),
            ingredients: extracted
                .ingredients
                .map(ListValue::into_lines)
                .unwrap_or_default(),
            instructions: extracted
                .instructions
                .map(ListValue::into_lines)
                .unwrap_or_default(),
            source: None,
            image: None,
        }
    }
}

/// Cut the outermost JSON object out of a reply, dropping code fences and prose.
fn json_object_slice(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&reply[start..=end])
}

fn parse_object(reply: &str) -> Option<Value> {
    let slice = json_object_slice(reply)?;
    serde_json::from_str::<Value>(slice)
        .ok()
        .filter(Value::is_object)
}

/// Parse a structured recipe reply.
///
/// Fails with `ExtractionFailed` when the reply holds no JSON object or the
/// object does not look like a recipe. Missing fields stay absent.
pub fn parse_recipe_reply(reply: &str) -> Result<StructuredRecipe, TransformError> {
    let mut value = parse_object(reply).ok_or_else(|| {
        TransformError::ExtractionFailed("the model reply did not contain a JSON recipe".to_string())
    })?;

    // Some models nest the answer under a "recipe" key
    if let Some(inner) = value.get_mut("recipe").filter(|v| v.is_object()) {
        value = inner.take();
    }

    let extracted: ExtractedRecipe = serde_json::from_value(value).map_err(|e| {
        TransformError::ExtractionFailed(format!("the model reply is not a recipe: {}", e))
    })?;

    Ok(extracted.into())
}

/// Parse an image transcription reply into plain recipe text.
///
/// Accepts `{"recipeText": "..."}` and, for providers without a JSON mode,
/// plain text. The result may be empty; the caller decides what that means.
pub fn parse_transcript_reply(reply: &str) -> String {
    match parse_object(reply) {
        Some(value) => value
            .get("recipeText")
            .or_else(|| value.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        None => reply.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_reply() {
        let recipe = parse_recipe_reply(
            r#"{
                "title": "Crêpes",
                "description": "Thin pancakes",
                "servings": "4",
                "prepTime": "10 min",
                "cookingTime": "20 min",
                "ingredients": ["250 g flour", "3 eggs", "500 ml milk"],
                "instructions": ["Mix.", "Rest 1 hour.", "Fry thinly."]
            }"#,
        )
        .unwrap();

        assert_eq!(recipe.title, "Crêpes");
        assert_eq!(recipe.servings.as_deref(), Some("4"));
        assert_eq!(recipe.cooking_time.as_deref(), Some("20 min"));
        assert_eq!(recipe.ingredients, vec!["250 g flour", "3 eggs", "500 ml milk"]);
        assert_eq!(recipe.instructions, vec!["Mix.", "Rest 1 hour.", "Fry thinly."]);
        assert_eq!(recipe.total_time, None);
        assert_eq!(recipe.source, None);
    }

    #[test]
    fn test_fenced_reply_with_prose() {
        let reply = "Here is the recipe:\n```json\n{\"title\": \"Soup\", \"ingredients\": [\"water\"]}\n```\nEnjoy!";
        let recipe = parse_recipe_reply(reply).unwrap();
        assert_eq!(recipe.title, "Soup");
        assert_eq!(recipe.ingredients, vec!["water"]);
    }

    #[test]
    fn test_lenient_field_shapes() {
        let recipe = parse_recipe_reply(
            r#"{"recipe": {
                "name": "Bread",
                "recipeYield": 2,
                "description": "   ",
                "ingredients": [{"value": "500 g flour"}, {"text": "10 g salt"}, "  ", 7],
                "instructions": "Knead.\n\nBake."
            }}"#,
        )
        .unwrap();

        assert_eq!(recipe.title, "Bread");
        assert_eq!(recipe.servings.as_deref(), Some("2"));
        assert_eq!(recipe.description, None);
        assert_eq!(recipe.ingredients, vec!["500 g flour", "10 g salt", "7"]);
        assert_eq!(recipe.instructions, vec!["Knead.", "Bake."]);
    }

    #[test]
    fn test_non_json_reply_fails() {
        let err = parse_recipe_reply("Sorry, I could not find a recipe.").unwrap_err();
        assert!(matches!(err, TransformError::ExtractionFailed(_)));

        let err = parse_recipe_reply(r#"{"title": ["not", "a", "string"]}"#).unwrap_err();
        assert!(matches!(err, TransformError::ExtractionFailed(_)));
    }

    #[test]
    fn test_transcript_reply() {
        assert_eq!(
            parse_transcript_reply(r#"{"recipeText": "  Pancakes\n2 eggs  "}"#),
            "Pancakes\n2 eggs"
        );
        assert_eq!(parse_transcript_reply(r#"{"recipeText": ""}"#), "");
        assert_eq!(parse_transcript_reply("Pancakes\n2 eggs"), "Pancakes\n2 eggs");
    }
}
