use html_escape::decode_html_entities;
use log::debug;
use scraper::{Html, Selector};
use serde_json::Value;

/// Find the main image of a recipe page.
///
/// Looks at the JSON-LD `Recipe` object first, then falls back to the
/// `og:image` meta tag. Relative URLs are resolved against `page_url`.
pub fn find_recipe_image(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let image = json_ld_image(&document).or_else(|| open_graph_image(&document))?;
    let image = decode_html_symbols(image.trim());
    if image.is_empty() {
        return None;
    }

    match url::Url::parse(page_url).and_then(|base| base.join(&image)) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(_) => Some(image),
    }
}

fn json_ld_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;

    document.select(&selector).find_map(|script| {
        let text = script.text().collect::<String>();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(json) => find_recipe(&json).and_then(|recipe| image_url(&recipe["image"])),
            Err(e) => {
                debug!("Skipping unparsable JSON-LD block: {}", e);
                None
            }
        }
    })
}

/// Walk top-level arrays and `@graph` containers looking for a Recipe node
fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(map) => {
            if is_recipe_type(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_recipe)
        }
        _ => None,
    }
}

fn is_recipe_type(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .any(|t| t.as_str().is_some_and(|t| t.eq_ignore_ascii_case("recipe"))),
        _ => false,
    }
}

/// `image` may be a string, an ImageObject, or a list of either; take the first
fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("contentUrl"))
            .and_then(Value::as_str)
            .map(String::from),
        Value::Array(items) => items.iter().find_map(image_url),
        _ => None,
    }
}

fn open_graph_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[property='og:image'], meta[name='og:image']").ok()?;
    document
        .select(&selector)
        .find_map(|meta| meta.value().attr("content"))
        .map(String::from)
}

fn decode_html_symbols(text: &str) -> String {
    // some sites double-encode entities inside JSON-LD
    decode_html_entities(&decode_html_entities(text)).into_owned()
}
