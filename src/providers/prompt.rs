use crate::model::MeasurementSystem;

/// Instructions for the combined extract + translate + convert call.
///
/// Prompts are loaded from text files at compile time using `include_str!`,
/// making them easy to edit without dealing with Rust string syntax.
pub const TRANSFORM_PROMPT: &str = include_str!("prompts/transform.txt");

/// JSON shape every structured recipe reply must follow
pub const RECIPE_SCHEMA_PROMPT: &str = include_str!("prompts/recipe_schema.txt");

/// Instructions for transcribing one or more photographed pages
pub const IMAGE_TRANSCRIBE_PROMPT: &str = include_str!("prompts/image_transcribe.txt");

pub const TRANSLATE_PROMPT: &str = include_str!("prompts/translate.txt");

pub const CONVERT_UNITS_PROMPT: &str = include_str!("prompts/convert_units.txt");

/// Languages offered in the settings, by code.
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pt", "Portuguese"),
    ("pl", "Polish"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("nb", "Norwegian"),
    ("fi", "Finnish"),
    ("cs", "Czech"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
];

/// Resolve a language code to its English name; anything else passes through.
pub fn language_name(language: &str) -> &str {
    let trimmed = language.trim();
    LANGUAGES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(trimmed))
        .map(|(_, name)| *name)
        .unwrap_or(trimmed)
}

fn system_label(system: MeasurementSystem) -> &'static str {
    match system {
        MeasurementSystem::Metric => "metric",
        MeasurementSystem::Us => "US customary",
    }
}

/// Build the system prompt for the combined transform call.
pub fn build_transform_prompt(target_language: &str, system: MeasurementSystem) -> String {
    let prompt = TRANSFORM_PROMPT
        .replace("{target_language}", language_name(target_language))
        .replace("{measurement_system}", system_label(system));
    format!("{}\n{}", prompt, RECIPE_SCHEMA_PROMPT)
}

/// Build the translate prompt; `structured` asks for the recipe JSON shape.
pub fn build_translate_prompt(target_language: &str, structured: bool) -> String {
    let prompt = TRANSLATE_PROMPT.replace("{target_language}", language_name(target_language));
    if structured {
        format!("{}\n{}", prompt, RECIPE_SCHEMA_PROMPT)
    } else {
        format!("{}\nReply with the translated recipe text only.", prompt)
    }
}

/// Build the unit conversion prompt; `structured` asks for the recipe JSON shape.
pub fn build_convert_units_prompt(system: MeasurementSystem, structured: bool) -> String {
    let prompt = CONVERT_UNITS_PROMPT.replace("{measurement_system}", system_label(system));
    if structured {
        format!("{}\n{}", prompt, RECIPE_SCHEMA_PROMPT)
    } else {
        format!("{}\nReply with the converted recipe text only.", prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_embedded() {
        assert!(!TRANSFORM_PROMPT.is_empty());
        assert!(RECIPE_SCHEMA_PROMPT.contains("\"ingredients\""));
        assert!(RECIPE_SCHEMA_PROMPT.contains("\"cookingTime\""));
        assert!(IMAGE_TRANSCRIBE_PROMPT.contains("recipeText"));
        assert!(TRANSLATE_PROMPT.contains("{target_language}"));
        assert!(CONVERT_UNITS_PROMPT.contains("{measurement_system}"));
    }

    #[test]
    fn test_build_transform_prompt_fills_placeholders() {
        let prompt = build_transform_prompt("fr", MeasurementSystem::Us);
        assert!(prompt.contains("natural-sounding French"));
        assert!(prompt.contains("US customary system"));
        assert!(!prompt.contains("{target_language}"));
        assert!(!prompt.contains("{measurement_system}"));
        assert!(prompt.contains("\"instructions\""));
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("de"), "German");
        assert_eq!(language_name(" EN "), "English");
        assert_eq!(language_name("Klingon"), "Klingon");
    }

    #[test]
    fn test_plain_and_structured_quick_fix_prompts() {
        let plain = build_convert_units_prompt(MeasurementSystem::Metric, false);
        assert!(plain.contains("metric"));
        assert!(!plain.contains("\"ingredients\""));

        let structured = build_translate_prompt("it", true);
        assert!(structured.contains("Italian"));
        assert!(structured.contains("\"ingredients\""));
    }
}
