//! Editable form state for reviewing a recipe before it is published.
//!
//! A [`RecipeDraft`] is built from whatever the pipeline produced and is
//! turned back into a [`StructuredRecipe`] once the user is done. Rows keep
//! their position until the user moves them.

use crate::error::ReviewError;
use crate::model::StructuredRecipe;

/// Ordered, index-addressable list of ingredient or instruction rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableList {
    name: &'static str,
    items: Vec<String>,
}

impl EditableList {
    pub fn new(name: &'static str, items: Vec<String>) -> Self {
        Self { name, items }
    }

    pub fn append(&mut self, value: impl Into<String>) {
        self.items.push(value.into());
    }

    pub fn remove(&mut self, index: usize) -> Result<String, ReviewError> {
        self.check(index)?;
        Ok(self.items.remove(index))
    }

    pub fn update(&mut self, index: usize, value: impl Into<String>) -> Result<(), ReviewError> {
        self.check(index)?;
        self.items[index] = value.into();
        Ok(())
    }

    /// Move the row at `from` so that it ends up at `to`
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), ReviewError> {
        self.check(from)?;
        self.check(to)?;
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows with content, trimmed, in order
    fn into_filled(self) -> Vec<String> {
        self.items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }

    fn check(&self, index: usize) -> Result<(), ReviewError> {
        if index >= self.items.len() {
            return Err(ReviewError::IndexOutOfRange {
                list: self.name,
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}

/// The review form for one recipe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    pub servings: String,
    pub prep_time: String,
    pub cooking_time: String,
    pub total_time: String,
    pub ingredients: EditableList,
    pub instructions: EditableList,
    pub source: String,
    pub image: String,
}

impl From<StructuredRecipe> for RecipeDraft {
    fn from(recipe: StructuredRecipe) -> Self {
        Self {
            title: recipe.title,
            description: recipe.description.unwrap_or_default(),
            servings: recipe.servings.unwrap_or_default(),
            prep_time: recipe.prep_time.unwrap_or_default(),
            cooking_time: recipe.cooking_time.unwrap_or_default(),
            total_time: recipe.total_time.unwrap_or_default(),
            ingredients: EditableList::new("ingredient", recipe.ingredients),
            instructions: EditableList::new("instruction", recipe.instructions),
            source: recipe.source.unwrap_or_default(),
            image: recipe.image.unwrap_or_default(),
        }
    }
}

impl RecipeDraft {
    /// Validate the form and produce the recipe to publish.
    pub fn into_recipe(self) -> Result<StructuredRecipe, ReviewError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ReviewError::TitleRequired);
        }

        Ok(StructuredRecipe {
            title: title.to_string(),
            description: non_blank(self.description),
            servings: non_blank(self.servings),
            prep_time: non_blank(self.prep_time),
            cooking_time: non_blank(self.cooking_time),
            total_time: non_blank(self.total_time),
            ingredients: self.ingredients.into_filled(),
            instructions: self.instructions.into_filled(),
            source: non_blank(self.source),
            image: non_blank(self.image),
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> EditableList {
        EditableList::new(
            "ingredient",
            items.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_list_editing() {
        let mut ingredients = list(&["flour", "eggs"]);
        ingredients.append("milk");
        ingredients.update(0, "250 g flour").unwrap();
        assert_eq!(ingredients.remove(1).unwrap(), "eggs");

        assert_eq!(ingredients.len(), 2);
        assert_eq!(
            ingredients.iter().collect::<Vec<_>>(),
            vec!["250 g flour", "milk"]
        );
    }

    #[test]
    fn test_move_item() {
        let mut steps = list(&["a", "b", "c", "d"]);
        steps.move_item(0, 2).unwrap();
        assert_eq!(steps.iter().collect::<Vec<_>>(), vec!["b", "c", "a", "d"]);

        steps.move_item(3, 0).unwrap();
        assert_eq!(steps.iter().collect::<Vec<_>>(), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_out_of_range() {
        let mut ingredients = list(&["flour"]);
        assert_eq!(
            ingredients.remove(1),
            Err(ReviewError::IndexOutOfRange {
                list: "ingredient",
                index: 1,
                len: 1
            })
        );
        assert!(ingredients.update(5, "x").is_err());
        assert!(ingredients.move_item(0, 1).is_err());
        assert_eq!(ingredients.len(), 1);
    }

    #[test]
    fn test_draft_round_trip_cleans_up() {
        let mut draft = RecipeDraft::from(StructuredRecipe {
            title: "  Pancakes ".to_string(),
            description: Some("Fluffy".to_string()),
            ingredients: vec!["flour".to_string(), "eggs".to_string()],
            instructions: vec!["Mix.".to_string()],
            source: Some("https://example.com/p".to_string()),
            ..Default::default()
        });
        draft.description = "   ".to_string();
        draft.servings = "4".to_string();
        draft.ingredients.append("");
        draft.instructions.append("  Fry. ");

        let recipe = draft.into_recipe().unwrap();
        assert_eq!(recipe.title, "Pancakes");
        assert_eq!(recipe.description, None);
        assert_eq!(recipe.servings.as_deref(), Some("4"));
        assert_eq!(recipe.prep_time, None);
        assert_eq!(recipe.ingredients, vec!["flour", "eggs"]);
        assert_eq!(recipe.instructions, vec!["Mix.", "Fry."]);
        assert_eq!(recipe.source.as_deref(), Some("https://example.com/p"));
        assert_eq!(recipe.image, None);
    }

    #[test]
    fn test_title_required() {
        let draft = RecipeDraft::from(StructuredRecipe {
            title: " ".to_string(),
            ingredients: vec!["flour".to_string()],
            ..Default::default()
        });
        assert_eq!(draft.into_recipe(), Err(ReviewError::TitleRequired));
    }
}
