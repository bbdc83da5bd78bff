//! Category model

use serde::{Deserialize, Serialize};

/// Category entity.
///
/// `alias` is derived from `name` when the category is created and is not
/// changed by later renames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name
    pub name: String,
    /// URL-friendly alias
    pub alias: String,
}

impl Category {
    /// Create a new, not yet persisted category with an empty alias.
    pub fn new(name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            alias: String::new(),
        }
    }
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    /// New name (optional)
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new_has_no_alias_yet() {
        let category = Category::new("Politique".to_string());

        assert_eq!(category.id, 0);
        assert_eq!(category.name, "Politique");
        assert!(category.alias.is_empty());
    }

    #[test]
    fn test_create_input_ignores_alias_field() {
        let input: CreateCategoryInput =
            serde_json::from_str(r#"{"name": "Sport", "alias": "forced"}"#).unwrap();
        assert_eq!(input.name, "Sport");
    }
}
