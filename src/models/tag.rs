//! Tag model

use serde::{Deserialize, Serialize};

/// Tag entity, attached to posts through `post_tags`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag name
    pub name: String,
}

impl Tag {
    pub fn new(name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
        }
    }
}

/// Input for creating a tag
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTagInput {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("Élections".to_string());

        assert_eq!(tag.id, 0);
        assert_eq!(tag.name, "Élections");
    }
}
