//! Read-only category source.
//!
//! Tasks refer to categories by name only. Resolution goes through
//! [`CategoryDirectory`], which tolerates names it does not know.

use serde::{Deserialize, Serialize};

/// Filter value meaning "every category".
pub const ALL_CATEGORIES: &str = "All";

/// Display colour for tasks whose category is unknown.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub color: String, // display hint, opaque here
}

// Category plus the number of tasks currently referencing it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub task_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryDirectory {
    categories: Vec<Category>,
}

impl CategoryDirectory {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    // exact, case-sensitive name match
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn color_of(&self, name: &str) -> &str {
        self.get(name)
            .map_or(DEFAULT_CATEGORY_COLOR, |c| c.color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> CategoryDirectory {
        CategoryDirectory::new(vec![
            Category {
                id: 1,
                name: "Work".into(),
                color: "#5b21b6".into(),
            },
            Category {
                id: 2,
                name: "Personal".into(),
                color: "#059669".into(),
            },
        ])
    }

    #[test]
    fn resolves_known_colour() {
        assert_eq!(directory().color_of("Work"), "#5b21b6");
    }

    #[test]
    fn unknown_or_differently_cased_name_falls_back() {
        let dir = directory();
        assert_eq!(dir.color_of("Gardening"), DEFAULT_CATEGORY_COLOR);
        assert_eq!(dir.color_of("work"), DEFAULT_CATEGORY_COLOR);
        assert!(dir.get("work").is_none());
    }

    #[test]
    fn names_keep_directory_order() {
        let dir = directory();
        let names: Vec<&str> = dir.names().collect();
        assert_eq!(names, ["Work", "Personal"]);
    }
}
