//! Guideline catalog model.

use serde::{Deserialize, Serialize};

/// Severity tier of a guideline.
///
/// The three MISRA tiers are modeled explicitly; anything else (stylistic or
/// informational tiers, or an empty label from a malformed catalog header) is
/// kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Category {
    Mandatory,
    Required,
    Advisory,
    Other(String),
}

impl Category {
    /// Tiers that always appear in tallies and summary tables.
    pub const KNOWN: [Category; 3] = [Category::Mandatory, Category::Required, Category::Advisory];

    /// Map a catalog label to a category.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Mandatory" => Self::Mandatory,
            "Required" => Self::Required,
            "Advisory" => Self::Advisory,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Mandatory => "Mandatory",
            Self::Required => "Required",
            Self::Advisory => "Advisory",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

/// One catalog entry for a MISRA guideline. `directive` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub directive: String,
    pub category: Category,
    pub rationale: String,
}

impl Rule {
    pub fn new(directive: impl Into<String>, category: Category, rationale: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            category,
            rationale: rationale.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_to_tiers() {
        assert_eq!(Category::from_label("Mandatory"), Category::Mandatory);
        assert_eq!(Category::from_label("Required"), Category::Required);
        assert_eq!(Category::from_label("Advisory"), Category::Advisory);
    }

    #[test]
    fn unknown_label_round_trips_through_display() {
        let category = Category::from_label("Style");
        assert_eq!(category, Category::Other("Style".to_string()));
        assert_eq!(category.to_string(), "Style");
    }

    #[test]
    fn serializes_as_plain_label() {
        let json = serde_json::to_value(Category::Other("Style".to_string())).unwrap();
        assert_eq!(json, "Style");
        let back: Category = serde_json::from_value(serde_json::json!("Advisory")).unwrap();
        assert_eq!(back, Category::Advisory);
    }

    #[test]
    fn known_tiers_sort_before_other() {
        let mut categories = vec![
            Category::Other("Style".to_string()),
            Category::Advisory,
            Category::Mandatory,
            Category::Required,
        ];
        categories.sort();
        assert_eq!(
            categories,
            vec![
                Category::Mandatory,
                Category::Required,
                Category::Advisory,
                Category::Other("Style".to_string()),
            ]
        );
    }
}
