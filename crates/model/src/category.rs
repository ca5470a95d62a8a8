use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tab carries at most this many category labels.
pub const MAX_CATEGORIES: usize = 3;

/// Closed classification vocabulary. Labels outside this set are
/// discarded wherever classifier output is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Category {
    News,
    Technology,
    #[serde(rename = "Developer Docs")]
    DeveloperDocs,
    Research,
    Video,
    Social,
    Shopping,
    Entertainment,
    Finance,
    Sports,
    Productivity,
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::News,
        Category::Technology,
        Category::DeveloperDocs,
        Category::Research,
        Category::Video,
        Category::Social,
        Category::Shopping,
        Category::Entertainment,
        Category::Finance,
        Category::Sports,
        Category::Productivity,
        Category::Other,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Technology => "Technology",
            Category::DeveloperDocs => "Developer Docs",
            Category::Research => "Research",
            Category::Video => "Video",
            Category::Social => "Social",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Finance => "Finance",
            Category::Sports => "Sports",
            Category::Productivity => "Productivity",
            Category::Other => "Other",
        }
    }

    #[must_use]
    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
    }

    /// Normalize raw classifier labels: unknown labels are dropped,
    /// duplicates collapse to the first occurrence, the result is capped
    /// at [`MAX_CATEGORIES`], and an empty result defaults to `Other`.
    #[must_use]
    pub fn normalize_labels<S: AsRef<str>>(raw: &[S]) -> Vec<Category> {
        let mut out = Vec::new();
        for label in raw {
            let Some(category) = Category::from_label(label.as_ref()) else {
                continue;
            };
            if !out.contains(&category) {
                out.push(category);
            }
            if out.len() == MAX_CATEGORIES {
                break;
            }
        }
        if out.is_empty() {
            out.push(Category::Other);
        }
        out
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
