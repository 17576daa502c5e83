use serde::{Deserialize, Serialize};

/// A persisted post. `slug` is globally unique and is the public lookup key;
/// `date` is a `YYYY-MM-DD HH:MM:SS` string (lexicographic order matches
/// chronological order) and may be empty for undated legacy content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub post_type: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub gallery_images: Vec<String>,
}

/// A not-yet-persisted post produced by the importer or an author action.
///
/// `id_hint` carries the WordPress post id when importing; the bulk-import path
/// uses it as the preferred row id but skips a conflicting id rather than
/// overwriting. `0` means "let the store assign one".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub id_hint: i64,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub post_type: String,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub gallery_images: Vec<String>,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            id_hint: 0,
            title: "Untitled".to_string(),
            slug: String::new(),
            date: String::new(),
            content: String::new(),
            excerpt: String::new(),
            status: "publish".to_string(),
            post_type: "post".to_string(),
            categories: Vec::new(),
            tags: Vec::new(),
            featured_image: None,
            gallery_images: Vec::new(),
        }
    }
}

/// Partial update for a post. Fields left as `None` keep their current value.
/// Setting `slug` triggers re-allocation against the rest of the table.
/// `featured_image` is doubly optional so a patch can clear it explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub post_type: Option<String>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<Option<String>>,
    pub gallery_images: Option<Vec<String>>,
}
