//! Post and Page models

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDateTime,

    /// Raw markdown body (front matter stripped)
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Rendered excerpt (text before the excerpt separator)
    pub excerpt: Option<String>,

    /// Post categories
    pub categories: Vec<String>,

    /// Post tags
    pub tags: Vec<String>,

    /// Header image path, if any
    pub header_image: Option<String>,

    /// Layout template to use
    pub layout: String,

    /// Source file path relative to the site root; this is the post's identity
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// Root-relative URL path with a leading slash, e.g. `/2024/01/15/slug/`
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Slug (URL-friendly name derived from the filename)
    pub slug: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: NaiveDateTime, source: String) -> Self {
        Self {
            title,
            date,
            raw: String::new(),
            content: String::new(),
            excerpt: None,
            categories: Vec::new(),
            tags: Vec::new(),
            header_image: None,
            layout: "post".to_string(),
            source: source.clone(),
            full_source: PathBuf::from(source),
            path: String::new(),
            permalink: String::new(),
            slug: String::new(),
            extra: IndexMap::new(),
        }
    }
}

/// A standalone page (anything outside the posts directory)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Raw markdown body (front matter stripped)
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Header image path, if any
    pub header_image: Option<String>,

    /// Layout template to use
    pub layout: String,

    /// Source file path relative to the site root
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// Root-relative URL path with a leading slash, e.g. `/about/`
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, source: String) -> Self {
        Self {
            title,
            raw: String::new(),
            content: String::new(),
            header_image: None,
            layout: "page".to_string(),
            source: source.clone(),
            full_source: PathBuf::from(source),
            path: String::new(),
            permalink: String::new(),
            extra: IndexMap::new(),
        }
    }
}
