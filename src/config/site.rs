//! Site configuration (_config.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,
    pub permalink: String,

    // Directory
    pub posts_dir: String,
    pub layouts_dir: String,
    pub output_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub excerpt_separator: String,
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Feed
    pub feed_limit: usize,

    // Store any additional fields (exposed to templates as site.extra)
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "A Galley Blog".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            permalink: ":year/:month/:day/:title/".to_string(),

            posts_dir: "_posts".to_string(),
            layouts_dir: "_layouts".to_string(),
            output_dir: "_site".to_string(),
            exclude: Vec::new(),

            excerpt_separator: "<!-- more -->".to_string(),
            date_format: "%B %-d, %Y".to_string(),
            highlight: HighlightConfig::default(),

            feed_limit: 20,

            extra: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Compile the exclude globs, warning about and dropping invalid ones
    pub fn exclude_patterns(&self) -> Vec<glob::Pattern> {
        self.exclude
            .iter()
            .filter_map(|pattern| match glob::Pattern::new(pattern) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Ignoring invalid exclude pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect()
    }
}

/// Syntax highlighting configuration for fenced code blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_numbers: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
        }
    }
}
