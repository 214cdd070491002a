//! Layout templates loaded from the site's `_layouts` directory
//!
//! Each `.html` file under `_layouts/` is registered under its file stem,
//! so a document with `layout: post` renders through `_layouts/post.html`.
//! Tera inheritance works between layouts (`{% extends "default" %}`).

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::error::{Error, Result};

/// Template store backed by the site's layout files
pub struct LayoutStore {
    tera: Tera,
    names: HashSet<String>,
}

impl LayoutStore {
    /// Load every `.html` file under the layouts directory.
    ///
    /// A missing directory yields an empty store; the error surfaces later
    /// as `TemplateNotFound` naming the document that asked for a layout.
    pub fn load(layouts_dir: &Path) -> Result<Self> {
        let mut tera = Tera::default();

        // The templates receive already-rendered HTML, so autoescaping
        // would double-escape content
        tera.autoescape_on(vec![]);

        let mut templates: Vec<(String, String)> = Vec::new();
        if layouts_dir.is_dir() {
            for entry in fs::read_dir(layouts_dir)? {
                let entry = entry?;
                let path = entry.path();
                let is_layout = path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some("html");
                if !is_layout {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    templates.push((stem.to_string(), fs::read_to_string(&path)?));
                }
            }
        }
        templates.sort_by(|a, b| a.0.cmp(&b.0));

        let names = templates.iter().map(|(n, _)| n.clone()).collect();
        tera.add_raw_templates(templates)?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera, names })
    }

    /// Whether a layout with this name was loaded
    pub fn contains(&self, layout: &str) -> bool {
        self.names.contains(layout)
    }

    /// Render a layout for the given source document.
    ///
    /// An unknown layout name is fatal and reports which document
    /// requested it.
    pub fn render(&self, layout: &str, source: &Path, context: &Context) -> Result<String> {
        if !self.names.contains(layout) {
            return Err(Error::TemplateNotFound {
                layout: layout.to_string(),
                requested_by: source.to_path_buf(),
            });
        }
        Ok(self.tera.render(layout, context)?)
    }
}

/// Strip HTML tags from content
pub(crate) fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a `YYYY-MM-DD` date string with a chrono pattern
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%B %-d, %Y".to_string(),
    };

    if let Ok(date) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        return Ok(tera::Value::String(date.format(&format).to_string()));
    }

    // Not a date we recognize, leave it alone
    Ok(tera::Value::String(s))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
    pub date_format: String,
    pub posts: Vec<PostData>,
    pub pages: Vec<PageData>,
    pub categories: HashMap<String, usize>,
    pub tags: HashMap<String, usize>,
    /// Unrecognized `_config.yml` keys, as `site.extra.<key>`
    pub extra: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub date: String,
    pub path: String,
    pub permalink: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub header_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub title: String,
    pub path: String,
    pub permalink: String,
    pub content: String,
    pub layout: String,
    pub header_image: Option<String>,
}
