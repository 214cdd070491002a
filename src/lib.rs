//! galley: a small Jekyll-flavored static site generator
//!
//! This crate loads markdown posts and pages with YAML front matter,
//! renders them through Tera layouts, and writes a static site with a
//! date-sorted index, an atom feed, and a search index.

pub mod assembler;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod server;

use anyhow::Result;
use std::path::Path;

/// The main site handle
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Posts directory
    pub posts_dir: std::path::PathBuf,
    /// Layouts directory
    pub layouts_dir: std::path::PathBuf,
    /// Output directory
    pub output_dir: std::path::PathBuf,
}

impl Site {
    /// Create a new Site instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);
        let layouts_dir = base_dir.join(&config.layouts_dir);
        let output_dir = base_dir.join(&config.output_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            layouts_dir,
            output_dir,
        })
    }

    /// Build the static site
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, layout: Option<&str>) -> Result<()> {
        commands::new::run(self, title, layout)
    }
}
