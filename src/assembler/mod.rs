//! Assembler module - renders content through layouts and writes the site

mod feed;
pub mod layouts;

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use walkdir::WalkDir;

use crate::content::{Page, Post};
use crate::error::Error;
use crate::Site;
use self::layouts::{LayoutStore, PageData, PostData, SiteData};

/// Site assembler backed by the layouts in `_layouts/`
pub struct Assembler {
    site: Site,
    layouts: LayoutStore,
    excludes: Vec<glob::Pattern>,
}

impl Assembler {
    /// Create a new assembler for the site
    pub fn new(site: &Site) -> Result<Self> {
        let layouts = LayoutStore::load(&site.layouts_dir)?;

        Ok(Self {
            site: site.clone(),
            layouts,
            excludes: site.config.exclude_patterns(),
        })
    }

    /// Assemble the entire site.
    ///
    /// The index page is written last so it always reflects the final set
    /// of rendered posts.
    pub fn assemble(&self, posts: &[Post], pages: &[Page]) -> Result<()> {
        fs::create_dir_all(&self.site.output_dir)?;

        self.copy_static_assets()?;

        let mut sorted_posts: Vec<_> = posts.to_vec();
        sorted_posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.source.cmp(&b.source)));

        let site_data = self.build_site_data(&sorted_posts, pages);

        for post in &sorted_posts {
            self.render_post(post, &site_data)?;
        }
        tracing::info!("Generated {} posts", sorted_posts.len());

        for page in pages {
            self.render_page(page, &site_data)?;
        }
        tracing::info!("Generated {} pages", pages.len());

        feed::write_atom_feed(&self.site, &sorted_posts)?;
        feed::write_search_index(&self.site, &sorted_posts)?;

        self.render_index(&site_data)?;

        Ok(())
    }

    /// Render a single post through its layout
    fn render_post(&self, post: &Post, site_data: &SiteData) -> Result<()> {
        if let Some(ref image) = post.header_image {
            self.check_asset(image, &post.full_source);
        }

        let mut context = self.base_context(site_data);
        context.insert("page", &post_data(post));
        context.insert("content", &post.content);

        let html = self
            .layouts
            .render(&post.layout, &post.full_source, &context)?;
        self.write_output(&post.path, &html)?;
        tracing::debug!("Generated post: {}", post.path);

        Ok(())
    }

    /// Render a standalone page through its layout
    fn render_page(&self, page: &Page, site_data: &SiteData) -> Result<()> {
        if let Some(ref image) = page.header_image {
            self.check_asset(image, &page.full_source);
        }

        let mut context = self.base_context(site_data);
        context.insert("page", &page_data(page));
        context.insert("content", &page.content);

        let html = self
            .layouts
            .render(&page.layout, &page.full_source, &context)?;
        self.write_output(&page.path, &html)?;
        tracing::debug!("Generated page: {}", page.path);

        Ok(())
    }

    /// Render the site index through the `index` layout
    fn render_index(&self, site_data: &SiteData) -> Result<()> {
        let index_page = PageData {
            title: self.site.config.title.clone(),
            path: self.site.config.root.clone(),
            permalink: self.site.config.url.trim_end_matches('/').to_string()
                + &self.site.config.root,
            content: String::new(),
            layout: "index".to_string(),
            header_image: None,
        };

        let mut context = self.base_context(site_data);
        context.insert("page", &index_page);
        context.insert("content", "");

        let html = self
            .layouts
            .render("index", Path::new("index"), &context)?;

        let output_path = self.site.output_dir.join("index.html");
        fs::write(&output_path, html)?;
        tracing::info!("Generated index");

        Ok(())
    }

    /// Create a context with the shared site data
    fn base_context(&self, site_data: &SiteData) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context
    }

    /// Build the `site` object exposed to every layout
    fn build_site_data(&self, posts: &[Post], pages: &[Page]) -> SiteData {
        let mut categories: HashMap<String, usize> = HashMap::new();
        let mut tags: HashMap<String, usize> = HashMap::new();

        for post in posts {
            for cat in &post.categories {
                *categories.entry(cat.clone()).or_insert(0) += 1;
            }
            for tag in &post.tags {
                *tags.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        SiteData {
            title: self.site.config.title.clone(),
            description: self.site.config.description.clone(),
            author: self.site.config.author.clone(),
            url: self.site.config.url.clone(),
            root: self.site.config.root.clone(),
            date_format: self.site.config.date_format.clone(),
            posts: posts.iter().map(post_data).collect(),
            pages: pages.iter().map(page_data).collect(),
            categories,
            tags,
            extra: self.site.config.extra.clone(),
        }
    }

    /// Write rendered HTML as a pretty URL (`path/index.html`)
    fn write_output(&self, url_path: &str, html: &str) -> Result<()> {
        let clean_path = url_path.trim_start_matches('/');
        let output_path = self.site.output_dir.join(clean_path).join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        Ok(())
    }

    /// Warn when a referenced asset does not exist in the source tree
    fn check_asset(&self, asset: &str, source: &Path) {
        if asset.starts_with("http://") || asset.starts_with("https://") || asset.starts_with("//")
        {
            return;
        }

        let root = self.site.config.root.as_str();
        let relative = asset.strip_prefix(root).unwrap_or(asset);
        let candidate = self.site.base_dir.join(relative.trim_start_matches('/'));
        if !candidate.exists() {
            tracing::warn!(
                "{} (referenced by {})",
                Error::UnresolvedAsset {
                    path: PathBuf::from(asset)
                },
                source.display()
            );
        }
    }

    /// Copy non-markdown files (images, css, etc.) into the output directory
    fn copy_static_assets(&self) -> Result<()> {
        for entry in WalkDir::new(&self.site.base_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str());
            if matches!(ext, Some("md") | Some("markdown")) {
                continue;
            }

            // Output, layouts, posts, and dot directories are not assets
            if path.starts_with(&self.site.output_dir) {
                continue;
            }
            let relative = path.strip_prefix(&self.site.base_dir)?;
            let special = relative.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('_') || s.starts_with('.'))
                    .unwrap_or(false)
            });
            if special {
                continue;
            }

            let relative_str = relative.to_string_lossy().replace('\\', "/");
            if self.excludes.iter().any(|p| p.matches(&relative_str)) {
                continue;
            }

            let dest = self.site.output_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}

/// Template data for one post
fn post_data(post: &Post) -> PostData {
    PostData {
        title: post.title.clone(),
        date: post.date.format("%Y-%m-%d").to_string(),
        path: post.path.clone(),
        permalink: post.permalink.clone(),
        content: post.content.clone(),
        excerpt: post.excerpt.clone(),
        categories: post.categories.clone(),
        tags: post.tags.clone(),
        header_image: post.header_image.clone(),
    }
}

/// Template data for one page
fn page_data(page: &Page) -> PageData {
    PageData {
        title: page.title.clone(),
        path: page.path.clone(),
        permalink: page.permalink.clone(),
        content: page.content.clone(),
        layout: page.layout.clone(),
        header_image: page.header_image.clone(),
    }
}
