//! Content loader - loads posts and pages from the site tree

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{front_matter::FrontMatter, markdown, MarkdownRenderer, Page, Post};
use crate::error::Error;
use crate::Site;

/// Loads posts and pages from the site directory.
///
/// Files with malformed front matter are skipped with a warning naming the
/// file; the rest of the site still builds. Unreadable files are treated
/// the same way.
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
    excludes: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self {
            site,
            renderer: MarkdownRenderer::new(&site.config.highlight),
            excludes: site.config.exclude_patterns(),
        }
    }

    /// Load all posts, sorted by date descending.
    ///
    /// Equal dates fall back to source-path order so builds stay
    /// deterministic.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        if !self.site.posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&self.site.posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) && !self.is_excluded(path) {
                match self.load_post(path) {
                    Ok(post) => posts.push(post),
                    Err(e) => {
                        tracing::warn!("Skipping post {}: {}", path.display(), e);
                    }
                }
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.source.cmp(&b.source)));

        Ok(posts)
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path) -> Result<Post, Error> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content).map_err(|e| e.with_path(path))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let filename_date = split_date_prefix(stem);

        // Date: front matter, else the filename prefix, else file mtime
        let date = fm
            .parse_date()
            .or(filename_date.map(|(d, _)| d.and_hms_opt(0, 0, 0).unwrap_or_default()))
            .unwrap_or_else(|| file_mtime(path));

        // The slug comes from the filename, not the title
        let slug = slug::slugify(filename_date.map(|(_, rest)| rest).unwrap_or(stem));

        let title = fm.title.clone().unwrap_or_else(|| slug.clone());

        let source = self.relative_source(path);
        let url_path = self.generate_permalink(&date, &slug, &fm.categories);
        let permalink = format!(
            "{}{}",
            self.site.config.url.trim_end_matches('/'),
            url_path
        );

        let (excerpt_md, full_md) =
            markdown::split_excerpt(body, &self.site.config.excerpt_separator);
        let content_html = self.renderer.render(&full_md);
        let excerpt_html = excerpt_md.as_deref().map(|e| self.renderer.render(e));

        let mut post = Post::new(title, date, source);
        post.raw = body.to_string();
        post.content = content_html;
        post.excerpt = excerpt_html;
        post.categories = fm.categories;
        post.tags = fm.tags;
        post.header_image = fm.header_image;
        post.layout = fm.layout.unwrap_or_else(|| "post".to_string());
        post.full_source = path.to_path_buf();
        post.path = url_path;
        post.permalink = permalink;
        post.slug = slug;
        post.extra = fm.extra;

        Ok(post)
    }

    /// Load all pages (markdown files outside `_`-prefixed directories)
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.site.base_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.starts_with(&self.site.output_dir) {
                continue;
            }
            let relative = path.strip_prefix(&self.site.base_dir).unwrap_or(path);

            // Skip _posts, _layouts, dotfiles, and anything else living
            // under a special directory
            let special = relative.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('_') || s.starts_with('.'))
                    .unwrap_or(false)
            });
            if special {
                continue;
            }

            if path.is_file() && is_markdown_file(path) && !self.is_excluded(path) {
                match self.load_page(path) {
                    Ok(page) => pages.push(page),
                    Err(e) => {
                        tracing::warn!("Skipping page {}: {}", path.display(), e);
                    }
                }
            }
        }

        pages.sort_by(|a, b| a.source.cmp(&b.source));

        Ok(pages)
    }

    /// Load a single page from a file
    fn load_page(&self, path: &Path) -> Result<Page, Error> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content).map_err(|e| e.with_path(path))?;

        let title = fm.title.clone().unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let source = self.relative_source(path);

        // about.md renders at /about/, dir/index.md at /dir/
        let without_ext = source
            .trim_end_matches(".md")
            .trim_end_matches(".markdown");
        let page_path = if without_ext == "index" || without_ext.ends_with("/index") {
            without_ext.trim_end_matches("index").to_string()
        } else {
            format!("{}/", without_ext)
        };
        let url_path = format!(
            "{}{}",
            self.site.config.root,
            page_path.trim_start_matches('/')
        );

        let permalink = format!(
            "{}{}",
            self.site.config.url.trim_end_matches('/'),
            url_path
        );

        let mut page = Page::new(title, source);
        page.raw = body.to_string();
        page.content = self.renderer.render(body);
        page.header_image = fm.header_image;
        page.layout = fm.layout.unwrap_or_else(|| "page".to_string());
        page.full_source = path.to_path_buf();
        page.path = url_path;
        page.permalink = permalink;
        page.extra = fm.extra;

        Ok(page)
    }

    /// Source path relative to the site root
    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.base_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Whether a path matches one of the configured exclude patterns
    fn is_excluded(&self, path: &Path) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let relative = self.relative_source(path);
        self.excludes.iter().any(|p| p.matches(&relative))
    }

    /// Generate the URL path from the permalink pattern
    fn generate_permalink(
        &self,
        date: &NaiveDateTime,
        slug: &str,
        categories: &[String],
    ) -> String {
        let pattern = &self.site.config.permalink;

        let category = categories
            .first()
            .map(|c| slug::slugify(c))
            .unwrap_or_default();

        let result = pattern
            .replace(":year", &date.format("%Y").to_string())
            .replace(":month", &date.format("%m").to_string())
            .replace(":day", &date.format("%d").to_string())
            .replace(":i_month", &date.format("%-m").to_string())
            .replace(":i_day", &date.format("%-d").to_string())
            .replace(":title", slug)
            .replace(":category", &category);

        format!(
            "{}{}",
            self.site.config.root,
            result.trim_start_matches('/')
        )
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Split a Jekyll-style `YYYY-MM-DD-rest` filename into date and slug part
fn split_date_prefix(stem: &str) -> Option<(NaiveDate, &str)> {
    let mut parts = stem.splitn(4, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    let rest = parts.next().unwrap_or("");

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    if rest.is_empty() {
        None
    } else {
        Some((date, rest))
    }
}

/// File modification time as a naive timestamp, falling back to now
fn file_mtime(path: &Path) -> NaiveDateTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| chrono::DateTime::<chrono::Local>::from(t).naive_local())
        .unwrap_or_else(|_| chrono::Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;
    use std::fs;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn site_in(dir: &Path) -> Site {
        write(
            &dir.join("_config.yml"),
            "title: Test Blog\nurl: https://example.com\n",
        );
        Site::new(dir).unwrap()
    }

    #[test]
    fn test_posts_sorted_date_descending() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(
            &dir.join("_posts/2023-05-01-oldest.md"),
            "---\ntitle: Oldest\ndate: 2023-05-01\n---\nA\n",
        );
        write(
            &dir.join("_posts/2024-02-10-newest.md"),
            "---\ntitle: Newest\ndate: 2024-02-10\n---\nB\n",
        );
        write(
            &dir.join("_posts/2023-11-20-middle.md"),
            "---\ntitle: Middle\ndate: 2023-11-20\n---\nC\n",
        );

        let site = site_in(dir);
        let posts = ContentLoader::new(&site).load_posts().unwrap();

        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
        assert!(posts.windows(2).all(|w| w[0].date > w[1].date));
    }

    #[test]
    fn test_malformed_post_is_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(
            &dir.join("_posts/2024-01-01-good.md"),
            "---\ntitle: Good\ndate: 2024-01-01\n---\nok\n",
        );
        write(
            &dir.join("_posts/2024-01-02-bad.md"),
            "---\ntitle: Never closed\n",
        );

        let site = site_in(dir);
        let posts = ContentLoader::new(&site).load_posts().unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Good");
    }

    #[test]
    fn test_date_from_filename_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(
            &dir.join("_posts/2024-03-09-from-filename.md"),
            "---\ntitle: No Date Key\n---\nBody\n",
        );

        let site = site_in(dir);
        let posts = ContentLoader::new(&site).load_posts().unwrap();

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].date.format("%Y-%m-%d").to_string(), "2024-03-09");
        assert_eq!(posts[0].slug, "from-filename");
        assert_eq!(posts[0].path, "/2024/03/09/from-filename/");
        assert_eq!(
            posts[0].permalink,
            "https://example.com/2024/03/09/from-filename/"
        );
    }

    #[test]
    fn test_page_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(&dir.join("about.md"), "---\ntitle: About\n---\nHi\n");
        write(&dir.join("projects/index.md"), "# Projects\n");

        let site = site_in(dir);
        let pages = ContentLoader::new(&site).load_pages().unwrap();

        let paths: Vec<_> = pages.iter().map(|p| p.path.as_str()).collect();
        assert!(paths.contains(&"/about/"));
        assert!(paths.contains(&"/projects/"));
    }

    #[test]
    fn test_page_without_front_matter_is_all_body() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(&dir.join("notes.md"), "# Hello\n");

        let site = site_in(dir);
        let pages = ContentLoader::new(&site).load_pages().unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].layout, "page");
        assert!(pages[0].content.contains("<h1>Hello</h1>"));
    }

    #[test]
    fn test_exclude_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(
            &dir.join("_config.yml"),
            "title: T\nexclude:\n  - \"README.md\"\n  - \"drafts/**\"\n",
        );
        write(&dir.join("README.md"), "# Readme\n");
        write(&dir.join("drafts/wip.md"), "# WIP\n");
        write(&dir.join("about.md"), "# About\n");

        let site = Site::new(dir).unwrap();
        let pages = ContentLoader::new(&site).load_pages().unwrap();

        let sources: Vec<_> = pages.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["about.md"]);
    }

    #[test]
    fn test_split_date_prefix() {
        let (date, rest) = split_date_prefix("2024-01-15-swift-concurrency").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(rest, "swift-concurrency");

        assert!(split_date_prefix("no-date-here").is_none());
        assert!(split_date_prefix("2024-13-01-bad-month").is_none());
    }
}
