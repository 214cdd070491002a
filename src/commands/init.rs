//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    // Create directory structure
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("_posts"))?;
    fs::create_dir_all(target_dir.join("_layouts"))?;
    fs::create_dir_all(target_dir.join("css"))?;

    // Create default _config.yml
    let config_content = r#"# Site
title: My Blog
description: ""
author: ""

# URL
url: http://example.com
root: /
permalink: :year/:month/:day/:title/

# Directories
posts_dir: _posts
layouts_dir: _layouts
output_dir: _site
exclude: []

# Writing
excerpt_separator: "<!-- more -->"
date_format: "%B %-d, %Y"
highlight:
  enable: true
  theme: base16-ocean.dark
  line_numbers: false

# Feed
feed_limit: 20
"#;

    fs::write(target_dir.join("_config.yml"), config_content)?;

    // Default layouts
    fs::write(
        target_dir.join("_layouts/default.html"),
        include_str!("scaffold/default.html"),
    )?;
    fs::write(
        target_dir.join("_layouts/post.html"),
        include_str!("scaffold/post.html"),
    )?;
    fs::write(
        target_dir.join("_layouts/page.html"),
        include_str!("scaffold/page.html"),
    )?;
    fs::write(
        target_dir.join("_layouts/index.html"),
        include_str!("scaffold/index.html"),
    )?;

    fs::write(
        target_dir.join("css/style.css"),
        include_str!("scaffold/style.css"),
    )?;

    // Create a sample post
    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Welcome
date: {}
---

This is your first post. Edit or delete it, then start writing.

<!-- more -->

Posts live in `_posts` and are named `YYYY-MM-DD-title.md`. Create one with:

```bash
$ galley new "My New Post"
```

Build the site into `_site`:

```bash
$ galley build
```

Preview it locally while you write:

```bash
$ galley serve
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(
        target_dir.join(format!("_posts/{}-welcome.md", now.format("%Y-%m-%d"))),
        sample_post,
    )?;

    // Create an about page
    fs::write(
        target_dir.join("about.md"),
        "---\ntitle: About\nlayout: page\n---\n\nSay something about yourself here.\n",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;

    #[test]
    fn test_init_creates_buildable_site() {
        let tmp = tempfile::tempdir().unwrap();
        init_site(tmp.path()).unwrap();

        assert!(tmp.path().join("_config.yml").exists());
        assert!(tmp.path().join("_layouts/default.html").exists());
        assert!(tmp.path().join("_layouts/index.html").exists());
        assert!(tmp.path().join("about.md").exists());

        // A freshly initialized site builds without errors
        let site = Site::new(tmp.path()).unwrap();
        site.build().unwrap();

        let index = fs::read_to_string(site.output_dir.join("index.html")).unwrap();
        assert!(index.contains("Welcome"));
        assert!(site.output_dir.join("about/index.html").exists());
        assert!(site.output_dir.join("css/style.css").exists());
    }
}
