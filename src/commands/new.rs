//! Create a new post or page

use anyhow::Result;
use std::fs;

use crate::content::FrontMatter;
use crate::Site;

/// Create a new post or page with the front matter filled in
pub fn create(site: &Site, title: &str, layout: &str) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    // Pages land at the site root, posts get a dated filename
    let (target_dir, filename) = match layout {
        "page" => (site.base_dir.clone(), format!("{}.md", slug)),
        _ => (
            site.posts_dir.clone(),
            format!("{}-{}.md", now.format("%Y-%m-%d"), slug),
        ),
    };

    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(&filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let fm = FrontMatter {
        layout: (layout != "post").then(|| layout.to_string()),
        title: Some(title.to_string()),
        date: (layout != "page").then(|| now.format("%Y-%m-%d %H:%M:%S").to_string()),
        ..Default::default()
    };

    let content = format!("---\n{}---\n\n", fm.to_yaml()?);
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);

    Ok(())
}

/// Run the new command
pub fn run(site: &Site, title: &str, layout: Option<&str>) -> Result<()> {
    create(site, title, layout.unwrap_or("post"))
}
