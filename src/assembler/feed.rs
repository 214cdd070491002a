//! Atom feed and search index generation

use anyhow::Result;
use std::fs;

use super::layouts::strip_html;
use crate::content::Post;
use crate::Site;

/// Generate the Atom feed at `atom.xml`
pub fn write_atom_feed(site: &Site, posts: &[Post]) -> Result<()> {
    let base_url = site.config.url.trim_end_matches('/');

    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    feed.push('\n');
    feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
    feed.push('\n');
    feed.push_str(&format!(
        "  <title>{}</title>\n",
        escape_xml(&site.config.title)
    ));
    feed.push_str(&format!(
        "  <link href=\"{}/atom.xml\" rel=\"self\"/>\n",
        base_url
    ));
    feed.push_str(&format!("  <link href=\"{}/\"/>\n", base_url));
    feed.push_str(&format!(
        "  <updated>{}</updated>\n",
        chrono::Utc::now().to_rfc3339()
    ));
    feed.push_str(&format!("  <id>{}/</id>\n", base_url));
    feed.push_str(&format!(
        "  <author><name>{}</name></author>\n",
        escape_xml(&site.config.author)
    ));

    for post in posts.iter().take(site.config.feed_limit) {
        let link = format!("{}{}", base_url, post.path);

        feed.push_str("  <entry>\n");
        feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
        feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
        feed.push_str(&format!("    <id>{}</id>\n", link));
        feed.push_str(&format!(
            "    <published>{}</published>\n",
            post.date.and_utc().to_rfc3339()
        ));
        feed.push_str(&format!(
            "    <updated>{}</updated>\n",
            post.date.and_utc().to_rfc3339()
        ));

        for category in &post.categories {
            feed.push_str(&format!(
                "    <category term=\"{}\"/>\n",
                escape_xml(category)
            ));
        }

        // Feed readers show the excerpt when one exists, else the full post
        let content = post.excerpt.as_ref().unwrap_or(&post.content);
        let absolute = convert_relative_urls_to_absolute(content, base_url);
        let clean = strip_invalid_xml_chars(&absolute);
        feed.push_str(&format!(
            "    <content type=\"html\"><![CDATA[{}]]></content>\n",
            clean
        ));
        feed.push_str("  </entry>\n");
    }

    feed.push_str("</feed>\n");

    let output_path = site.output_dir.join("atom.xml");
    fs::write(&output_path, feed)?;
    tracing::info!("Generated atom.xml");

    Ok(())
}

/// Generate the search index at `search.json`
pub fn write_search_index(site: &Site, posts: &[Post]) -> Result<()> {
    let search_data: Vec<serde_json::Value> = posts
        .iter()
        .map(|p| {
            serde_json::json!({
                "title": p.title,
                "url": p.path,
                "date": p.date.format("%Y-%m-%d").to_string(),
                "categories": p.categories,
                "tags": p.tags,
                "content": strip_html(&p.content),
            })
        })
        .collect();

    let output_path = site.output_dir.join("search.json");
    let json = serde_json::to_string_pretty(&search_data)?;
    fs::write(&output_path, json)?;
    tracing::info!("Generated search.json");

    Ok(())
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Convert relative `href`/`src` URLs in HTML content to absolute URLs
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip control characters XML 1.0 does not allow.
/// Allowed: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use std::path::Path;

    fn site_in(dir: &Path) -> Site {
        fs::write(
            dir.join("_config.yml"),
            "title: Feed & Friends\nauthor: Jo\nurl: https://example.com\nfeed_limit: 2\n",
        )
        .unwrap();
        Site::new(dir).unwrap()
    }

    fn post(title: &str, day: u32) -> Post {
        let date = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut p = Post::new(title.to_string(), date, format!("_posts/{}.md", title));
        p.path = format!("/2024/01/{:02}/{}/", day, title);
        p.permalink = format!("https://example.com{}", p.path);
        p.content = format!("<p>{} <img src=\"/img/x.png\"></p>", title);
        p
    }

    #[test]
    fn test_atom_feed_escapes_and_limits() {
        let tmp = tempfile::tempdir().unwrap();
        let site = site_in(tmp.path());
        fs::create_dir_all(&site.output_dir).unwrap();

        let posts = vec![post("newest", 3), post("middle", 2), post("oldest", 1)];
        write_atom_feed(&site, &posts).unwrap();

        let feed = fs::read_to_string(site.output_dir.join("atom.xml")).unwrap();
        assert!(feed.contains("<title>Feed &amp; Friends</title>"));
        // feed_limit: 2 keeps the two newest entries
        assert!(feed.contains("<title>newest</title>"));
        assert!(feed.contains("<title>middle</title>"));
        assert!(!feed.contains("<title>oldest</title>"));
        // entry links are absolute
        assert!(feed.contains("<link href=\"https://example.com/2024/01/03/newest/\"/>"));
        // relative image URLs inside content become absolute
        assert!(feed.contains("src=\"https://example.com/img/x.png\""));
    }

    #[test]
    fn test_search_index_strips_html() {
        let tmp = tempfile::tempdir().unwrap();
        let site = site_in(tmp.path());
        fs::create_dir_all(&site.output_dir).unwrap();

        let mut p = post("hello", 1);
        p.content = "<p>Hello <b>world</b></p>".to_string();
        p.tags = vec!["swift".to_string()];
        write_search_index(&site, &[p]).unwrap();

        let json = fs::read_to_string(site.output_dir.join("search.json")).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["title"], "hello");
        assert_eq!(parsed[0]["url"], "/2024/01/01/hello/");
        assert_eq!(parsed[0]["content"], "Hello world");
        assert_eq!(parsed[0]["tags"][0], "swift");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b < c"), "a &amp; b &lt; c");
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("ok\u{0008}fine\n"), "okfine\n");
        // Characters beyond the BMP are valid XML and must pass through
        assert_eq!(
            strip_invalid_xml_chars("done \u{1F389} \u{1D49E}"),
            "done \u{1F389} \u{1D49E}"
        );
    }

    #[test]
    fn test_atom_feed_keeps_emoji_content() {
        let tmp = tempfile::tempdir().unwrap();
        let site = site_in(tmp.path());
        fs::create_dir_all(&site.output_dir).unwrap();

        let mut p = post("release", 1);
        p.content = "<p>Shipped it \u{1F389} with Swift 6</p>".to_string();
        write_atom_feed(&site, &[p]).unwrap();

        let feed = fs::read_to_string(site.output_dir.join("atom.xml")).unwrap();
        assert!(feed.contains("Shipped it \u{1F389} with Swift 6"));
    }
}
