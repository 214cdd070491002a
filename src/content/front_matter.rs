//! Front-matter parsing

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_seq<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrSeq;

    impl<'de> Visitor<'de> for StringOrSeq {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                items.push(item);
            }
            Ok(items)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrSeq)
}

/// Front-matter data from a post or page.
///
/// The recognized keys are `layout`, `title`, `date`, `categories`, `tags`
/// and `header_image`; anything else lands in `extra`. The `date` value is
/// kept as the raw string so that re-serializing is lossless; callers parse
/// it on demand with [`FrontMatter::parse_date`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        deserialize_with = "string_or_seq",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<String>,
    #[serde(
        deserialize_with = "string_or_seq",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front matter from the start of a content string.
    ///
    /// Returns `(front_matter, remaining_body)`. A file without a leading
    /// `---` line has no front matter: the mapping is empty and the whole
    /// input is the body. A leading `---` with no closing `---` line, or a
    /// block that is not valid YAML, is [`Error::MalformedFrontMatter`].
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        // A byte-order mark does not count against the delimiter position.
        let input = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(after_open) = strip_open_delimiter(input) else {
            return Ok((Self::default(), input));
        };

        let mut offset = 0;
        for line in after_open.split_inclusive('\n') {
            if is_delimiter_line(line) {
                let yaml = &after_open[..offset];
                let body = after_open[offset + line.len()..].trim_start_matches(['\r', '\n']);

                if yaml.trim().is_empty() {
                    return Ok((Self::default(), body));
                }

                let fm: FrontMatter =
                    serde_yaml::from_str(yaml).map_err(|e| Error::malformed(e.to_string()))?;
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(Error::malformed(
            "opening '---' delimiter without a closing '---'",
        ))
    }

    /// Serialize the mapping back to YAML.
    ///
    /// Only keys that are present are emitted, so parse → to_yaml → parse
    /// is lossless for the recognized key set.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse the `date` value, accepting the common date and datetime forms.
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Strip a leading `---` delimiter line, returning the rest of the input.
fn strip_open_delimiter(input: &str) -> Option<&str> {
    let rest = input.strip_prefix("---")?;
    match rest.as_bytes().first() {
        Some(b'\n') => Some(&rest[1..]),
        Some(b'\r') if rest.as_bytes().get(1) == Some(&b'\n') => Some(&rest[2..]),
        // A lone `---` is an opening delimiter with nothing after it.
        None => Some(rest),
        _ => None,
    }
}

/// A delimiter line is `---` with nothing but a line ending after it.
fn is_delimiter_line(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

/// Parse a date string in the formats posts actually use
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // Try RFC 3339 / ISO 8601 with an offset
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_front_matter() {
        let content = r#"---
layout: post
title: Measuring Unit Test Performance
date: 2024-01-15 10:30:00
tags:
  - testing
  - xcode
categories:
  - ios
header_image: /images/xctest.png
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.layout.as_deref(), Some("post"));
        assert_eq!(fm.title.as_deref(), Some("Measuring Unit Test Performance"));
        assert_eq!(fm.tags, vec!["testing", "xcode"]);
        assert_eq!(fm.categories, vec!["ios"]);
        assert_eq!(fm.header_image.as_deref(), Some("/images/xctest.png"));
        assert!(body.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_single_string_tags() {
        let content = "---\ntitle: T\ntags: swift\ncategories: dev\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["swift"]);
        assert_eq!(fm.categories, vec!["dev"]);
    }

    #[test]
    fn test_no_front_matter_is_empty_mapping() {
        let content = "# Hello\n\nJust markdown.\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_front_matter_is_an_error() {
        let content = "---\ntitle: Where is the rest\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, Error::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_lone_delimiter_is_an_error() {
        let err = FrontMatter::parse("---").unwrap_err();
        assert!(matches!(err, Error::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nBody\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, Error::MalformedFrontMatter { .. }));
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = FrontMatter::parse("---\n---\nBody\n").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_horizontal_rule_is_not_a_delimiter() {
        // Four dashes open nothing; the whole file is body.
        let content = "----\n\nBody text.\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let content = "---\nlayout: post\ntitle: \"X\"\ndate: 2024-01-01\ntags:\n  - a\n  - b\nheader_image: /images/x.png\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();

        let yaml = fm.to_yaml().unwrap();
        let reparsed: FrontMatter = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(fm, reparsed);
    }

    #[test]
    fn test_extra_keys_are_preserved() {
        let content = "---\ntitle: T\ncomments: true\nauthor: someone\n---\nBody\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.extra.get("comments").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(
            fm.extra.get("author").and_then(|v| v.as_str()),
            Some("someone")
        );

        let yaml = fm.to_yaml().unwrap();
        let reparsed: FrontMatter = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(fm, reparsed);
    }

    #[test]
    fn test_parse_date_forms() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        let fm = FrontMatter {
            date: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_quoted_title_and_raw_date_string() {
        let content = "---\ntitle: \"X\"\ndate: 2024-01-01\n---\nBody **text**.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("X"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-01"));
        assert_eq!(body, "Body **text**.");
    }

    #[test]
    fn test_bom_is_stripped_before_delimiter_check() {
        let content = "\u{feff}---\ntitle: Bom\n---\nBody\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Bom"));
        assert_eq!(body, "Body\n");
    }
}
