//! Build error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading content and assembling the site.
///
/// `MalformedFrontMatter` is recoverable per file: the loader skips the file
/// with a warning and keeps going. `TemplateNotFound` is fatal and halts the
/// whole build. `UnresolvedAsset` is reported and the build continues.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed front matter in {}: {reason}", path.display())]
    MalformedFrontMatter { path: PathBuf, reason: String },

    // The field cannot be called `source`: thiserror reserves that name
    // for the error chain and the path is not an inner error.
    #[error("layout '{layout}' not found (requested by {})", requested_by.display())]
    TemplateNotFound {
        layout: String,
        requested_by: PathBuf,
    },

    #[error("unresolved asset: {}", path.display())]
    UnresolvedAsset { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl Error {
    /// Build a `MalformedFrontMatter` for a file that is not yet tied to a
    /// path (the parser sees only text; the loader fills the path in).
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrontMatter {
            path: PathBuf::new(),
            reason: reason.into(),
        }
    }

    /// Attach the source path to a front-matter error.
    pub fn with_path(self, new_path: impl Into<PathBuf>) -> Self {
        match self {
            Self::MalformedFrontMatter { reason, .. } => Self::MalformedFrontMatter {
                path: new_path.into(),
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_file() {
        let err = Error::malformed("mapping values are not allowed").with_path("_posts/bad.md");
        assert_eq!(
            err.to_string(),
            "malformed front matter in _posts/bad.md: mapping values are not allowed"
        );

        let err = Error::TemplateNotFound {
            layout: "fancy".to_string(),
            requested_by: PathBuf::from("_posts/2024-01-01-a.md"),
        };
        assert_eq!(
            err.to_string(),
            "layout 'fancy' not found (requested by _posts/2024-01-01-a.md)"
        );

        let err = Error::UnresolvedAsset {
            path: PathBuf::from("/img/missing.png"),
        };
        assert_eq!(err.to_string(), "unresolved asset: /img/missing.png");
    }

    #[test]
    fn test_taxonomy_errors_carry_no_inner_cause() {
        let err = Error::TemplateNotFound {
            layout: "post".to_string(),
            requested_by: PathBuf::from("about.md"),
        };
        assert!(std::error::Error::source(&err).is_none());
    }
}
