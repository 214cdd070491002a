//! Content module - handles posts, pages, and content processing

mod front_matter;
pub mod loader;
pub mod markdown;
mod post;

pub use front_matter::FrontMatter;
pub use loader::ContentLoader;
pub use markdown::MarkdownRenderer;
pub use post::{Page, Post};
