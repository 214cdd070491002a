//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Markdown renderer with optional syntax highlighting.
///
/// Rendering is a pure function of the input text: the same body always
/// produces byte-identical HTML, and nothing here can fail a build.
/// Constructs pulldown-cmark does not recognize come out as literal text.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a renderer from the site's highlight configuration
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_numbers,
        }
    }

    /// Render markdown body text to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front matter is handled before the body reaches this point, so
        // YAML metadata blocks stay disabled here.
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // (language hint, accumulated content) while inside a fence
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, content)) = code_block.take() {
                        let rendered = self.render_code_block(&content, lang.as_deref());
                        events.push(Event::Html(CowStr::from(rendered)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, content)) = code_block.as_mut() {
                        content.push_str(&text);
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Render one fenced or indented code block.
    ///
    /// The block content is never interpreted: it is either HTML-escaped
    /// verbatim, or passed to syntect when highlighting is on and the
    /// language hint resolves to a known syntax.
    fn render_code_block(&self, code: &str, lang: Option<&str>) -> String {
        if self.highlight {
            if let Some(lang) = lang {
                let syntax = self
                    .syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang));

                if let (Some(syntax), Some(theme)) =
                    (syntax, self.theme_set.themes.get(&self.theme_name))
                {
                    match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
                        Ok(highlighted) if self.line_numbers => {
                            return wrap_line_numbers(&highlighted, code, lang);
                        }
                        Ok(highlighted) => return highlighted,
                        Err(_) => {}
                    }
                }
            }
        }

        plain_code_block(code, lang)
    }
}

/// The language hint is the first token of the fence info string
fn fence_language(info: &str) -> Option<String> {
    info.split([' ', '\t', ','])
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Escape-only code block; stripping the wrapper and unescaping yields the
/// original content exactly.
fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    let escaped = html_escape(code);
    match lang {
        Some(lang) => format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            html_escape(lang),
            escaped
        ),
        None => format!("<pre><code>{}</code></pre>", escaped),
    }
}

/// Wrap highlighted output in a gutter table.
///
/// The gutter is counted from the source lines so it never depends on how
/// syntect chose to break its markup.
fn wrap_line_numbers(rendered: &str, code: &str, lang: &str) -> String {
    let count = code.lines().count().max(1);
    let gutter: Vec<String> = (1..=count)
        .map(|i| format!(r#"<span class="line-number">{}</span>"#, i))
        .collect();

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        html_escape(lang),
        gutter.join("\n"),
        rendered
    )
}

/// Split body text on the excerpt separator.
///
/// Returns `(excerpt, full)` where `full` is the body with the separator
/// removed. Without a separator the excerpt is `None`.
pub fn split_excerpt(content: &str, separator: &str) -> (Option<String>, String) {
    match content.split_once(separator) {
        Some((before, after)) => {
            let excerpt = before.trim().to_string();
            let full = format!("{}\n\n{}", excerpt, after.trim());
            (Some(excerpt), full)
        }
        None => (None, content.to_string()),
    }
}

/// Simple HTML escaping
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
