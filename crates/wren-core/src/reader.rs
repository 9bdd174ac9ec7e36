//! Reader mode
//!
//! Readable content is pulled out of the document source once a page has
//! finished loading, then shown on demand in an overlay page.

use scraper::{ElementRef, Html, Selector};

use wren_view::escape_html;

const FONT_SCALE: f64 = 1.3;
const WIDTH_DIVISOR: f64 = 1.5;
const MAX_BLOCKS: usize = 320;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readable {
    pub title: Option<String>,
    /// Sanitized HTML fragment
    pub content_html: String,
}

/// Extract the main text of a document. `None` when nothing readable is found.
pub fn extract_readable(source: &str) -> Option<Readable> {
    let doc = Html::parse_document(source);
    let content_html = extract_content_html(&doc);

    if content_html.trim().is_empty() {
        return None;
    }

    Some(Readable {
        title: extract_title(&doc),
        content_html,
    })
}

fn first_text(doc: &Html, selector: &str, min_len: usize) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|text| text.len() >= min_len.max(1))
}

fn first_meta(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .find(|content| !content.is_empty())
}

fn extract_title(doc: &Html) -> Option<String> {
    first_meta(doc, "meta[property='og:title']")
        .or_else(|| first_text(doc, "title", 1))
        .or_else(|| first_text(doc, "h1", 6))
}

fn extract_content_html(doc: &Html) -> String {
    let selectors = [("article", 400usize), ("main, [role='main']", 400usize), ("body", 0usize)];

    for (selector_str, min_len) in selectors {
        let Ok(sel) = Selector::parse(selector_str) else {
            continue;
        };

        let best = doc
            .select(&sel)
            .map(|el| (element_text_len(&el), el))
            .max_by_key(|(score, _)| *score);

        if let Some((score, el)) = best {
            let rendered = render_blocks(&el);
            if score >= min_len && !rendered.trim().is_empty() {
                return rendered;
            }
        }
    }

    String::new()
}

fn element_text_len(el: &ElementRef<'_>) -> usize {
    el.text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.len())
        .sum()
}

fn render_blocks(root: &ElementRef<'_>) -> String {
    let Ok(block_sel) = Selector::parse("h2, h3, p, blockquote, pre, li") else {
        return String::new();
    };

    let mut out = String::new();

    for el in root.select(&block_sel).take(MAX_BLOCKS) {
        let tag = el.value().name();
        let text = if tag == "pre" {
            el.text().collect::<String>().trim_end().to_string()
        } else {
            normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
        };

        if text.is_empty() {
            continue;
        }

        let escaped = escape_html(&text);
        match tag {
            "h2" | "h3" | "blockquote" => {
                out.push_str(&format!("<{tag}>{escaped}</{tag}>\n"));
            }
            "pre" => out.push_str(&format!("<pre><code>{escaped}</code></pre>\n")),
            "li" => out.push_str(&format!("<p>• {escaped}</p>\n")),
            // Short paragraphs are navigation crumbs, captions and the like
            _ if text.len() < 20 => {}
            _ => out.push_str(&format!("<p>{escaped}</p>\n")),
        }
    }

    out
}

fn normalize_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Result of toggling reading mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderChange {
    /// Put this page on the overlay surface
    Show(String),
    /// Take the overlay down, uncovering the page
    Hide,
    /// Nothing readable; reading mode stays off
    Unavailable,
}

/// Whether the reading overlay covers the page.
#[derive(Debug, Default)]
pub struct ReaderOverlay {
    active: bool,
}

impl ReaderOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Leave reading mode. Returns whether the overlay was shown.
    pub fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }

    pub fn toggle(
        &mut self,
        title: &str,
        readable_content: &str,
        document_font_size: f64,
        view_width: u32,
    ) -> ReaderChange {
        if self.hide() {
            return ReaderChange::Hide;
        }

        if readable_content.is_empty() {
            tracing::debug!("No readable content for this page");
            return ReaderChange::Unavailable;
        }

        self.active = true;
        ReaderChange::Show(render_overlay(title, readable_content, document_font_size, view_width))
    }
}

fn render_overlay(title: &str, content: &str, document_font_size: f64, view_width: u32) -> String {
    let font_size = document_font_size * FONT_SCALE;
    let width = (f64::from(view_width) / WIDTH_DIVISOR).round();

    format!(
        "<html><head><style type='text/css'>\
         *:not(img) {{font-size: {font_size:.1}pt; background-color: #333333; color: #e6e6e6; \
         margin-left: auto; margin-right: auto; width: {width}px}}\
         </style><title>{title}</title></head><body>{content}</body></html>",
        title = escape_html(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html><head>
          <title>Fallback title</title>
          <meta property="og:title" content="  The  Real   Title ">
        </head><body>
          <nav><p>Home</p></nav>
          <article>
            <h2>Chapter one</h2>
            <p>This paragraph is long enough to be considered readable content by the extractor.</p>
            <p>Short</p>
            <ul><li>First point</li></ul>
            <pre>let x = 1;
let y = 2;</pre>
            <p>Another paragraph with <b>markup</b> &amp; entities that must be escaped properly.</p>
          </article>
        </body></html>
    "#;

    #[test]
    fn test_extract_article() {
        let readable = extract_readable(ARTICLE).unwrap();

        assert_eq!(readable.title.as_deref(), Some("The Real Title"));
        assert!(readable.content_html.contains("<h2>Chapter one</h2>"));
        assert!(readable.content_html.contains("<p>• First point</p>"));
        assert!(readable.content_html.contains("<pre><code>let x = 1;\nlet y = 2;</code></pre>"));
        assert!(readable.content_html.contains("markup &amp; entities"));
        assert!(!readable.content_html.contains("<p>Short</p>"));
        assert!(!readable.content_html.contains("Home"));
    }

    #[test]
    fn test_title_fallback() {
        let html = "<html><head><title>Plain</title></head><body>\
                    <p>Body paragraph long enough to count as readable.</p></body></html>";
        let readable = extract_readable(html).unwrap();
        assert_eq!(readable.title.as_deref(), Some("Plain"));
    }

    #[test]
    fn test_nothing_readable() {
        assert!(extract_readable("<html><body><p>Hi</p></body></html>").is_none());
        assert!(extract_readable("").is_none());
    }

    #[test]
    fn test_overlay_toggle() {
        let mut overlay = ReaderOverlay::new();

        assert_eq!(overlay.toggle("Empty", "", 11.0, 900), ReaderChange::Unavailable);
        assert!(!overlay.is_active());

        let ReaderChange::Show(html) = overlay.toggle("A <title>", "<p>text</p>", 10.0, 900) else {
            panic!("overlay not shown");
        };
        assert!(overlay.is_active());
        assert!(html.contains("font-size: 13.0pt"));
        assert!(html.contains("width: 600px"));
        assert!(html.contains("<title>A &lt;title&gt;</title>"));
        assert!(html.contains("<p>text</p>"));

        assert_eq!(overlay.toggle("A", "<p>text</p>", 10.0, 900), ReaderChange::Hide);
        assert!(!overlay.is_active());

        // Leaving and entering again renders the same content
        assert!(matches!(overlay.toggle("A", "<p>text</p>", 10.0, 900), ReaderChange::Show(_)));
        assert!(overlay.hide());
        assert!(!overlay.hide());
    }
}
