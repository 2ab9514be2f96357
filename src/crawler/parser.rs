//! HTML text and link extraction
//!
//! This module turns a fetched page into:
//! - The visible text, in document order, for the full-text index
//! - Every outbound reference (hyperlinks and embedded resources) resolved
//!   to an absolute URL
//! - The page title, for logging
//!
//! Extraction is host-agnostic; deciding which links to follow is up to the
//! coordinator.

use crate::url::resolve_reference;
use crate::ShioriError;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose content is never rendered as text
const NON_RENDERED: &[&str] = &["script", "style"];

/// Elements that start a new line of text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// The page title (from the first <title> tag)
    pub title: Option<String>,

    /// Visible text in document order
    pub text: String,

    /// Absolute URLs of every reference on the page, duplicates included
    pub links: Vec<String>,
}

/// Decodes a fetched body as UTF-8 HTML
///
/// A body that is not valid UTF-8 is a parse failure for that page.
pub fn decode_body<'a>(body: &'a [u8], url: &str) -> Result<&'a str, ShioriError> {
    std::str::from_utf8(body).map_err(|e| ShioriError::Parse {
        url: url.to_string(),
        message: format!("body is not valid UTF-8: {}", e),
    })
}

/// Extracts text, links and title from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`
/// - `<link href="...">` (stylesheets, icons, canonical links)
/// - `<img src="...">` and `<script src="...">`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` references
/// - Fragment-only references (same page anchors)
/// - References that fail to resolve or resolve to a non-HTTP(S) URL
///
/// Fragments are stripped from resolved URLs.
///
/// # Text Extraction Rules
///
/// Text nodes are concatenated in document order. Everything inside
/// `<script>` and `<style>` is skipped, however deeply nested. Block-level
/// elements are separated by a line break so adjacent headings and
/// paragraphs do not run together.
///
/// # Example
///
/// ```
/// use shiori::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Vec</title></head>
///     <body><p>A growable array.</p><a href="slice.html">slices</a>
///     <script>var hidden = 1;</script></body></html>"#;
/// let base_url = Url::parse("https://example.com/std/vec.html").unwrap();
/// let page = extract_page(html, &base_url);
///
/// assert_eq!(page.title, Some("Vec".to_string()));
/// assert!(page.text.contains("A growable array."));
/// assert!(!page.text.contains("hidden"));
/// assert_eq!(page.links, vec!["https://example.com/std/slice.html".to_string()]);
/// ```
pub fn extract_page(html: &str, base_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let mut page = ExtractedPage {
        title: extract_title(&document),
        ..ExtractedPage::default()
    };

    walk(document.root_element(), base_url, &mut page);

    page.text = page.text.trim().to_string();
    page
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// One pending step of the document walk
enum Step<'a> {
    Enter(ElementRef<'a>),
    Text(&'a str),
    /// End of a block element
    Break,
}

/// Depth-first walk collecting links and visible text
///
/// Pending steps live on a heap stack, so arbitrarily deep nesting costs
/// memory rather than call-stack frames.
fn walk(root: ElementRef<'_>, base_url: &Url, page: &mut ExtractedPage) {
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        let element = match step {
            Step::Text(text) => {
                page.text.push_str(text);
                continue;
            }
            Step::Break => {
                break_line(&mut page.text);
                continue;
            }
            Step::Enter(element) => element,
        };

        let name = element.value().name();

        // Script sources are collected even though script text is not
        if let Some(attribute) = reference_attribute(name) {
            if let Some(reference) = element.value().attr(attribute) {
                if let Some(absolute) = resolve_reference(base_url, reference) {
                    page.links.push(absolute.to_string());
                }
            }
        }

        if NON_RENDERED.contains(&name) {
            continue;
        }

        let is_block = BLOCK_ELEMENTS.contains(&name);
        if is_block {
            break_line(&mut page.text);
            stack.push(Step::Break);
        }

        // Reversed so the first child is popped first
        for child in element.children().rev() {
            match child.value() {
                Node::Text(text) => stack.push(Step::Text(&**text)),
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        stack.push(Step::Enter(child_element));
                    }
                }
                _ => {}
            }
        }
    }
}

/// The attribute holding the outbound reference of an element, if any
fn reference_attribute(name: &str) -> Option<&'static str> {
    match name {
        "a" | "link" => Some("href"),
        "img" | "script" => Some("src"),
        _ => None,
    }
}

fn break_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push('\n');
    }
}
