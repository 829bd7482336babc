pub mod client;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Page-fetch failures. Timeouts are recoverable per URL; callers decide
/// whether the run continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request failed for {url}: {message}")]
    Request { url: String, message: String },
}

// ── Page source seam ──────────────────────────────────────────────────────────

/// Swappable page-rendering collaborator. The production binding fetches
/// over HTTP and parses statically; tests substitute canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<StaticPage, FetchError>;
}

// ── Queryable page ────────────────────────────────────────────────────────────

/// A rendered page exposed as a queryable DOM.
pub struct StaticPage {
    doc: Html,
}

impl StaticPage {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    /// Page `<title>` text, if present.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").map(|el| element_text(&el))
    }

    /// All elements matching a CSS selector. Invalid selectors match nothing.
    pub fn select(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.doc.select(&sel).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        self.select(selector).into_iter().next()
    }

    /// Visible text of the `<body>`, segments joined with spaces.
    pub fn body_text(&self) -> String {
        self.select_first("body")
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }
}

// ── Element helpers ───────────────────────────────────────────────────────────

/// Trimmed text content of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Descendant elements of `el` matching `selector`.
pub fn select_within<'a>(el: &ElementRef<'a>, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(sel) => el.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// Element text with `<sup>` descendants excluded. Cent superscripts would
/// otherwise glue onto the main amount ("$39" + "99" → "3999").
pub fn text_excluding_sup(el: &ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        if let scraper::Node::Text(text) = node.value() {
            let in_sup = node
                .ancestors()
                .take_while(|a| a.id() != el.id())
                .any(|a| {
                    matches!(a.value(), scraper::Node::Element(e)
                        if e.name().eq_ignore_ascii_case("sup"))
                });
            if !in_sup {
                out.push_str(text);
            }
        }
    }
    out.trim().to_string()
}

// ── Test support ──────────────────────────────────────────────────────────────


// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let page = StaticPage::parse("<html><head><title>Access Denied</title></head></html>");
        assert_eq!(page.title().as_deref(), Some("Access Denied"));

        let untitled = StaticPage::parse("<html><body></body></html>");
        assert_eq!(untitled.title(), None);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let page = StaticPage::parse("<html><body><div>hi</div></body></html>");
        assert!(page.select(">>>").is_empty());
        assert!(page.select_first("div >").is_none());
    }

    #[test]
    fn test_body_text_joins_segments() {
        let page = StaticPage::parse("<html><body><p>$19.99</p><p>$149.00</p></body></html>");
        let body = page.body_text();
        assert!(body.contains("$19.99"));
        assert!(body.contains("$149.00"));
    }

    #[test]
    fn test_text_excluding_sup() {
        let page = StaticPage::parse(
            r#"<html><body><span class="price">$39<sup>99</sup></span></body></html>"#,
        );
        let el = page.select_first(".price").unwrap();
        assert_eq!(text_excluding_sup(&el), "$39");
        assert_eq!(element_text(&el), "$3999");
    }

    #[test]
    fn test_nested_sup_excluded() {
        let page = StaticPage::parse(
            r#"<html><body><div class="price"><span>1,299</span><sup><b>00</b></sup></div></body></html>"#,
        );
        let el = page.select_first(".price").unwrap();
        assert_eq!(text_excluding_sup(&el), "1,299");
    }
}
