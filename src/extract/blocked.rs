use crate::render::{element_text, StaticPage};

const TITLE_SIGNALS: [&str; 5] = ["access denied", "403", "blocked", "captcha", "just a moment"];
const HEADING_SIGNALS: [&str; 3] = ["access denied", "403", "blocked"];

/// True when the page looks like a bot-wall or access-denied interstitial.
/// Unreadable page state counts as not blocked (fail-open) so extraction
/// still gets a best-effort attempt.
pub fn is_access_denied(page: &StaticPage) -> bool {
    if let Some(title) = page.title() {
        let title = title.to_lowercase();
        if TITLE_SIGNALS.iter().any(|s| title.contains(s)) {
            return true;
        }
    }

    for selector in ["h1", "h2"] {
        for el in page.select(selector) {
            let text = element_text(&el).to_lowercase();
            if HEADING_SIGNALS.iter().any(|s| text.contains(s)) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_title() {
        let page = StaticPage::parse("<html><head><title>Access Denied</title></head></html>");
        assert!(is_access_denied(&page));

        let page = StaticPage::parse("<html><head><title>Just a moment...</title></head></html>");
        assert!(is_access_denied(&page));
    }

    #[test]
    fn test_blocked_heading() {
        let page = StaticPage::parse(
            "<html><head><title>Widget Shop</title></head><body><h1>403 Forbidden</h1></body></html>",
        );
        assert!(is_access_denied(&page));

        let page = StaticPage::parse(
            "<html><body><h2>Your request was BLOCKED</h2></body></html>",
        );
        assert!(is_access_denied(&page));
    }

    #[test]
    fn test_normal_page_not_blocked() {
        let page = StaticPage::parse(
            "<html><head><title>Blue Widget - Shop</title></head><body><h1>Blue Widget</h1></body></html>",
        );
        assert!(!is_access_denied(&page));
    }

    #[test]
    fn test_empty_page_not_blocked() {
        let page = StaticPage::parse("");
        assert!(!is_access_denied(&page));
    }
}
