//! Ordered price-extraction strategies over untrusted retailer HTML.
//!
//! Strategies run in a fixed order with short-circuit on first success:
//! structured data, then the price meta tag, then common price selectors,
//! then a dollar-amount scan of the body text. A failure inside one
//! strategy is a miss for that strategy only.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::blocked::is_access_denied;
use super::price::parse_price;
use crate::render::{text_excluding_sup, StaticPage};

/// One extraction approach. Returns the raw price string on success.
pub trait PriceStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn try_extract(&self, page: &StaticPage) -> Option<String>;
}

pub struct PriceCascade {
    strategies: Vec<Box<dyn PriceStrategy>>,
}

impl PriceCascade {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(StructuredData),
                Box::new(MetaTag),
                Box::new(SelectorScan::new()),
                Box::new(BodyTextFallback::new()),
            ],
        }
    }

    /// First valid price found, or `None`. Blocked pages short-circuit
    /// without running any strategy.
    pub fn extract(&self, page: &StaticPage) -> Option<String> {
        if is_access_denied(page) {
            debug!("Access denied / blocked page, skipping price extraction");
            return None;
        }

        for strategy in &self.strategies {
            if let Some(price) = strategy.try_extract(page) {
                debug!("{}: extracted {}", strategy.name(), price);
                return Some(price);
            }
        }
        None
    }
}

impl Default for PriceCascade {
    fn default() -> Self {
        Self::new()
    }
}

// ── 1. JSON-LD structured data ────────────────────────────────────────────────

struct StructuredData;

impl PriceStrategy for StructuredData {
    fn name(&self) -> &'static str {
        "structured-data"
    }

    fn try_extract(&self, page: &StaticPage) -> Option<String> {
        for script in page.select("script[type='application/ld+json']") {
            let raw = script.text().collect::<String>();
            let Ok(data) = serde_json::from_str::<Value>(&raw) else {
                continue;
            };
            let Some(price) = data
                .get("offers")
                .and_then(|offers| offers.as_object())
                .and_then(|offers| offers.get("price"))
            else {
                continue;
            };
            let price = match price {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if parse_price(&price).is_some() {
                return Some(price);
            }
        }
        None
    }
}

// ── 2. Price meta tag ─────────────────────────────────────────────────────────

struct MetaTag;

impl PriceStrategy for MetaTag {
    fn name(&self) -> &'static str {
        "meta-tag"
    }

    fn try_extract(&self, page: &StaticPage) -> Option<String> {
        let meta = page.select_first("meta[property='product:price:amount']")?;
        let content = meta.value().attr("content")?.trim().to_string();
        parse_price(&content).is_some().then_some(content)
    }
}

// ── 3. Common ecommerce selectors ─────────────────────────────────────────────

const PRICE_SELECTORS: [&str; 6] = [
    "[itemprop='price']",
    ".price",
    ".product-price",
    "[class*='price']",
    "[data-testid*='price']",
    ".offer-price",
];

struct SelectorScan {
    amount: Regex,
}

impl SelectorScan {
    fn new() -> Self {
        Self {
            amount: Regex::new(r"\d+[.,]?\d{0,2}").unwrap(),
        }
    }
}

impl PriceStrategy for SelectorScan {
    fn name(&self) -> &'static str {
        "selector-scan"
    }

    fn try_extract(&self, page: &StaticPage) -> Option<String> {
        for selector in PRICE_SELECTORS {
            for el in page.select(selector) {
                // <sup> cent fragments excluded so they can't glue onto
                // the main amount.
                let text = text_excluding_sup(&el);
                let Some(m) = self.amount.find(&text) else {
                    continue;
                };
                let price = m.as_str().to_string();
                if parse_price(&price).is_some() {
                    return Some(price);
                }
            }
        }
        None
    }
}

// ── 4. Body-text fallback ─────────────────────────────────────────────────────

struct BodyTextFallback {
    dollar: Regex,
}

impl BodyTextFallback {
    fn new() -> Self {
        Self {
            dollar: Regex::new(r"\$\s*(\d+[.,]?\d{0,2})").unwrap(),
        }
    }
}

impl PriceStrategy for BodyTextFallback {
    fn name(&self) -> &'static str {
        "body-text"
    }

    /// Returns the highest in-range dollar figure on the page. Heuristic:
    /// strikethrough and unrelated small amounts tend to sit below the
    /// actual product price.
    fn try_extract(&self, page: &StaticPage) -> Option<String> {
        let body = page.body_text();
        let best = self
            .dollar
            .captures_iter(&body)
            .filter_map(|c| parse_price(c.get(1)?.as_str()))
            .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))));
        best.map(format_amount)
    }
}

/// Keep at least one decimal place so "149" renders as "149.0".
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> StaticPage {
        StaticPage::parse(&format!(
            "<html><head><title>Widget Shop</title></head><body>{}</body></html>",
            body
        ))
    }

    #[test]
    fn test_structured_data_wins_over_selector() {
        let page = page(
            r#"<script type="application/ld+json">
                {"@type":"Product","offers":{"price":"129.99","priceCurrency":"AUD"}}
               </script>
               <span class="price">$59.99</span>"#,
        );
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("129.99"));
    }

    #[test]
    fn test_structured_data_numeric_price() {
        let page = page(
            r#"<script type="application/ld+json">
                {"offers":{"price":149.95}}
               </script>"#,
        );
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("149.95"));
    }

    #[test]
    fn test_invalid_json_ld_falls_through() {
        let page = page(
            r#"<script type="application/ld+json">{not json}</script>
               <meta property="product:price:amount" content="89.00">"#,
        );
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("89.00"));
    }

    #[test]
    fn test_out_of_range_structured_price_falls_through() {
        let page = page(
            r#"<script type="application/ld+json">{"offers":{"price":"0.01"}}</script>
               <span class="price">$59.99</span>"#,
        );
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("59.99"));
    }

    #[test]
    fn test_selector_scan_excludes_sup() {
        let page = page(r#"<span class="price">$39<sup>99</sup></span>"#);
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("39"));
    }

    #[test]
    fn test_selector_order_is_fixed() {
        // [itemprop='price'] precedes .price in the selector list.
        let page = page(
            r#"<div class="price">$22.00</div>
               <span itemprop="price">44.50</span>"#,
        );
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("44.50"));
    }

    #[test]
    fn test_body_text_fallback_returns_maximum() {
        let page = page("<p>Was $19.99</p><p>shipping $5</p><p>now only $149.00</p>");
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("149.0"));
    }

    #[test]
    fn test_body_text_fallback_keeps_cents() {
        let page = page("<p>$12.50 or $34.95</p>");
        assert_eq!(PriceCascade::new().extract(&page).as_deref(), Some("34.95"));
    }

    #[test]
    fn test_body_text_ignores_out_of_range() {
        let page = page("<p>call $0.20 hotline, est. $99999</p>");
        assert_eq!(PriceCascade::new().extract(&page), None);
    }

    #[test]
    fn test_blocked_page_short_circuits() {
        let blocked = StaticPage::parse(
            r#"<html><head><title>Access Denied</title></head>
               <body><span class="price">$59.99</span></body></html>"#,
        );
        assert_eq!(PriceCascade::new().extract(&blocked), None);
    }

    #[test]
    fn test_no_price_anywhere() {
        let page = page("<p>Out of stock</p>");
        assert_eq!(PriceCascade::new().extract(&page), None);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let page = page("<p>$19.99 and $149.00</p>");
        let cascade = PriceCascade::new();
        assert_eq!(cascade.extract(&page), cascade.extract(&page));
    }
}
