use tracing::debug;
use url::Url;

use crate::render::StaticPage;

const RESULT_LINK_SELECTOR: &str = "a.result__a";
const REDIRECT_PARAM: &str = "uddg";

/// Extract, decode and domain-filter candidate retailer URLs from a rendered
/// search results page. Order follows the engine's result order; harvesting
/// stops once `max_results` URLs are collected.
pub fn harvest_result_links(
    page: &StaticPage,
    domain_marker: &str,
    exclude_domains: &[String],
    max_results: usize,
) -> Vec<String> {
    let redirect_key = format!("{}=", REDIRECT_PARAM);
    let mut links = Vec::new();

    for anchor in page.select(RESULT_LINK_SELECTOR) {
        if links.len() >= max_results {
            break;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        // Protocol-relative hrefs resolve to HTTPS.
        let href = if href.starts_with("//") {
            format!("https:{}", href)
        } else {
            href.to_string()
        };

        let target = if href.contains(&redirect_key) {
            match unwrap_redirect(&href) {
                Some(url) => url,
                // Redirect-shaped href without the parameter: drop it.
                None => continue,
            }
        } else {
            href
        };

        let lowered = target.to_lowercase();
        if lowered.contains(domain_marker)
            && !exclude_domains
                .iter()
                .any(|d| lowered.contains(&d.to_lowercase()))
        {
            links.push(target);
        }
    }

    debug!("Harvested {} retailer links", links.len());
    links
}

/// Pull the real destination out of a redirect-style result href.
/// `query_pairs` hands back the embedded URL already percent-decoded.
fn unwrap_redirect(href: &str) -> Option<String> {
    let parsed = Url::parse(href).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
}
