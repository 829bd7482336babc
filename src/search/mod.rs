//! Retailer discovery through a web search engine.
//!
//! For each qualified item title the discovery stage runs one search,
//! harvests local-retailer result links, then visits each link and runs
//! the price-extraction cascade. Every visited URL produces an offer
//! record, with or without a price.

pub mod harvest;

use std::time::Duration;

use anyhow::Context;
use rand::RngExt;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::extract::PriceCascade;
use crate::models::RetailerOffer;
use crate::render::{FetchError, PageSource};

pub use harvest::harvest_result_links;

pub struct RetailerDiscovery<'a, S: PageSource> {
    source: &'a S,
    config: &'a SearchConfig,
    cascade: PriceCascade,
}

impl<'a, S: PageSource> RetailerDiscovery<'a, S> {
    pub fn new(source: &'a S, config: &'a SearchConfig) -> Self {
        Self {
            source,
            config,
            cascade: PriceCascade::new(),
        }
    }

    /// Search for `title` and return one offer per retailer page visited.
    pub async fn discover(&self, title: &str) -> anyhow::Result<Vec<RetailerOffer>> {
        let url = self.search_url(title);
        debug!("Searching: {}", url);

        let page = self
            .source
            .fetch_page(&url)
            .await
            .context("Search page fetch failed")?;

        let links = harvest_result_links(
            &page,
            &self.config.domain_marker,
            &self.config.exclude_domains,
            self.config.max_results,
        );
        info!("Found {} retailer candidates for '{}'", links.len(), title);

        let mut offers = Vec::with_capacity(links.len());
        for link in links {
            self.page_delay().await;
            let price = self.extract_price(&link).await;
            offers.push(RetailerOffer { url: link, price });
        }
        Ok(offers)
    }

    async fn extract_price(&self, url: &str) -> Option<String> {
        match self.source.fetch_page(url).await {
            Ok(page) => self.cascade.extract(&page),
            Err(FetchError::Timeout { .. }) => {
                warn!("Page timed out, skipping: {}", url);
                None
            }
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                None
            }
        }
    }

    /// Query with each excluded marketplace negated out of the results.
    fn build_query(&self, title: &str) -> String {
        let mut query = title.to_string();
        for domain in &self.config.exclude_domains {
            query.push_str(&format!(" -{}", domain));
        }
        query
    }

    fn search_url(&self, title: &str) -> String {
        let query = self.build_query(title);
        format!(
            "{}/?q={}&kl={}",
            self.config.base_url,
            urlencoding::encode(&query),
            self.config.region
        )
    }

    async fn page_delay(&self) {
        let min = self.config.page_delay_min_secs;
        let max = self.config.page_delay_max_secs;
        if max <= 0.0 {
            return;
        }
        let secs = if max > min {
            rand::rng().random_range(min..=max)
        } else {
            max
        };
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}
