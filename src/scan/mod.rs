//! Sold-listing scan and sales-velocity qualification.
//!
//! The scanner pages through a store's sold listings newest-first. Each
//! card is cross-checked against its revision history to count recent
//! quantity revisions; the scan stops at the first listing older than
//! the recency window or once enough items have qualified.

pub mod cleaner;
pub mod revisions;

use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use scraper::ElementRef;
use tracing::{debug, info};

use crate::config::MarketplaceConfig;
use crate::models::{CandidateItem, QualificationResult};
use crate::render::{element_text, select_within, PageSource};
use cleaner::parse_sold_date;
use revisions::RevisionQualifier;

const LISTING_CARD: &str = "li.s-card";
const SOLD_MARKER: &str = r#"span[aria-label="Sold item"]"#;
const CARD_TITLE: &str = "div.s-card__title span";
const CARD_PRICE: &str = "span.s-card__price";
const ITEM_ID_ATTR: &str = "data-listingid";

/// Loop control for the card walk. `Stop` ends the whole scan, not just
/// the current page.
#[derive(Debug, PartialEq)]
enum ScanSignal {
    Continue,
    Stop,
}

pub struct StoreScanner<'a, S: PageSource> {
    source: &'a S,
    config: &'a MarketplaceConfig,
}

impl<'a, S: PageSource> StoreScanner<'a, S> {
    pub fn new(source: &'a S, config: &'a MarketplaceConfig) -> Self {
        Self { source, config }
    }

    fn listing_url(&self, store: &str, page_number: u32) -> String {
        format!(
            "{}/sch/i.html?_ssn={}&LH_Sold=1&LH_Complete=1&_sop=13&_ipg={}&_pgn={}",
            self.config.base_url, store, self.config.page_size, page_number
        )
    }

    /// Walk the store's sold listings and return one result per card
    /// checked, qualified or not. The listing feed is sorted newest-first,
    /// so the first stale card ends the scan.
    pub async fn scan(
        &self,
        store: &str,
        cutoff: NaiveDate,
    ) -> anyhow::Result<Vec<QualificationResult>> {
        let qualifier = RevisionQualifier::new(self.source, &self.config.base_url);
        let mut results = Vec::new();
        let mut qualified = 0usize;
        let mut page_number = 1u32;

        'pages: loop {
            let url = self.listing_url(store, page_number);
            info!("Scanning page {} of {}", page_number, store);
            let page = self
                .source
                .fetch_page(&url)
                .await
                .context("Listing page fetch failed")?;

            let cards = page.select(LISTING_CARD);
            if cards.is_empty() {
                debug!("No listing cards on page {}, scan complete", page_number);
                break;
            }

            for card in &cards {
                let signal = self
                    .process_card(card, cutoff, &qualifier, &mut results, &mut qualified)
                    .await;
                if signal == ScanSignal::Stop {
                    break 'pages;
                }
            }
            page_number += 1;
        }

        info!(
            "Scan of {} finished: {} checked, {} qualified",
            store,
            results.len(),
            qualified
        );
        Ok(results)
    }

    async fn process_card(
        &self,
        card: &ElementRef<'_>,
        cutoff: NaiveDate,
        qualifier: &RevisionQualifier<'_, S>,
        results: &mut Vec<QualificationResult>,
        qualified: &mut usize,
    ) -> ScanSignal {
        let Some(item_id) = card.value().attr(ITEM_ID_ATTR) else {
            return ScanSignal::Continue;
        };
        let Some(marker) = select_within(card, SOLD_MARKER).into_iter().next() else {
            debug!("Card {} has no sold marker, skipping", item_id);
            return ScanSignal::Continue;
        };
        let Some(sold_date) = parse_sold_date(&element_text(&marker)) else {
            return ScanSignal::Continue;
        };
        if sold_date < cutoff {
            info!("Reached listings older than the recency window, stopping");
            return ScanSignal::Stop;
        }

        let title = select_within(card, CARD_TITLE)
            .first()
            .map(element_text)
            .unwrap_or_default();
        let price = select_within(card, CARD_PRICE)
            .first()
            .map(element_text)
            .unwrap_or_default();

        let qualifying_count = qualifier.count_qualifying(item_id, cutoff).await;
        let result = QualificationResult {
            item: CandidateItem {
                item_id: item_id.to_string(),
                title,
                price,
                sold_date,
            },
            qualifying_count,
        };
        let qualifies = result.qualifies(self.config.min_qualifying_count);
        results.push(result);

        if qualifies {
            *qualified += 1;
            if *qualified >= self.config.max_qualifying_items {
                info!("Qualified item cap reached, stopping scan");
                return ScanSignal::Stop;
            }
        }

        self.item_delay().await;
        ScanSignal::Continue
    }

    async fn item_delay(&self) {
        if self.config.item_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.item_delay_ms)).await;
        }
    }
}
