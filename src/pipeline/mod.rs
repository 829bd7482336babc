//! End-to-end orchestration: scan a store, filter by the qualifying
//! threshold, persist the qualification CSV, then run retailer discovery
//! for every qualified item and write one report per item. Stages run
//! strictly in sequence over one shared page source; one slow, polite
//! crawl is the operating mode, not a throughput target.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::{FeedRecord, ItemReport, QualificationResult};
use crate::render::client::HttpPageSource;
use crate::render::PageSource;
use crate::scan::StoreScanner;
use crate::search::RetailerDiscovery;
use crate::storage::ReportWriter;

/// Run counters reported at the end of each command.
#[derive(Debug, Default, PartialEq)]
pub struct PipelineStats {
    pub items_scanned: usize,
    pub items_qualified: usize,
    pub offers_found: usize,
    pub errors: usize,
}

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn cutoff(&self) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(self.config.marketplace.recency_window_days)
    }

    fn page_source(&self) -> Result<HttpPageSource> {
        HttpPageSource::new(&self.config.fetch).context("Failed to build page client")
    }

    /// Only results meeting the qualifying threshold survive into the
    /// CSV and the discovery stage.
    fn qualified(&self, results: &[QualificationResult]) -> Vec<QualificationResult> {
        results
            .iter()
            .filter(|r| r.qualifies(self.config.marketplace.min_qualifying_count))
            .cloned()
            .collect()
    }

    /// Scan, persist qualifying items, then discover retailers for each.
    pub async fn run(&self, store: &str) -> Result<PipelineStats> {
        let source = self.page_source()?;
        self.run_with(&source, store).await
    }

    /// Scan stage only: qualify and persist the CSV.
    pub async fn scan_only(&self, store: &str) -> Result<PipelineStats> {
        let source = self.page_source()?;
        let results = self.scan_store(&source, store).await?;
        let qualified = self.qualified(&results);
        ReportWriter::new(&self.config.output).write_qualification_csv(store, &qualified)?;
        Ok(PipelineStats {
            items_scanned: results.len(),
            items_qualified: qualified.len(),
            ..Default::default()
        })
    }

    /// Discovery stage only, fed from a previously written CSV.
    pub async fn discover_only(&self, store: &str, feed: &[FeedRecord]) -> Result<PipelineStats> {
        let source = self.page_source()?;
        let (offers_found, errors) = self.discover_for(&source, store, feed).await?;
        Ok(PipelineStats {
            items_qualified: feed.len(),
            offers_found,
            errors,
            ..Default::default()
        })
    }

    /// Full pipeline over one page source shared by both stages.
    async fn run_with<S: PageSource>(&self, source: &S, store: &str) -> Result<PipelineStats> {
        let results = self.scan_store(source, store).await?;
        let qualified = self.qualified(&results);
        let mut stats = PipelineStats {
            items_scanned: results.len(),
            items_qualified: qualified.len(),
            ..Default::default()
        };

        ReportWriter::new(&self.config.output).write_qualification_csv(store, &qualified)?;

        if qualified.is_empty() {
            info!("No items qualified for {}, skipping discovery", store);
            return Ok(stats);
        }

        let feed = feed_records(&qualified);
        let (offers_found, errors) = self.discover_for(source, store, &feed).await?;
        stats.offers_found = offers_found;
        stats.errors = errors;
        Ok(stats)
    }

    async fn scan_store<S: PageSource>(
        &self,
        source: &S,
        store: &str,
    ) -> Result<Vec<QualificationResult>> {
        let scanner = StoreScanner::new(source, &self.config.marketplace);
        scanner.scan(store, self.cutoff()).await
    }

    /// One search-and-extract round per feed record. A failed search is
    /// counted and the item still gets a report with no retailers.
    async fn discover_for<S: PageSource>(
        &self,
        source: &S,
        store: &str,
        feed: &[FeedRecord],
    ) -> Result<(usize, usize)> {
        let discovery = RetailerDiscovery::new(source, &self.config.search);
        let writer = ReportWriter::new(&self.config.output);

        let mut offers_found = 0;
        let mut errors = 0;
        for record in feed {
            info!("Discovering retailers for {} ({})", record.item_id, record.title);
            let retailers = match discovery.discover(&record.title).await {
                Ok(offers) => offers,
                Err(e) => {
                    warn!("Discovery failed for {}: {:#}", record.item_id, e);
                    errors += 1;
                    Vec::new()
                }
            };
            offers_found += retailers.iter().filter(|o| o.price.is_some()).count();

            let report = ItemReport {
                item_id: record.item_id.clone(),
                title: record.title.clone(),
                price: record.price.clone(),
                quantity_sold: record.quantity_sold,
                retailers,
            };
            writer.write_item_report(store, &report)?;
        }
        Ok((offers_found, errors))
    }
}

/// Convert qualifying results to discovery feed records.
fn feed_records(qualified: &[QualificationResult]) -> Vec<FeedRecord> {
    qualified
        .iter()
        .map(|r| FeedRecord {
            item_id: r.item.item_id.clone(),
            quantity_sold: r.qualifying_count,
            price: r.item.price.clone(),
            title: r.item.title.clone(),
        })
        .collect()
}
