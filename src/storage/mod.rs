//! File persistence for scan and discovery output.
//!
//! The scan stage writes one CSV per store; the discovery stage writes
//! one JSON report per qualifying item under a per-store directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::OutputConfig;
use crate::models::{ItemReport, QualificationResult};

const CSV_HEADER: [&str; 4] = ["itemID", "quantitysold", "price", "title"];

pub struct ReportWriter<'a> {
    config: &'a OutputConfig,
}

impl<'a> ReportWriter<'a> {
    pub fn new(config: &'a OutputConfig) -> Self {
        Self { config }
    }

    /// Write qualification rows to `{dir}/{store}_results.csv`. Callers pass
    /// only items that met the qualifying threshold.
    pub fn write_qualification_csv(
        &self,
        store: &str,
        results: &[QualificationResult],
    ) -> Result<PathBuf> {
        let path = self.config.dir.join(format!("{}_results.csv", store));
        fs::create_dir_all(&self.config.dir)
            .with_context(|| format!("Failed to create {}", self.config.dir.display()))?;

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        writer.write_record(CSV_HEADER)?;
        for result in results {
            writer.write_record([
                result.item.item_id.as_str(),
                &result.qualifying_count.to_string(),
                result.item.price.as_str(),
                result.item.title.as_str(),
            ])?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {}", results.len(), path.display());
        Ok(path)
    }

    /// Write one item report to `{dir}/{store}/{itemID}.json`, pretty-printed
    /// with four-space indentation.
    pub fn write_item_report(&self, store: &str, report: &ItemReport) -> Result<PathBuf> {
        let dir = self.config.dir.join(store);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("{}.json", report.item_id));

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        report
            .serialize(&mut serializer)
            .context("Failed to serialize item report")?;
        fs::write(&path, buf).with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Wrote report {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateItem, RetailerOffer};
    use chrono::NaiveDate;

    fn result(id: &str, count: u32) -> QualificationResult {
        QualificationResult {
            item: CandidateItem {
                item_id: id.to_string(),
                title: "Blue Widget".to_string(),
                price: "AU $39.95".to_string(),
                sold_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
            },
            qualifying_count: count,
        }
    }

    #[test]
    fn test_csv_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            dir: tmp.path().to_path_buf(),
        };
        let writer = ReportWriter::new(&config);
        let path = writer
            .write_qualification_csv("mystore", &[result("111", 4), result("222", 0)])
            .unwrap();

        assert!(path.ends_with("mystore_results.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("itemID,quantitysold,price,title"));
        assert_eq!(lines.next(), Some("111,4,AU $39.95,Blue Widget"));
        assert_eq!(lines.next(), Some("222,0,AU $39.95,Blue Widget"));
    }

    #[test]
    fn test_item_report_path_and_indent() {
        let tmp = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            dir: tmp.path().to_path_buf(),
        };
        let writer = ReportWriter::new(&config);
        let report = ItemReport {
            item_id: "112233".to_string(),
            title: "Blue Widget".to_string(),
            price: "AU $39.95".to_string(),
            quantity_sold: 4,
            retailers: vec![RetailerOffer {
                url: "https://shop.com.au/widget".to_string(),
                price: None,
            }],
        };
        let path = writer.write_item_report("mystore", &report).unwrap();

        assert!(path.ends_with("mystore/112233.json"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("    \"itemID\": \"112233\""));
        assert!(content.contains("price not found"));
    }
}
