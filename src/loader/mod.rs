//! Reads a previously written qualification CSV back in as the input
//! feed for the discovery stage.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::FeedRecord;

/// Derive the store name from a results CSV path:
/// `out/mystore_results.csv` -> `mystore`.
pub fn store_name_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let name = name.strip_suffix(".csv").unwrap_or(name);
    name.strip_suffix("_results").map(String::from)
}

/// Load feed records from a qualification CSV. Rows that cannot be read
/// are logged and skipped rather than failing the whole load.
pub fn load_results_csv(path: &Path) -> Result<Vec<FeedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping unreadable row: {}", e);
                continue;
            }
        };
        let Some(item_id) = row.get(0).filter(|id| !id.is_empty()) else {
            warn!("Skipping row without an item id");
            continue;
        };
        records.push(FeedRecord {
            item_id: item_id.to_string(),
            quantity_sold: row.get(1).and_then(|q| q.parse().ok()).unwrap_or(0),
            price: row.get(2).unwrap_or_default().to_string(),
            title: row.get(3).unwrap_or_default().to_string(),
        });
    }

    info!("Loaded {} feed records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_store_name_from_path() {
        assert_eq!(
            store_name_from_path(Path::new("out/mystore_results.csv")).as_deref(),
            Some("mystore")
        );
        assert_eq!(store_name_from_path(Path::new("out/other.csv")), None);
    }

    #[test]
    fn test_load_results_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mystore_results.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "itemID,quantitysold,price,title").unwrap();
        writeln!(file, "111,4,AU $39.95,Blue Widget").unwrap();
        writeln!(file, ",2,AU $9.95,No Id Widget").unwrap();
        writeln!(file, "222,not-a-number,AU $5.00,Odd Widget").unwrap();

        let records = load_results_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].item_id, "111");
        assert_eq!(records[0].quantity_sold, 4);
        assert_eq!(records[0].title, "Blue Widget");
        assert_eq!(records[1].item_id, "222");
        assert_eq!(records[1].quantity_sold, 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_results_csv(Path::new("does/not/exist.csv")).is_err());
    }
}
