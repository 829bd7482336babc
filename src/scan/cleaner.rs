//! Text cleanup for listing cards and revision-history rows. The
//! marketplace renders dates in two localised layouts, so every parser
//! tries both before giving up.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::RevisionEvent;

const SOLD_DATE_FORMATS: [&str; 2] = ["%d %b %Y", "%b %d, %Y"];
const REVISION_DATE_FORMATS: [&str; 2] = ["%d %b, %Y", "%b %d, %Y"];

/// Parse a listing card's sold-date caption, e.g. "Sold 12 Aug 2025".
pub fn parse_sold_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.replace("Sold", "");
    let cleaned = cleaned.trim();
    for format in SOLD_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(date);
        }
    }
    warn!("Unparsable sold date: '{}'", raw);
    None
}

/// Parse a revision-table date cell, e.g. "12 Aug, 2025".
pub fn parse_revision_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim();
    for format in REVISION_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(date);
        }
    }
    None
}

/// Build a revision event from a table row's cell texts. Layout is
/// date, revised-by, change-type; short or undated rows are dropped.
pub fn revision_from_cells(cells: &[String]) -> Option<RevisionEvent> {
    if cells.len() < 3 {
        return None;
    }
    let date = parse_revision_date(&cells[0])?;
    Some(RevisionEvent {
        date,
        change_type: cells[2].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sold_date_both_layouts() {
        assert_eq!(parse_sold_date("Sold  12 Aug 2025"), Some(date(2025, 8, 12)));
        assert_eq!(parse_sold_date("Sold Aug 12, 2025"), Some(date(2025, 8, 12)));
    }

    #[test]
    fn test_sold_date_without_prefix() {
        assert_eq!(parse_sold_date("12 Aug 2025"), Some(date(2025, 8, 12)));
    }

    #[test]
    fn test_sold_date_garbage() {
        assert_eq!(parse_sold_date("Best seller"), None);
        assert_eq!(parse_sold_date(""), None);
    }

    #[test]
    fn test_revision_date_both_layouts() {
        assert_eq!(parse_revision_date("12 Aug, 2025"), Some(date(2025, 8, 12)));
        assert_eq!(parse_revision_date("Aug 12, 2025"), Some(date(2025, 8, 12)));
    }

    #[test]
    fn test_revision_from_cells() {
        let cells = vec![
            "12 Aug, 2025".to_string(),
            "seller".to_string(),
            "Quantity".to_string(),
        ];
        let event = revision_from_cells(&cells).unwrap();
        assert_eq!(event.date, date(2025, 8, 12));
        assert_eq!(event.change_type, "Quantity");
    }

    #[test]
    fn test_revision_from_short_row() {
        let cells = vec!["12 Aug, 2025".to_string(), "seller".to_string()];
        assert!(revision_from_cells(&cells).is_none());
    }

    #[test]
    fn test_revision_from_undated_row() {
        let cells = vec![
            "yesterday".to_string(),
            "seller".to_string(),
            "Quantity".to_string(),
        ];
        assert!(revision_from_cells(&cells).is_none());
    }
}
