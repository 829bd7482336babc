use chrono::NaiveDate;
use tracing::{debug, warn};

use super::cleaner::revision_from_cells;
use crate::render::{element_text, select_within, PageSource};

const REVISION_ROW_SELECTOR: &str = "table tbody tr";
const QUANTITY_LABEL: &str = "Quantity";

/// Counts recent quantity revisions on a listing's revision-history page.
/// Each quantity revision marks one additional sale of a multi-quantity
/// listing, which is the velocity signal the scan qualifies on.
pub struct RevisionQualifier<'a, S: PageSource> {
    source: &'a S,
    base_url: &'a str,
}

impl<'a, S: PageSource> RevisionQualifier<'a, S> {
    pub fn new(source: &'a S, base_url: &'a str) -> Self {
        Self { source, base_url }
    }

    fn revision_url(&self, item_id: &str) -> String {
        format!("{}/rvh/{}", self.base_url, item_id)
    }

    /// Number of quantity revisions dated on or after `cutoff`.
    ///
    /// Rows arrive oldest-first, so they are walked in reverse and the
    /// walk stops at the first row older than the cutoff. An unreachable
    /// or rowless history page counts as zero, not an error.
    pub async fn count_qualifying(&self, item_id: &str, cutoff: NaiveDate) -> u32 {
        let url = self.revision_url(item_id);
        let page = match self.source.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Revision history fetch failed for {}: {}", item_id, e);
                return 0;
            }
        };

        let rows = page.select(REVISION_ROW_SELECTOR);
        if rows.is_empty() {
            debug!("No revision history for {}", item_id);
            return 0;
        }

        let mut count = 0;
        for row in rows.iter().rev() {
            let cells: Vec<String> = select_within(row, "td")
                .iter()
                .map(element_text)
                .collect();
            let Some(event) = revision_from_cells(&cells) else {
                continue;
            };
            if event.date < cutoff {
                break;
            }
            if event.is_quantity_change() {
                count += 1;
            }
        }

        debug!("{}: {} qualifying revisions", item_id, count);
        count
    }
}
