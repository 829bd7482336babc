use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marker written in place of a price when extraction came up empty.
pub const PRICE_NOT_FOUND: &str = "price not found";

// ── Candidate item ────────────────────────────────────────────────────────────

/// A sold listing captured from a store's sold-listings feed.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateItem {
    pub item_id: String,
    pub title: String,
    /// Listing price as displayed, e.g. "AU $39.95".
    pub price: String,
    pub sold_date: NaiveDate,
}

// ── Revision event ────────────────────────────────────────────────────────────

/// One row of an item's revision history.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionEvent {
    pub date: NaiveDate,
    pub change_type: String,
}

impl RevisionEvent {
    /// A quantity-change revision is the signal a unit actually sold.
    pub fn is_quantity_change(&self) -> bool {
        self.change_type.contains("Quantity")
    }
}

// ── Qualification ─────────────────────────────────────────────────────────────

/// Outcome of the revision-count check for one scanned item.
#[derive(Debug, Clone, PartialEq)]
pub struct QualificationResult {
    pub item: CandidateItem,
    /// Quantity-change revisions inside the recency window only.
    pub qualifying_count: u32,
}

impl QualificationResult {
    pub fn qualifies(&self, min_count: u32) -> bool {
        self.qualifying_count >= min_count
    }
}

// ── Retailer offer ────────────────────────────────────────────────────────────

/// One visited retailer URL and the price extracted from it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerOffer {
    pub url: String,
    #[serde(
        serialize_with = "serialize_price",
        deserialize_with = "deserialize_price"
    )]
    pub price: Option<String>,
}

fn serialize_price<S>(price: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(price.as_deref().unwrap_or(PRICE_NOT_FOUND))
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(if raw == PRICE_NOT_FOUND { None } else { Some(raw) })
}

// ── Item report ───────────────────────────────────────────────────────────────

/// Terminal persisted artifact, one JSON file per qualifying item.
/// Field order here is the output contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    #[serde(rename = "itemID")]
    pub item_id: String,
    pub title: String,
    pub price: String,
    #[serde(rename = "quantitysold")]
    pub quantity_sold: u32,
    pub retailers: Vec<RetailerOffer>,
}

// ── Feed record ───────────────────────────────────────────────────────────────

/// Input-feed record consumed by the discovery stage: one row of a
/// qualification CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    pub item_id: String,
    pub quantity_sold: u32,
    pub price: String,
    pub title: String,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
