//! Recent-activity feed merged from the sale and restock ledgers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::RecordId;

use crate::model::{Direction, LedgerEntry, RestockRecord, SaleRecord};

/// Sales carry no note on the backend; every sale shows this one.
pub const SALE_NOTE: &str = "Sale";
pub const RESTOCK_NOTE: &str = "Restock";

/// One line of the activity feed (derived, never persisted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub item_name: String,
    #[serde(rename = "qty")]
    pub quantity: u32,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    fn project<L: LedgerEntry>(entry: &L, direction: Direction, note: &str) -> Self {
        Self {
            id: entry.record_id().clone(),
            direction,
            item_name: entry.item_name().to_string(),
            quantity: entry.quantity(),
            note: note.to_string(),
            timestamp: entry.created_at(),
        }
    }
}

/// Sales then restocks, stable-sorted newest first.
///
/// Entries with equal timestamps keep merge order, so a sale precedes a
/// restock recorded at the same instant.
pub fn build_activity_feed(sales: &[SaleRecord], restocks: &[RestockRecord]) -> Vec<ActivityEntry> {
    let mut feed: Vec<ActivityEntry> = sales
        .iter()
        .map(|s| ActivityEntry::project(s, Direction::StockOut, SALE_NOTE))
        .chain(
            restocks
                .iter()
                .map(|r| ActivityEntry::project(r, Direction::StockIn, RESTOCK_NOTE)),
        )
        .collect();

    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed
}
