//! Inventory domain module.
//!
//! Data model for stock rows and sale/restock ledgers, and the pure
//! aggregation over them: totals, inventory value, the activity feed,
//! display filtering and optimistic adjustment math, plus the place-scoped
//! report and alert types. No IO.

pub mod activity;
pub mod adjust;
pub mod filter;
pub mod model;
pub mod place;
pub mod totals;

pub use activity::{ActivityEntry, RESTOCK_NOTE, SALE_NOTE, build_activity_feed};
pub use adjust::{Adjustment, adjusted_quantity, apply_optimistic};
pub use filter::{Category, DEFAULT_PER_PAGE, Pagination, StockFilter};
pub use model::{
    DEFAULT_LOW_STOCK_THRESHOLD, Direction, Item, ItemRef, ItemType, LedgerEntry, RestockRecord,
    SaleRecord, Settings, StockRecord, UNKNOWN_ITEM_TITLE,
};
pub use place::{ALERT_RESOLVED, Alert, DEFAULT_TRANSACTION_LIMIT, DEFAULT_WASTE_DAYS, PlaceReport};
pub use totals::{StockStatus, StockTotals, compute_inventory_value, compute_totals, fill_percent};
