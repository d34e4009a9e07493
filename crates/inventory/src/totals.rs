//! Summary metrics over a stock snapshot and the two ledgers.

use serde::{Deserialize, Serialize};

use stockdesk_core::Money;

use crate::model::{LedgerEntry, RestockRecord, SaleRecord, StockRecord, effective_threshold};

/// Summary cards: item count, unit count, low-stock count.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockTotals {
    pub total_items: usize,
    pub total_units: u64,
    pub low_stock_count: usize,
}

/// `threshold` of `None` or `Some(0)` means the default of 10.
pub fn compute_totals(stock: &[StockRecord], threshold: Option<u32>) -> StockTotals {
    let threshold = effective_threshold(threshold);

    StockTotals {
        total_items: stock.len(),
        total_units: stock.iter().map(|r| u64::from(r.on_hand())).sum(),
        low_stock_count: stock.iter().filter(|r| r.on_hand() < threshold).count(),
    }
}

/// Σ restock value − Σ sale value. May be negative when sales outpace
/// recorded restocks (stock that predates the ledger).
pub fn compute_inventory_value(sales: &[SaleRecord], restocks: &[RestockRecord]) -> Money {
    let restocked: Money = restocks.iter().map(LedgerEntry::line_value).sum();
    let sold: Money = sales.iter().map(LedgerEntry::line_value).sum();
    restocked - sold
}

/// Row status chip.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    Low,
    Good,
}

impl StockStatus {
    pub fn of(quantity: u32, threshold: Option<u32>) -> Self {
        if quantity < effective_threshold(threshold) {
            StockStatus::Low
        } else {
            StockStatus::Good
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Low => "Low",
            StockStatus::Good => "Good",
        }
    }
}

/// Progress-gauge fill: half full at the threshold, capped at 100.
pub fn fill_percent(quantity: u32, threshold: Option<u32>) -> f64 {
    let threshold = effective_threshold(threshold);
    (f64::from(quantity) / f64::from(threshold) * 50.0).min(100.0)
}
