//! Optimistic stock adjustment math.
//!
//! Applied locally before the backend answers; the next refetch replaces
//! whatever this produced.

use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, DomainResult, ItemId};

use crate::model::{Direction, StockRecord};

/// A requested manual stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub item_id: ItemId,
    pub quantity: u32,
    pub direction: Direction,
    pub note: String,
}

impl Adjustment {
    pub fn new(
        item_id: ItemId,
        quantity: u32,
        direction: Direction,
        note: impl Into<String>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        Ok(Self {
            item_id,
            quantity,
            direction,
            note: note.into(),
        })
    }

    pub fn stock_in(item_id: ItemId, quantity: u32, note: impl Into<String>) -> DomainResult<Self> {
        Self::new(item_id, quantity, Direction::StockIn, note)
    }

    pub fn order_out(
        item_id: ItemId,
        quantity: u32,
        note: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::new(item_id, quantity, Direction::StockOut, note)
    }
}

/// `current ± quantity`, never below zero.
pub fn adjusted_quantity(current: u32, quantity: u32, direction: Direction) -> u32 {
    match direction {
        Direction::StockIn => current.saturating_add(quantity),
        Direction::StockOut => current.saturating_sub(quantity),
    }
}

/// New snapshot with every row tracking the adjusted item moved by the
/// adjustment. Rows for other items are copied unchanged.
pub fn apply_optimistic(stock: &[StockRecord], adjustment: &Adjustment) -> Vec<StockRecord> {
    stock
        .iter()
        .map(|row| {
            if !row.tracks(&adjustment.item_id) {
                return row.clone();
            }
            StockRecord {
                quantity: Some(adjusted_quantity(
                    row.on_hand(),
                    adjustment.quantity,
                    adjustment.direction,
                )),
                ..row.clone()
            }
        })
        .collect()
}
