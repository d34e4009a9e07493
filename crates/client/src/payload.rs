//! Request bodies for the ledger-creating endpoints and alert updates.

use serde::{Deserialize, Serialize};

use stockdesk_core::{ItemId, Money};
use stockdesk_inventory::{ALERT_RESOLVED, Item};

/// `POST /sales` body (order out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSale {
    pub menu_item_id: ItemId,
    pub quantity: u32,
    pub price_per_unit: Money,
    pub discount: Money,
    pub addon_ids: Vec<ItemId>,
}

/// `POST /restock` body (stock in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestock {
    pub menu_item_id: ItemId,
    pub quantity: u32,
    pub price_per_unit: Money,
    pub addon_ids: Vec<ItemId>,
}

/// `PATCH /inventory/alerts/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAlert {
    pub status: String,
}

impl UpdateAlert {
    pub fn resolve() -> Self {
        Self {
            status: ALERT_RESOLVED.to_string(),
        }
    }
}

impl CreateSale {
    /// Sale of `quantity` units at the item's list price, no discount.
    ///
    /// Addon bundles are not sent from manual adjustments.
    pub fn for_item(item: &Item, quantity: u32) -> Self {
        Self {
            menu_item_id: item.id.clone(),
            quantity,
            price_per_unit: item.price,
            discount: Money::ZERO,
            addon_ids: Vec::new(),
        }
    }
}

impl CreateRestock {
    pub fn for_item(item: &Item, quantity: u32) -> Self {
        Self {
            menu_item_id: item.id.clone(),
            quantity,
            price_per_unit: item.price,
            addon_ids: Vec::new(),
        }
    }
}
