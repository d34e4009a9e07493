use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use stockdesk_core::{Entity, ItemId, Money, RecordId};

/// Threshold used when settings carry none (or zero).
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Title shown for stock rows whose item is not populated.
pub const UNKNOWN_ITEM_TITLE: &str = "Unknown Item";

/// Catalog item: a menu item or an addon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Money,
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }
}

/// Reference to an item as the backend returns it: populated or by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Populated(Item),
    Id(ItemId),
}

impl ItemRef {
    pub fn item_id(&self) -> &ItemId {
        match self {
            ItemRef::Populated(item) => &item.id,
            ItemRef::Id(id) => id,
        }
    }

    pub fn populated(&self) -> Option<&Item> {
        match self {
            ItemRef::Populated(item) => Some(item),
            ItemRef::Id(_) => None,
        }
    }
}

/// Which catalog a stock row belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    MenuItem,
    Addon,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::MenuItem => "MenuItem",
            ItemType::Addon => "Addon",
        }
    }

    /// Human label used in lookup results.
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::MenuItem => "Menu Item",
            ItemType::Addon => "Addon",
        }
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-hand quantity for one item, owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub item: Option<ItemRef>,
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl StockRecord {
    /// Quantity with a missing value read as zero.
    pub fn on_hand(&self) -> u32 {
        self.quantity.unwrap_or(0)
    }

    /// Title of the populated item, or [`UNKNOWN_ITEM_TITLE`].
    pub fn title(&self) -> &str {
        self.item
            .as_ref()
            .and_then(ItemRef::populated)
            .map(|item| item.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(UNKNOWN_ITEM_TITLE)
    }

    /// Table label: like [`title`](Self::title), but a row that stores its
    /// item by id alone shows `"Unknown Item #<id>"`. Filtering still
    /// matches on `title`.
    pub fn display_title(&self) -> String {
        match &self.item {
            Some(ItemRef::Id(id)) => format!("{UNKNOWN_ITEM_TITLE} #{id}"),
            _ => self.title().to_string(),
        }
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.item.as_ref().map(ItemRef::item_id)
    }

    /// Whether this row tracks `item_id`, whether the item is populated or
    /// stored by id alone.
    pub fn tracks(&self, item_id: &ItemId) -> bool {
        self.item_id() == Some(item_id)
    }
}

impl Entity for StockRecord {
    type Id = RecordId;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    StockIn,
    StockOut,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::StockIn => "stock-in",
            Direction::StockOut => "stock-out",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common view over the two append-only ledgers.
pub trait LedgerEntry {
    fn record_id(&self) -> &RecordId;
    fn menu_item(&self) -> Option<&ItemRef>;
    fn addons(&self) -> &[ItemRef];
    fn quantity(&self) -> u32;
    fn price_per_unit(&self) -> Money;
    fn created_at(&self) -> DateTime<Utc>;

    /// `quantity × price_per_unit`.
    fn line_value(&self) -> Money {
        self.price_per_unit().times(self.quantity())
    }

    /// Menu item title if populated, else `"Addons"` when addons are
    /// attached, else `"Unknown"`.
    fn item_name(&self) -> &str {
        if let Some(item) = self.menu_item().and_then(ItemRef::populated) {
            return &item.title;
        }
        if !self.addons().is_empty() {
            "Addons"
        } else {
            "Unknown"
        }
    }
}

/// Order-out ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub menu_item: Option<ItemRef>,
    #[serde(default)]
    pub addons: Vec<ItemRef>,
    pub quantity: u32,
    pub price_per_unit: Money,
    #[serde(default)]
    pub discount: Option<Money>,
    pub created_at: DateTime<Utc>,
}

/// Stock-in ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default)]
    pub menu_item: Option<ItemRef>,
    #[serde(default)]
    pub addons: Vec<ItemRef>,
    pub quantity: u32,
    pub price_per_unit: Money,
    pub created_at: DateTime<Utc>,
}

macro_rules! impl_ledger_entry {
    ($t:ty) => {
        impl LedgerEntry for $t {
            fn record_id(&self) -> &RecordId {
                &self.id
            }

            fn menu_item(&self) -> Option<&ItemRef> {
                self.menu_item.as_ref()
            }

            fn addons(&self) -> &[ItemRef] {
                &self.addons
            }

            fn quantity(&self) -> u32 {
                self.quantity
            }

            fn price_per_unit(&self) -> Money {
                self.price_per_unit
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }
    };
}

impl_ledger_entry!(SaleRecord);
impl_ledger_entry!(RestockRecord);

/// User settings as returned by `/users/settings`.
///
/// Only the threshold is interpreted; other keys are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            low_stock_threshold: Some(threshold),
            extra: Map::new(),
        }
    }

    pub fn effective_low_stock_threshold(&self) -> u32 {
        effective_threshold(self.low_stock_threshold)
    }
}

/// Unset or zero thresholds fall back to [`DEFAULT_LOW_STOCK_THRESHOLD`].
pub(crate) fn effective_threshold(threshold: Option<u32>) -> u32 {
    threshold
        .filter(|t| *t > 0)
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stock_record_accepts_populated_and_bare_items() {
        let populated: StockRecord = serde_json::from_value(json!({
            "_id": "s1",
            "item": { "_id": "m1", "title": "Chocolate Cake", "price": 45 },
            "itemType": "MenuItem",
            "quantity": 12
        }))
        .unwrap();
        assert_eq!(populated.title(), "Chocolate Cake");
        assert!(populated.tracks(&ItemId::new("m1")));

        let bare: StockRecord = serde_json::from_value(json!({
            "_id": "s2",
            "item": "a1",
            "itemType": "Addon"
        }))
        .unwrap();
        assert_eq!(bare.title(), UNKNOWN_ITEM_TITLE);
        assert_eq!(bare.display_title(), "Unknown Item #a1");
        assert_eq!(populated.display_title(), "Chocolate Cake");
        assert_eq!(bare.on_hand(), 0);
        assert!(bare.tracks(&ItemId::new("a1")));
        assert!(!bare.tracks(&ItemId::new("m1")));
    }

    #[test]
    fn null_item_reads_as_unknown() {
        let row: StockRecord = serde_json::from_value(json!({
            "_id": "s3",
            "item": null,
            "itemType": "Addon",
            "quantity": 4
        }))
        .unwrap();
        assert_eq!(row.title(), UNKNOWN_ITEM_TITLE);
        assert_eq!(row.display_title(), UNKNOWN_ITEM_TITLE);
        assert_eq!(row.item_id(), None);
    }

    #[test]
    fn ledger_item_name_resolution() {
        let sale: SaleRecord = serde_json::from_value(json!({
            "_id": "x1",
            "menuItem": null,
            "addons": [{ "_id": "a1", "title": "Extra Shot", "price": 5 }],
            "quantity": 2,
            "pricePerUnit": 5,
            "discount": 0,
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(sale.item_name(), "Addons");
        assert_eq!(sale.line_value(), Money::from_units(10));

        let restock: RestockRecord = serde_json::from_value(json!({
            "_id": "x2",
            "menuItem": "m1",
            "quantity": 1,
            "pricePerUnit": 2.5,
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(restock.item_name(), "Unknown");
    }

    #[test]
    fn settings_keep_unknown_keys_and_default_threshold() {
        let settings: Settings = serde_json::from_value(json!({
            "lowStockThreshold": 0,
            "currency": "DKK"
        }))
        .unwrap();
        assert_eq!(settings.effective_low_stock_threshold(), DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(settings.extra.get("currency"), Some(&json!("DKK")));

        assert_eq!(Settings::with_threshold(3).effective_low_stock_threshold(), 3);
        assert_eq!(Settings::default().effective_low_stock_threshold(), 10);
    }
}
