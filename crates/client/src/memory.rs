//! In-memory stock backend.
//!
//! Intended for tests/dev. Mirrors what the real service does with
//! restocks and sales: a restock bumps the item's stock row (creating one
//! when none exists), a sale draws it down.
//!
//! The place-scoped reports treat the store as a single place: every
//! `PlaceId` sees the same stock.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use stockdesk_core::{ItemId, PlaceId, RecordId};
use stockdesk_inventory::{
    Alert, Direction, Item, ItemRef, ItemType, PlaceReport, RestockRecord, SaleRecord, Settings,
    StockRecord, adjusted_quantity, build_activity_feed,
};

use crate::backend::{PlaceInventory, StockBackend};
use crate::error::ClientError;
use crate::payload::{CreateRestock, CreateSale};

#[derive(Debug, Default)]
struct Store {
    menu_items: Vec<Item>,
    addons: Vec<Item>,
    stock: Vec<StockRecord>,
    sales: Vec<SaleRecord>,
    restocks: Vec<RestockRecord>,
    alerts: Vec<Alert>,
    settings: Settings,
    next_id: u64,
    fail_reads: bool,
    fail_writes: bool,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> RecordId {
        self.next_id += 1;
        RecordId::new(format!("{prefix}-{}", self.next_id))
    }

    fn find_item(&self, id: &ItemId) -> Option<(Item, ItemType)> {
        if let Some(item) = self.menu_items.iter().find(|i| &i.id == id) {
            return Some((item.clone(), ItemType::MenuItem));
        }
        self.addons
            .iter()
            .find(|i| &i.id == id)
            .map(|i| (i.clone(), ItemType::Addon))
    }

    fn move_stock(&mut self, item: Item, item_type: ItemType, quantity: u32, direction: Direction) {
        if let Some(row) = self.stock.iter_mut().find(|r| r.tracks(&item.id)) {
            row.quantity = Some(adjusted_quantity(row.on_hand(), quantity, direction));
            return;
        }
        if direction == Direction::StockIn {
            let id = self.next_id("stock");
            store_row(&mut self.stock, id, item, item_type, quantity);
        }
    }

    fn low_stock(&self) -> impl Iterator<Item = &StockRecord> {
        let threshold = self.settings.effective_low_stock_threshold();
        self.stock.iter().filter(move |r| r.on_hand() < threshold)
    }

    fn catalog(&self) -> impl Iterator<Item = (&Item, ItemType)> {
        let menu = self.menu_items.iter().map(|i| (i, ItemType::MenuItem));
        menu.chain(self.addons.iter().map(|i| (i, ItemType::Addon)))
    }
}

fn store_row(
    stock: &mut Vec<StockRecord>,
    id: RecordId,
    item: Item,
    item_type: ItemType,
    quantity: u32,
) {
    stock.push(StockRecord {
        id,
        item: Some(ItemRef::Populated(item)),
        item_type,
        quantity: Some(quantity),
    });
}

fn report<T: Serialize + ?Sized>(value: &T) -> Result<PlaceReport, ClientError> {
    serde_json::to_value(value).map_err(|e| ClientError::Parse(e.to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    store: RwLock<Store>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog item; `quantity` of `Some` also seeds a stock row.
    pub fn with_item(self, item: Item, item_type: ItemType, quantity: Option<u32>) -> Self {
        if let Ok(mut store) = self.store.write() {
            if let Some(quantity) = quantity {
                let id = store.next_id("stock");
                store_row(&mut store.stock, id, item.clone(), item_type, quantity);
            }
            match item_type {
                ItemType::MenuItem => store.menu_items.push(item),
                ItemType::Addon => store.addons.push(item),
            }
        }
        self
    }

    pub fn with_settings(self, settings: Settings) -> Self {
        if let Ok(mut store) = self.store.write() {
            store.settings = settings;
        }
        self
    }

    pub fn with_alert(self, alert: Alert) -> Self {
        if let Ok(mut store) = self.store.write() {
            store.alerts.push(alert);
        }
        self
    }

    /// Make every list/search/settings/report call fail with a network error.
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut store) = self.store.write() {
            store.fail_reads = fail;
        }
    }

    /// Make every create/resolve call fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut store) = self.store.write() {
            store.fail_writes = fail;
        }
    }

    /// Overwrite a stock row's quantity, as another client would.
    pub fn set_quantity(&self, item_id: &ItemId, quantity: u32) {
        if let Ok(mut store) = self.store.write() {
            for row in store.stock.iter_mut().filter(|r| r.tracks(item_id)) {
                row.quantity = Some(quantity);
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Store) -> T) -> Result<T, ClientError> {
        let store = self
            .store
            .read()
            .map_err(|_| ClientError::Network("lock poisoned".to_string()))?;
        if store.fail_reads {
            return Err(ClientError::Network("simulated outage".to_string()));
        }
        Ok(f(&store))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let mut store = self
            .store
            .write()
            .map_err(|_| ClientError::Network("lock poisoned".to_string()))?;
        if store.fail_writes {
            return Err(ClientError::Api(500, "simulated failure".to_string()));
        }
        f(&mut store)
    }

    fn search(items: &[Item], search: Option<&str>) -> Vec<Item> {
        let needle = search.unwrap_or_default().to_lowercase();
        items
            .iter()
            .filter(|i| i.title.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl StockBackend for InMemoryBackend {
    async fn list_stock(&self) -> Result<Vec<StockRecord>, ClientError> {
        self.read(|s| s.stock.clone())
    }

    async fn list_sales(&self) -> Result<Vec<SaleRecord>, ClientError> {
        self.read(|s| s.sales.clone())
    }

    async fn list_restocks(&self) -> Result<Vec<RestockRecord>, ClientError> {
        self.read(|s| s.restocks.clone())
    }

    async fn create_sale(&self, request: &CreateSale) -> Result<SaleRecord, ClientError> {
        self.write(|store| {
            let (item, item_type) = store
                .find_item(&request.menu_item_id)
                .ok_or_else(|| ClientError::Api(404, "Menu item not found".to_string()))?;

            let sale = SaleRecord {
                id: store.next_id("sale"),
                menu_item: Some(ItemRef::Populated(item.clone())),
                addons: Vec::new(),
                quantity: request.quantity,
                price_per_unit: request.price_per_unit,
                discount: Some(request.discount),
                created_at: Utc::now(),
            };
            store.move_stock(item, item_type, request.quantity, Direction::StockOut);
            store.sales.push(sale.clone());
            Ok(sale)
        })
    }

    async fn create_restock(&self, request: &CreateRestock) -> Result<RestockRecord, ClientError> {
        self.write(|store| {
            let (item, item_type) = store
                .find_item(&request.menu_item_id)
                .ok_or_else(|| ClientError::Api(404, "Menu item not found".to_string()))?;

            let restock = RestockRecord {
                id: store.next_id("restock"),
                menu_item: Some(ItemRef::Populated(item.clone())),
                addons: Vec::new(),
                quantity: request.quantity,
                price_per_unit: request.price_per_unit,
                created_at: Utc::now(),
            };
            store.move_stock(item, item_type, request.quantity, Direction::StockIn);
            store.restocks.push(restock.clone());
            Ok(restock)
        })
    }

    async fn search_menu_items(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
        self.read(|s| Self::search(&s.menu_items, search))
    }

    async fn search_addons(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
        self.read(|s| Self::search(&s.addons, search))
    }

    async fn get_settings(&self) -> Result<Settings, ClientError> {
        self.read(|s| s.settings.clone())
    }
}

#[async_trait]
impl PlaceInventory for InMemoryBackend {
    async fn stock_levels(&self, _place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.read(|s| report(&s.stock))?
    }

    async fn low_stock_items(&self, _place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.read(|s| report(&s.low_stock().collect::<Vec<_>>()))?
    }

    /// Suggests topping each low row up to twice the threshold.
    async fn reorder_recommendations(&self, _place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.read(|s| {
            let target = s.settings.effective_low_stock_threshold().saturating_mul(2);
            let rows: Vec<Value> = s
                .low_stock()
                .map(|r| {
                    json!({
                        "itemId": r.item_id(),
                        "title": r.title(),
                        "quantity": r.on_hand(),
                        "suggestedQuantity": target.saturating_sub(r.on_hand()),
                    })
                })
                .collect();
            Value::Array(rows)
        })
    }

    /// No waste is ever recorded here.
    async fn waste_analysis(
        &self,
        _place: &PlaceId,
        days: u32,
    ) -> Result<PlaceReport, ClientError> {
        self.read(|_| json!({ "days": days, "totalWaste": 0, "items": [] }))
    }

    async fn alerts(&self, _place: &PlaceId) -> Result<Vec<Alert>, ClientError> {
        self.read(|s| s.alerts.clone())
    }

    async fn resolve_alert(&self, alert: &RecordId) -> Result<Alert, ClientError> {
        self.write(|store| {
            let found = store
                .alerts
                .iter_mut()
                .find(|a| &a.id == alert)
                .ok_or_else(|| ClientError::Api(404, "Alert not found".to_string()))?;
            *found = found.clone().resolved();
            Ok(found.clone())
        })
    }

    async fn inventory_items(&self, _place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.read(|s| {
            let rows: Vec<Value> = s
                .catalog()
                .map(|(item, item_type)| {
                    json!({
                        "_id": item.id,
                        "title": item.title,
                        "price": item.price,
                        "itemType": item_type,
                    })
                })
                .collect();
            Value::Array(rows)
        })
    }

    async fn transactions(&self, _place: &PlaceId, limit: u32) -> Result<PlaceReport, ClientError> {
        self.read(|s| {
            let feed = build_activity_feed(&s.sales, &s.restocks);
            let limit = usize::try_from(limit).unwrap_or(usize::MAX);
            report(&feed[..feed.len().min(limit)])
        })?
    }
}
