//! The stock backend seam.

use std::sync::Arc;

use async_trait::async_trait;

use stockdesk_core::{PlaceId, RecordId};
use stockdesk_inventory::{
    Alert, Item, PlaceReport, RestockRecord, SaleRecord, Settings, StockRecord,
};

use crate::error::ClientError;
use crate::payload::{CreateRestock, CreateSale};

/// Remote service that owns stock levels and the sale/restock ledgers.
///
/// Every list call returns the full collection. `search` of `None` lists the
/// whole catalog.
#[async_trait]
pub trait StockBackend: Send + Sync {
    /// `GET /stock`
    async fn list_stock(&self) -> Result<Vec<StockRecord>, ClientError>;

    /// `GET /sales`
    async fn list_sales(&self) -> Result<Vec<SaleRecord>, ClientError>;

    /// `GET /restock`
    async fn list_restocks(&self) -> Result<Vec<RestockRecord>, ClientError>;

    /// `POST /sales`
    async fn create_sale(&self, request: &CreateSale) -> Result<SaleRecord, ClientError>;

    /// `POST /restock`
    async fn create_restock(&self, request: &CreateRestock) -> Result<RestockRecord, ClientError>;

    /// `GET /menu-items?search=`
    async fn search_menu_items(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError>;

    /// `GET /addons?search=`
    async fn search_addons(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError>;

    /// `GET /users/settings`
    async fn get_settings(&self) -> Result<Settings, ClientError>;
}

#[async_trait]
impl<B: StockBackend + ?Sized> StockBackend for Arc<B> {
    async fn list_stock(&self) -> Result<Vec<StockRecord>, ClientError> {
        (**self).list_stock().await
    }

    async fn list_sales(&self) -> Result<Vec<SaleRecord>, ClientError> {
        (**self).list_sales().await
    }

    async fn list_restocks(&self) -> Result<Vec<RestockRecord>, ClientError> {
        (**self).list_restocks().await
    }

    async fn create_sale(&self, request: &CreateSale) -> Result<SaleRecord, ClientError> {
        (**self).create_sale(request).await
    }

    async fn create_restock(&self, request: &CreateRestock) -> Result<RestockRecord, ClientError> {
        (**self).create_restock(request).await
    }

    async fn search_menu_items(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
        (**self).search_menu_items(search).await
    }

    async fn search_addons(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
        (**self).search_addons(search).await
    }

    async fn get_settings(&self) -> Result<Settings, ClientError> {
        (**self).get_settings().await
    }
}

/// Place-scoped inventory service (`/inventory/*`): reports computed by the
/// backend per place, and stock alerts.
#[async_trait]
pub trait PlaceInventory: Send + Sync {
    /// `GET /inventory/stock?placeId=`
    async fn stock_levels(&self, place: &PlaceId) -> Result<PlaceReport, ClientError>;

    /// `GET /inventory/low-stock?placeId=`
    async fn low_stock_items(&self, place: &PlaceId) -> Result<PlaceReport, ClientError>;

    /// `GET /inventory/reorder?placeId=`
    async fn reorder_recommendations(&self, place: &PlaceId) -> Result<PlaceReport, ClientError>;

    /// `GET /inventory/waste?placeId=&days=`
    async fn waste_analysis(&self, place: &PlaceId, days: u32) -> Result<PlaceReport, ClientError>;

    /// `GET /inventory/alerts?placeId=`
    async fn alerts(&self, place: &PlaceId) -> Result<Vec<Alert>, ClientError>;

    /// `PATCH /inventory/alerts/{id}` with `{"status":"resolved"}`
    async fn resolve_alert(&self, alert: &RecordId) -> Result<Alert, ClientError>;

    /// `GET /inventory/items?placeId=`
    async fn inventory_items(&self, place: &PlaceId) -> Result<PlaceReport, ClientError>;

    /// `GET /inventory/transactions?placeId=&limit=`
    async fn transactions(&self, place: &PlaceId, limit: u32) -> Result<PlaceReport, ClientError>;
}

#[async_trait]
impl<B: PlaceInventory + ?Sized> PlaceInventory for Arc<B> {
    async fn stock_levels(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        (**self).stock_levels(place).await
    }

    async fn low_stock_items(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        (**self).low_stock_items(place).await
    }

    async fn reorder_recommendations(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        (**self).reorder_recommendations(place).await
    }

    async fn waste_analysis(&self, place: &PlaceId, days: u32) -> Result<PlaceReport, ClientError> {
        (**self).waste_analysis(place, days).await
    }

    async fn alerts(&self, place: &PlaceId) -> Result<Vec<Alert>, ClientError> {
        (**self).alerts(place).await
    }

    async fn resolve_alert(&self, alert: &RecordId) -> Result<Alert, ClientError> {
        (**self).resolve_alert(alert).await
    }

    async fn inventory_items(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        (**self).inventory_items(place).await
    }

    async fn transactions(&self, place: &PlaceId, limit: u32) -> Result<PlaceReport, ClientError> {
        (**self).transactions(place, limit).await
    }
}
