//! reqwest-backed implementation of [`StockBackend`] and [`PlaceInventory`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use stockdesk_core::{PlaceId, RecordId};
use stockdesk_inventory::{
    Alert, Item, PlaceReport, RestockRecord, SaleRecord, Settings, StockRecord,
};

use crate::backend::{PlaceInventory, StockBackend};
use crate::error::ClientError;
use crate::payload::{CreateRestock, CreateSale, UpdateAlert};

/// Request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the stock backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(api_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(api_url, None, DEFAULT_TIMEOUT)
    }

    pub fn with_token(
        api_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_options(api_url, Some(token.into()), DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        api_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let api_url = api_url.into().trim_end_matches('/').to_string();
        if api_url.is_empty() {
            return Err(ClientError::Config("api url is empty".to_string()));
        }

        Ok(Self {
            api_url,
            token,
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let mut req = self.client.get(self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }

        tracing::debug!(path, "GET");
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::read_body(path, resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(reqwest::Method::PATCH, path, body).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        tracing::debug!(path, %method, "sending");
        let resp = self
            .authorize(self.client.request(method, self.url(path)).json(body))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::read_body(path, resp).await
    }

    async fn read_body<T: DeserializeOwned>(
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), "backend rejected request");
            return Err(ClientError::Api(status.as_u16(), body));
        }

        resp.json()
            .await
            .map_err(|e| ClientError::Parse(format!("{path}: {e}")))
    }

    fn search_query(search: Option<&str>) -> Vec<(&str, &str)> {
        match search.filter(|s| !s.is_empty()) {
            Some(s) => vec![("search", s)],
            None => Vec::new(),
        }
    }

    async fn place_report(&self, path: &str, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.get_json(path, &[("placeId", place.as_str())]).await
    }
}

#[async_trait]
impl StockBackend for HttpBackend {
    async fn list_stock(&self) -> Result<Vec<StockRecord>, ClientError> {
        self.get_json("/stock", &[]).await
    }

    async fn list_sales(&self) -> Result<Vec<SaleRecord>, ClientError> {
        self.get_json("/sales", &[]).await
    }

    async fn list_restocks(&self) -> Result<Vec<RestockRecord>, ClientError> {
        self.get_json("/restock", &[]).await
    }

    async fn create_sale(&self, request: &CreateSale) -> Result<SaleRecord, ClientError> {
        self.post_json("/sales", request).await
    }

    async fn create_restock(&self, request: &CreateRestock) -> Result<RestockRecord, ClientError> {
        self.post_json("/restock", request).await
    }

    async fn search_menu_items(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
        self.get_json("/menu-items", &Self::search_query(search)).await
    }

    async fn search_addons(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
        self.get_json("/addons", &Self::search_query(search)).await
    }

    async fn get_settings(&self) -> Result<Settings, ClientError> {
        self.get_json("/users/settings", &[]).await
    }
}

#[async_trait]
impl PlaceInventory for HttpBackend {
    async fn stock_levels(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.place_report("/inventory/stock", place).await
    }

    async fn low_stock_items(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.place_report("/inventory/low-stock", place).await
    }

    async fn reorder_recommendations(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.place_report("/inventory/reorder", place).await
    }

    async fn waste_analysis(&self, place: &PlaceId, days: u32) -> Result<PlaceReport, ClientError> {
        let days = days.to_string();
        let query = [("placeId", place.as_str()), ("days", days.as_str())];
        self.get_json("/inventory/waste", &query).await
    }

    async fn alerts(&self, place: &PlaceId) -> Result<Vec<Alert>, ClientError> {
        self.get_json("/inventory/alerts", &[("placeId", place.as_str())])
            .await
    }

    async fn resolve_alert(&self, alert: &RecordId) -> Result<Alert, ClientError> {
        let path = format!("/inventory/alerts/{alert}");
        self.patch_json(&path, &UpdateAlert::resolve()).await
    }

    async fn inventory_items(&self, place: &PlaceId) -> Result<PlaceReport, ClientError> {
        self.place_report("/inventory/items", place).await
    }

    async fn transactions(&self, place: &PlaceId, limit: u32) -> Result<PlaceReport, ClientError> {
        let limit = limit.to_string();
        let query = [("placeId", place.as_str()), ("limit", limit.as_str())];
        self.get_json("/inventory/transactions", &query).await
    }
}
