use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{Value, json};

use stockdesk_client::{
    ClientError, CreateRestock, CreateSale, HttpBackend, PlaceInventory, StockBackend,
    search_items,
};
use stockdesk_core::{ItemId, Money, PlaceId, RecordId};
use stockdesk_inventory::{
    DEFAULT_TRANSACTION_LIMIT, DEFAULT_WASTE_DAYS, Item, ItemType, LedgerEntry,
};

#[derive(Clone, Default)]
struct Recorded {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Recorded {
    fn record(&self, what: &str, body: Value, headers: &HeaderMap) {
        self.calls.lock().unwrap().push((what.to_string(), body));
        self.auth.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }
}

struct MockBackend {
    base_url: String,
    recorded: Recorded,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    async fn spawn() -> Self {
        let recorded = Recorded::default();

        let app = Router::new()
            .route(
                "/stock",
                get(|State(r): State<Recorded>, headers: HeaderMap| async move {
                    r.record("list_stock", Value::Null, &headers);
                    Json(json!([
                        {
                            "_id": "s1",
                            "item": { "_id": "m1", "title": "Chocolate Cake", "price": 45 },
                            "itemType": "MenuItem",
                            "quantity": 12
                        },
                        { "_id": "s2", "item": "a1", "itemType": "Addon" }
                    ]))
                }),
            )
            .route(
                "/sales",
                get(|State(r): State<Recorded>, headers: HeaderMap| async move {
                    r.record("list_sales", Value::Null, &headers);
                    Json(json!([{
                        "_id": "x1",
                        "menuItem": { "_id": "m1", "title": "Chocolate Cake", "price": 45 },
                        "addons": [],
                        "quantity": 3,
                        "pricePerUnit": 5,
                        "discount": 0,
                        "createdAt": "2026-03-01T10:00:00.000Z"
                    }]))
                })
                .post(
                    |State(r): State<Recorded>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        r.record("create_sale", body.clone(), &headers);
                        if body["menuItemId"] == "missing" {
                            return Err((StatusCode::NOT_FOUND, "Menu item not found".to_string()));
                        }
                        Ok(Json(json!({
                            "_id": "x2",
                            "menuItem": body["menuItemId"],
                            "addons": [],
                            "quantity": body["quantity"],
                            "pricePerUnit": body["pricePerUnit"],
                            "discount": body["discount"],
                            "createdAt": "2026-03-02T09:30:00Z"
                        })))
                    },
                ),
            )
            .route(
                "/restock",
                get(|State(r): State<Recorded>, headers: HeaderMap| async move {
                    r.record("list_restocks", Value::Null, &headers);
                    Json(json!([{
                        "_id": "r1",
                        "menuItem": null,
                        "addons": ["a1"],
                        "quantity": 10,
                        "pricePerUnit": 5,
                        "createdAt": "2026-03-01T08:00:00Z"
                    }]))
                })
                .post(
                    |State(r): State<Recorded>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        r.record("create_restock", body.clone(), &headers);
                        Json(json!({
                            "_id": "r2",
                            "menuItem": body["menuItemId"],
                            "quantity": body["quantity"],
                            "pricePerUnit": body["pricePerUnit"],
                            "createdAt": "2026-03-02T09:31:00Z"
                        }))
                    },
                ),
            )
            .route(
                "/menu-items",
                get(
                    |State(r): State<Recorded>,
                     headers: HeaderMap,
                     Query(q): Query<HashMap<String, String>>| async move {
                        r.record("menu_items", json!(q), &headers);
                        Json(json!([{ "_id": "m1", "title": "Chocolate Cake", "price": 45.5 }]))
                    },
                ),
            )
            .route(
                "/addons",
                get(
                    |State(r): State<Recorded>,
                     headers: HeaderMap,
                     Query(q): Query<HashMap<String, String>>| async move {
                        r.record("addons", json!(q), &headers);
                        Json(json!([{ "_id": "a1", "title": "Choc Sauce", "price": 5 }]))
                    },
                ),
            )
            .route(
                "/users/settings",
                get(|State(r): State<Recorded>, headers: HeaderMap| async move {
                    r.record("settings", Value::Null, &headers);
                    Json(json!({ "lowStockThreshold": 7, "theme": "dark" }))
                }),
            )
            .route("/inventory/stock", get(place_report))
            .route("/inventory/low-stock", get(place_report))
            .route("/inventory/reorder", get(place_report))
            .route("/inventory/waste", get(place_report))
            .route("/inventory/items", get(place_report))
            .route("/inventory/transactions", get(place_report))
            .route(
                "/inventory/alerts",
                get(
                    |State(r): State<Recorded>,
                     headers: HeaderMap,
                     Query(q): Query<HashMap<String, String>>| async move {
                        r.record("/inventory/alerts", json!(q), &headers);
                        Json(json!([
                            { "_id": "al1", "status": "active", "message": "Oat Milk is low" },
                            { "_id": "al2", "status": "resolved", "severity": "low" }
                        ]))
                    },
                ),
            )
            .route(
                "/inventory/alerts/:id",
                patch(
                    |State(r): State<Recorded>,
                     Path(id): Path<String>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        r.record(&format!("resolve {id}"), body.clone(), &headers);
                        if id == "missing" {
                            return Err((StatusCode::NOT_FOUND, "Alert not found".to_string()));
                        }
                        Ok(Json(json!({
                            "_id": id,
                            "status": body["status"],
                            "message": "Oat Milk is low"
                        })))
                    },
                ),
            )
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            recorded,
            handle,
        }
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.recorded.calls.lock().unwrap().clone()
    }
}

/// Echoes the request path and query back so callers can check both.
async fn place_report(
    State(r): State<Recorded>,
    uri: Uri,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    r.record(uri.path(), json!(q), &headers);
    Json(json!({ "path": uri.path(), "query": q }))
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn cake() -> Item {
    Item {
        id: ItemId::new("m1"),
        title: "Chocolate Cake".to_string(),
        price: Money::from_units(45),
    }
}

#[tokio::test]
async fn lists_parse_backend_shapes() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::new(&srv.base_url).unwrap();

    let stock = backend.list_stock().await.unwrap();
    assert_eq!(stock.len(), 2);
    assert_eq!(stock[0].title(), "Chocolate Cake");
    assert_eq!(stock[0].on_hand(), 12);
    assert_eq!(stock[1].item_type, ItemType::Addon);
    assert_eq!(stock[1].on_hand(), 0);

    let sales = backend.list_sales().await.unwrap();
    assert_eq!(sales[0].line_value(), Money::from_units(15));

    let restocks = backend.list_restocks().await.unwrap();
    assert_eq!(restocks[0].item_name(), "Addons");

    let settings = backend.get_settings().await.unwrap();
    assert_eq!(settings.effective_low_stock_threshold(), 7);
    assert_eq!(settings.extra["theme"], "dark");
}

#[tokio::test]
async fn create_sale_posts_contract_payload() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::new(&srv.base_url).unwrap();

    let created = backend
        .create_sale(&CreateSale::for_item(&cake(), 2))
        .await
        .unwrap();
    assert_eq!(created.quantity, 2);
    assert_eq!(created.price_per_unit, Money::from_units(45));

    let calls = srv.calls();
    let (name, body) = calls.last().unwrap();
    assert_eq!(name, "create_sale");
    assert_eq!(body["menuItemId"], "m1");
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["pricePerUnit"].as_f64(), Some(45.0));
    assert_eq!(body["discount"].as_f64(), Some(0.0));
    assert_eq!(body["addonIds"], json!([]));
}

#[tokio::test]
async fn create_restock_posts_without_discount() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::new(&srv.base_url).unwrap();

    let created = backend
        .create_restock(&CreateRestock::for_item(&cake(), 10))
        .await
        .unwrap();
    assert_eq!(created.quantity, 10);

    let calls = srv.calls();
    let (name, body) = calls.last().unwrap();
    assert_eq!(name, "create_restock");
    assert!(body.get("discount").is_none());
}

#[tokio::test]
async fn backend_rejection_maps_to_api_error() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::new(&srv.base_url).unwrap();

    let mut missing = cake();
    missing.id = ItemId::new("missing");

    let err = backend
        .create_sale(&CreateSale::for_item(&missing, 1))
        .await
        .unwrap_err();
    match err {
        ClientError::Api(404, body) => assert!(body.contains("not found")),
        other => panic!("expected 404 API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
    let err = backend.list_stock().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn search_passes_query_only_when_present() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::new(&srv.base_url).unwrap();

    let options = search_items(&backend, "choc").await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].label, "Chocolate Cake - DKK 45.5");
    assert_eq!(options[1].item_type, ItemType::Addon);

    search_items(&backend, "").await.unwrap();

    let calls = srv.calls();
    let menu: Vec<&Value> = calls
        .iter()
        .filter(|(n, _)| n == "menu_items")
        .map(|(_, q)| q)
        .collect();
    assert_eq!(menu[0], &json!({ "search": "choc" }));
    assert_eq!(menu[1], &json!({}));
}

#[tokio::test]
async fn bearer_token_is_forwarded() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::with_token(&srv.base_url, "t0ken").unwrap();

    backend.list_stock().await.unwrap();
    backend.get_settings().await.unwrap();

    let auth = srv.recorded.auth.lock().unwrap().clone();
    assert_eq!(auth, vec![Some("Bearer t0ken".to_string()); 2]);
}

#[tokio::test]
async fn place_reports_send_place_and_defaults() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::new(&srv.base_url).unwrap();
    let place = PlaceId::new("p7");

    let levels = backend.stock_levels(&place).await.unwrap();
    assert_eq!(levels["path"], "/inventory/stock");
    assert_eq!(levels["query"], json!({ "placeId": "p7" }));

    backend.low_stock_items(&place).await.unwrap();
    backend.reorder_recommendations(&place).await.unwrap();
    backend.inventory_items(&place).await.unwrap();

    let waste = backend
        .waste_analysis(&place, DEFAULT_WASTE_DAYS)
        .await
        .unwrap();
    assert_eq!(waste["query"], json!({ "placeId": "p7", "days": "30" }));

    let txns = backend
        .transactions(&place, DEFAULT_TRANSACTION_LIMIT)
        .await
        .unwrap();
    assert_eq!(txns["query"], json!({ "placeId": "p7", "limit": "20" }));

    let paths: Vec<String> = srv.calls().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        paths,
        vec![
            "/inventory/stock",
            "/inventory/low-stock",
            "/inventory/reorder",
            "/inventory/items",
            "/inventory/waste",
            "/inventory/transactions",
        ]
    );
}

#[tokio::test]
async fn alerts_list_and_resolve() {
    let srv = MockBackend::spawn().await;
    let backend = HttpBackend::with_token(&srv.base_url, "t0ken").unwrap();

    let alerts = backend.alerts(&PlaceId::new("p7")).await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert!(!alerts[0].is_resolved());
    assert!(alerts[1].is_resolved());
    assert_eq!(alerts[1].extra["severity"], "low");

    let resolved = backend.resolve_alert(&RecordId::new("al1")).await.unwrap();
    assert!(resolved.is_resolved());
    assert_eq!(resolved.id, RecordId::new("al1"));

    let calls = srv.calls();
    assert_eq!(calls[0], ("/inventory/alerts".to_string(), json!({ "placeId": "p7" })));
    assert_eq!(calls[1], ("resolve al1".to_string(), json!({ "status": "resolved" })));

    let auth = srv.recorded.auth.lock().unwrap().clone();
    assert_eq!(auth, vec![Some("Bearer t0ken".to_string()); 2]);

    let err = backend
        .resolve_alert(&RecordId::new("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}
