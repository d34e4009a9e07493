//! Seeded in-memory backend for `stockdesk --demo`.

use stockdesk_client::InMemoryBackend;
use stockdesk_core::{ItemId, Money};
use stockdesk_inventory::{Alert, Item, ItemType, Settings};

fn item(id: &str, title: &str, minor: i64) -> Item {
    Item {
        id: ItemId::new(id),
        title: title.to_string(),
        price: Money::from_minor(minor),
    }
}

/// A small café catalog: a few menu items and addons, some low on stock,
/// one without a stock row at all.
pub fn demo_backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_settings(Settings::with_threshold(8))
        .with_item(item("m-espresso", "Espresso", 3200), ItemType::MenuItem, Some(40))
        .with_item(item("m-latte", "Caffe Latte", 4200), ItemType::MenuItem, Some(25))
        .with_item(item("m-brownie", "Chocolate Brownie", 3500), ItemType::MenuItem, Some(4))
        .with_item(item("m-croissant", "Butter Croissant", 2800), ItemType::MenuItem, Some(0))
        .with_item(item("m-bun", "Cinnamon Bun", 3000), ItemType::MenuItem, None)
        .with_item(item("a-oat", "Oat Milk", 600), ItemType::Addon, Some(12))
        .with_item(item("a-choc", "Chocolate Sauce", 500), ItemType::Addon, Some(3))
        .with_item(item("a-shot", "Extra Shot", 800), ItemType::Addon, Some(60))
        .with_alert(Alert::new("al-brownie", "active", "Chocolate Brownie is low on stock"))
        .with_alert(Alert::new("al-croissant", "active", "Butter Croissant is out of stock"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockdesk_client::{PlaceInventory, StockBackend};
    use stockdesk_core::PlaceId;

    #[tokio::test]
    async fn demo_catalog_is_seeded() {
        let backend = demo_backend();
        let stock = backend.list_stock().await.unwrap();
        assert_eq!(stock.len(), 7);
        assert_eq!(backend.get_settings().await.unwrap().effective_low_stock_threshold(), 8);
        assert_eq!(backend.search_menu_items(None).await.unwrap().len(), 5);
        assert_eq!(backend.search_addons(Some("choc")).await.unwrap().len(), 1);

        let alerts = backend.alerts(&PlaceId::new("cafe")).await.unwrap();
        assert_eq!(alerts.len(), 2);
        let low = backend.low_stock_items(&PlaceId::new("cafe")).await.unwrap();
        assert_eq!(low.as_array().map(Vec::len), Some(3));
    }
}
