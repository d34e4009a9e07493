//! Search-as-you-type over both catalogs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stockdesk_core::CURRENCY;
use stockdesk_inventory::{Item, ItemType};

use crate::backend::StockBackend;
use crate::error::ClientError;

/// Why the lookup text changed. Only real typing queries the backend;
/// the control resetting or clearing its own value does not.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupTrigger {
    Input,
    Reset,
    Clear,
}

/// A selectable catalog hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOption {
    #[serde(flatten)]
    pub item: Item,
    pub item_type: ItemType,
    pub label: String,
}

impl ItemOption {
    pub fn new(item: Item, item_type: ItemType) -> Self {
        let label = option_label(&item);
        Self {
            item,
            item_type,
            label,
        }
    }
}

/// `"<title> - DKK <price>"`
pub fn option_label(item: &Item) -> String {
    format!("{} - {} {}", item.title, CURRENCY, item.price.plain())
}

/// Queries menu items and addons concurrently; menu items come first.
pub async fn search_items<B>(backend: &B, query: &str) -> Result<Vec<ItemOption>, ClientError>
where
    B: StockBackend + ?Sized,
{
    let search = Some(query).filter(|q| !q.is_empty());
    let (menu_items, addons) = tokio::try_join!(
        backend.search_menu_items(search),
        backend.search_addons(search),
    )?;

    Ok(menu_items
        .into_iter()
        .map(|i| ItemOption::new(i, ItemType::MenuItem))
        .chain(addons.into_iter().map(|i| ItemOption::new(i, ItemType::Addon)))
        .collect())
}

/// Option list backing the adjustment dialog's item picker.
pub struct ItemLookup {
    backend: Arc<dyn StockBackend>,
    options: Vec<ItemOption>,
}

impl ItemLookup {
    pub fn new(backend: Arc<dyn StockBackend>) -> Self {
        Self {
            backend,
            options: Vec::new(),
        }
    }

    pub fn options(&self) -> &[ItemOption] {
        &self.options
    }

    /// Refreshes the options when the user typed; any other trigger keeps
    /// the current list. A failed search empties the list.
    pub async fn on_input_change(
        &mut self,
        value: &str,
        trigger: LookupTrigger,
    ) -> &[ItemOption] {
        if trigger != LookupTrigger::Input {
            return &self.options;
        }

        match search_items(self.backend.as_ref(), value).await {
            Ok(options) => {
                tracing::debug!(query = value, hits = options.len(), "item lookup");
                self.options = options;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch items");
                self.options.clear();
            }
        }

        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use stockdesk_core::{ItemId, Money};
    use stockdesk_inventory::{RestockRecord, SaleRecord, Settings, StockRecord};

    use crate::payload::{CreateRestock, CreateSale};

    #[derive(Default)]
    struct Catalog {
        fail_addons: bool,
        searches: Mutex<Vec<(&'static str, Option<String>)>>,
    }

    fn item(id: &str, title: &str, minor: i64) -> Item {
        Item {
            id: ItemId::new(id),
            title: title.to_string(),
            price: Money::from_minor(minor),
        }
    }

    #[async_trait]
    impl StockBackend for Catalog {
        async fn list_stock(&self) -> Result<Vec<StockRecord>, ClientError> {
            Ok(Vec::new())
        }

        async fn list_sales(&self) -> Result<Vec<SaleRecord>, ClientError> {
            Ok(Vec::new())
        }

        async fn list_restocks(&self) -> Result<Vec<RestockRecord>, ClientError> {
            Ok(Vec::new())
        }

        async fn create_sale(&self, _request: &CreateSale) -> Result<SaleRecord, ClientError> {
            Err(ClientError::Api(501, "unused".to_string()))
        }

        async fn create_restock(
            &self,
            _request: &CreateRestock,
        ) -> Result<RestockRecord, ClientError> {
            Err(ClientError::Api(501, "unused".to_string()))
        }

        async fn search_menu_items(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
            self.searches
                .lock()
                .unwrap()
                .push(("menu-items", search.map(str::to_string)));
            Ok(vec![item("m1", "Chocolate Cake", 4500), item("m2", "Choco Latte", 3850)])
        }

        async fn search_addons(&self, search: Option<&str>) -> Result<Vec<Item>, ClientError> {
            self.searches
                .lock()
                .unwrap()
                .push(("addons", search.map(str::to_string)));
            if self.fail_addons {
                return Err(ClientError::Network("connection reset".to_string()));
            }
            Ok(vec![item("a1", "Choc Sauce", 500)])
        }

        async fn get_settings(&self) -> Result<Settings, ClientError> {
            Ok(Settings::default())
        }
    }

    #[test]
    fn label_formats_title_currency_and_price() {
        assert_eq!(option_label(&item("m2", "Choco Latte", 3850)), "Choco Latte - DKK 38.5");
        assert_eq!(option_label(&item("m1", "Cake", 4500)), "Cake - DKK 45");
    }

    #[tokio::test]
    async fn menu_items_come_before_addons() {
        let backend = Catalog::default();
        let options = search_items(&backend, "choc").await.unwrap();

        let ids: Vec<&str> = options.iter().map(|o| o.item.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "a1"]);
        assert_eq!(options[0].item_type, ItemType::MenuItem);
        assert_eq!(options[2].item_type, ItemType::Addon);
        assert_eq!(options[2].label, "Choc Sauce - DKK 5");

        let searches = backend.searches.lock().unwrap();
        assert!(searches.iter().all(|(_, q)| q.as_deref() == Some("choc")));
    }

    #[tokio::test]
    async fn only_typing_triggers_a_query() {
        let backend = Arc::new(Catalog::default());
        let mut lookup = ItemLookup::new(backend.clone());

        assert!(lookup.on_input_change("Cake", LookupTrigger::Reset).await.is_empty());
        assert!(backend.searches.lock().unwrap().is_empty());

        assert_eq!(lookup.on_input_change("", LookupTrigger::Input).await.len(), 3);
        assert_eq!(backend.searches.lock().unwrap()[0], ("menu-items", None));
    }

    #[tokio::test]
    async fn failed_search_clears_options() {
        let backend = Arc::new(Catalog {
            fail_addons: true,
            ..Catalog::default()
        });
        let mut lookup = ItemLookup::new(backend);

        assert!(lookup.on_input_change("choc", LookupTrigger::Input).await.is_empty());
        assert!(lookup.options().is_empty());
    }
}
