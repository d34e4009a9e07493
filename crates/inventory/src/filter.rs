//! Display filtering and client-side pagination of stock rows.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockdesk_core::DomainError;

use crate::model::{ItemType, StockRecord};

/// Rows per page until the user picks another size.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Category tab: everything, or one catalog.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    MenuItem,
    Addon,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::All, Category::MenuItem, Category::Addon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::MenuItem => "MenuItem",
            Category::Addon => "Addon",
        }
    }

    pub fn admits(&self, item_type: ItemType) -> bool {
        match self {
            Category::All => true,
            Category::MenuItem => item_type == ItemType::MenuItem,
            Category::Addon => item_type == ItemType::Addon,
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Category::All),
            "menuitem" | "menu-item" | "menu_item" => Ok(Category::MenuItem),
            "addon" => Ok(Category::Addon),
            other => Err(DomainError::validation(format!(
                "unknown category '{other}' (expected All, MenuItem or Addon)"
            ))),
        }
    }
}

/// Free-text search combined with a category tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockFilter {
    query: String,
    category: Category,
}

impl StockFilter {
    pub fn new(query: impl Into<String>, category: Category) -> Self {
        Self {
            query: query.into().to_lowercase(),
            category,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Case-insensitive substring match on the resolved title plus an exact
    /// category match.
    pub fn matches(&self, record: &StockRecord) -> bool {
        self.category.admits(record.item_type)
            && record.title().to_lowercase().contains(&self.query)
    }

    pub fn apply<'a>(&self, stock: &'a [StockRecord]) -> Vec<&'a StockRecord> {
        stock.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Zero-based page over an already-filtered row list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page,
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Changing the page size returns to the first page.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page)
    }

    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = self.page.saturating_mul(self.per_page).min(rows.len());
        let end = start.saturating_add(self.per_page).min(rows.len());
        &rows[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockdesk_core::{ItemId, Money, RecordId};

    use crate::model::{Item, ItemRef};

    fn row(id: &str, title: &str, item_type: ItemType) -> StockRecord {
        StockRecord {
            id: RecordId::new(id),
            item: Some(ItemRef::Populated(Item {
                id: ItemId::new(format!("i-{id}")),
                title: title.to_string(),
                price: Money::from_units(10),
            })),
            item_type,
            quantity: Some(5),
        }
    }

    fn sample() -> Vec<StockRecord> {
        vec![
            row("1", "Chocolate Cake", ItemType::MenuItem),
            row("2", "Choc Sauce", ItemType::Addon),
            row("3", "Whipped Cream", ItemType::Addon),
            row("4", "DARK CHOCOLATE chips", ItemType::Addon),
        ]
    }

    #[test]
    fn addon_category_with_query_matches_only_addon_titles() {
        let stock = sample();
        let filter = StockFilter::new("choc", Category::Addon);
        let ids: Vec<&str> = filter.apply(&stock).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4"]);
    }

    #[test]
    fn empty_query_and_all_category_keep_everything() {
        let stock = sample();
        assert_eq!(StockFilter::default().apply(&stock).len(), stock.len());
    }

    #[test]
    fn unknown_item_rows_match_on_placeholder_title() {
        let stock = vec![StockRecord {
            id: RecordId::new("9"),
            item: Some(ItemRef::Id(ItemId::new("m9"))),
            item_type: ItemType::MenuItem,
            quantity: None,
        }];
        assert_eq!(StockFilter::new("unknown", Category::All).apply(&stock).len(), 1);
    }

    #[test]
    fn category_parses_loosely() {
        assert_eq!("addon".parse::<Category>().unwrap(), Category::Addon);
        assert_eq!("MenuItem".parse::<Category>().unwrap(), Category::MenuItem);
        assert!("drinks".parse::<Category>().is_err());
    }

    #[test]
    fn pagination_slices_and_resets() {
        let rows: Vec<u32> = (0..23).collect();
        let mut pages = Pagination::default();
        assert_eq!(pages.page_count(rows.len()), 3);

        pages.set_page(2);
        assert_eq!(pages.slice(&rows), &[20, 21, 22]);

        pages.set_page(7);
        assert!(pages.slice(&rows).is_empty());

        pages.set_page(1);
        pages.set_per_page(5);
        assert_eq!(pages.page(), 0);
        assert_eq!(pages.slice(&rows), &[0, 1, 2, 3, 4]);
    }
}
