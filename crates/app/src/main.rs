//! `stockdesk` command-line front end.
//!
//! Loads the stock page from the backend and prints one of its views,
//! records a stock-in / order-out adjustment, or reads the place-scoped
//! inventory reports and alerts.

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use stockdesk_app::coordinator::AdjustmentCoordinator;
use stockdesk_app::demo::demo_backend;
use stockdesk_app::{AppConfig, StockPage, StockView};
use stockdesk_client::{ItemLookup, LookupTrigger, PlaceInventory, StockBackend, search_items};
use stockdesk_core::{ItemId, PlaceId, RecordId, find_by_id};
use stockdesk_inventory::{
    Category, DEFAULT_TRANSACTION_LIMIT, DEFAULT_WASTE_DAYS, Direction, Item, Pagination,
    StockFilter,
};

#[derive(Parser)]
#[command(name = "stockdesk")]
#[command(about = "Stock levels, activity and adjustments for the POS backend")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides STOCKDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides STOCKDESK_AUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Use a seeded in-memory backend instead of the network
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, low-stock count and inventory value
    Summary,

    /// Current stock table
    Stock {
        /// Case-insensitive title search
        #[arg(long, default_value = "")]
        query: String,

        /// All, MenuItem or Addon
        #[arg(long, default_value = "All")]
        category: Category,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,

        #[arg(long, default_value_t = stockdesk_inventory::DEFAULT_PER_PAGE)]
        per_page: usize,
    },

    /// Recent sales and restocks, newest first
    Activity {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Record a restock
    StockIn {
        item_id: ItemId,
        quantity: u32,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Record a sale
    OrderOut {
        item_id: ItemId,
        quantity: u32,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Search menu items and addons
    Search {
        #[arg(default_value = "")]
        query: String,
    },

    /// Stock levels as the backend reports them for a place
    PlaceStock {
        #[arg(long)]
        place: PlaceId,
    },

    /// Items below their reorder point at a place
    LowStock {
        #[arg(long)]
        place: PlaceId,
    },

    /// Reorder recommendations for a place
    Reorder {
        #[arg(long)]
        place: PlaceId,
    },

    /// Waste over the last `days` days
    Waste {
        #[arg(long)]
        place: PlaceId,
        #[arg(long, default_value_t = DEFAULT_WASTE_DAYS)]
        days: u32,
    },

    /// Inventory items tracked at a place
    Items {
        #[arg(long)]
        place: PlaceId,
    },

    /// Most recent inventory transactions at a place
    Transactions {
        #[arg(long)]
        place: PlaceId,
        #[arg(long, default_value_t = DEFAULT_TRANSACTION_LIMIT)]
        limit: u32,
    },

    /// Stock alerts raised for a place
    Alerts {
        #[arg(long)]
        place: PlaceId,
    },

    /// Mark an alert resolved
    ResolveAlert { alert_id: RecordId },
}

/// One backend seen through both of its interfaces.
struct Backends {
    stock: Arc<dyn StockBackend>,
    place: Arc<dyn PlaceInventory>,
}

impl Backends {
    fn new<B: StockBackend + PlaceInventory + 'static>(backend: B) -> Self {
        let backend = Arc::new(backend);
        Self {
            stock: backend.clone(),
            place: backend,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockdesk_observability::init();

    let cli = Cli::parse();

    let Backends { stock: backend, place } = if cli.demo {
        tracing::info!("using seeded in-memory backend");
        Backends::new(demo_backend())
    } else {
        let config = AppConfig::from_env()?.with_overrides(cli.api_url.clone(), cli.token.clone());
        Backends::new(config.http_backend().context("failed to build backend client")?)
    };

    match cli.command {
        Commands::Summary => {
            let page = load_page(backend).await;
            let view = page.read().await.view(&StockFilter::default(), &Pagination::default(), 0);
            if cli.json {
                print_json(&Summary::from(&view))?;
            } else {
                print_summary(&view);
            }
        }
        Commands::Stock {
            query,
            category,
            page: page_index,
            per_page,
        } => {
            let page = load_page(backend).await;
            let mut pagination = Pagination::default();
            pagination.set_per_page(per_page);
            pagination.set_page(page_index);

            let view = page
                .read()
                .await
                .view(&StockFilter::new(query, category), &pagination, 0);
            if cli.json {
                print_json(&view.rows)?;
            } else {
                print_stock(&view);
            }
        }
        Commands::Activity { limit } => {
            let page = load_page(backend).await;
            let view = page
                .read()
                .await
                .view(&StockFilter::default(), &Pagination::default(), limit);
            if cli.json {
                print_json(&view.activity)?;
            } else {
                for entry in &view.activity {
                    let sign = match entry.direction {
                        Direction::StockIn => '+',
                        Direction::StockOut => '-',
                    };
                    println!(
                        "{}  {:<24} {}{:<5} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M"),
                        entry.item_name,
                        sign,
                        entry.quantity,
                        entry.note
                    );
                }
            }
        }
        Commands::StockIn {
            item_id,
            quantity,
            note,
        } => adjust(backend, &item_id, quantity, Direction::StockIn, &note, cli.json).await?,
        Commands::OrderOut {
            item_id,
            quantity,
            note,
        } => adjust(backend, &item_id, quantity, Direction::StockOut, &note, cli.json).await?,
        Commands::Search { query } => {
            let mut lookup = ItemLookup::new(backend);
            let options = lookup.on_input_change(&query, LookupTrigger::Input).await;
            if cli.json {
                print_json(&options)?;
            } else {
                for option in options {
                    println!(
                        "{:<14} {:<10} {}",
                        option.item.id.as_str(),
                        option.item_type.label(),
                        option.label
                    );
                }
            }
        }
        Commands::PlaceStock { place: id } => print_json(&place.stock_levels(&id).await?)?,
        Commands::LowStock { place: id } => print_json(&place.low_stock_items(&id).await?)?,
        Commands::Reorder { place: id } => print_json(&place.reorder_recommendations(&id).await?)?,
        Commands::Waste { place: id, days } => print_json(&place.waste_analysis(&id, days).await?)?,
        Commands::Items { place: id } => print_json(&place.inventory_items(&id).await?)?,
        Commands::Transactions { place: id, limit } => {
            print_json(&place.transactions(&id, limit).await?)?
        }
        Commands::Alerts { place: id } => {
            let alerts = place.alerts(&id).await?;
            if cli.json {
                print_json(&alerts)?;
            } else {
                for alert in &alerts {
                    println!(
                        "{:<14} {:<10} {}",
                        alert.id.as_str(),
                        alert.status.as_deref().unwrap_or("-"),
                        alert.message.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Commands::ResolveAlert { alert_id } => {
            let alert = place
                .resolve_alert(&alert_id)
                .await
                .with_context(|| format!("failed to resolve alert {alert_id}"))?;
            if cli.json {
                print_json(&alert)?;
            } else {
                println!("alert {} resolved", alert.id);
            }
        }
    }

    Ok(())
}

async fn load_page(backend: Arc<dyn StockBackend>) -> StockPage {
    let page = StockPage::new(backend);
    let outcomes = page.load().await;
    tracing::debug!(?outcomes, "page loaded");
    page
}

/// Stock rows carry the populated item; fall back to the catalogs for
/// items that have never been stocked.
async fn resolve_item(page: &StockPage, item_id: &ItemId) -> anyhow::Result<Item> {
    let stocked: Vec<Item> = page
        .read()
        .await
        .stock()
        .iter()
        .filter_map(|r| r.item.as_ref().and_then(|i| i.populated()))
        .cloned()
        .collect();
    if let Some(item) = find_by_id(&stocked, item_id) {
        return Ok(item.clone());
    }

    let catalog: Vec<Item> = search_items(page.backend().as_ref(), "")
        .await?
        .into_iter()
        .map(|o| o.item)
        .collect();
    find_by_id(&catalog, item_id)
        .cloned()
        .with_context(|| format!("no menu item or addon with id {item_id}"))
}

async fn adjust(
    backend: Arc<dyn StockBackend>,
    item_id: &ItemId,
    quantity: u32,
    direction: Direction,
    note: &str,
    json: bool,
) -> anyhow::Result<()> {
    let page = load_page(backend).await;
    let item = resolve_item(&page, item_id).await?;

    let coordinator = AdjustmentCoordinator::new(page.clone());
    let outcome = coordinator.adjust(&item, quantity, direction, note).await?;

    let state = page.read().await;
    let on_hand = state
        .stock()
        .iter()
        .find(|r| r.tracks(&item.id))
        .map(|r| r.on_hand());
    let view = state.view(&StockFilter::default(), &Pagination::default(), 0);

    if json {
        print_json(&AdjustmentReport {
            item_id: &item.id,
            phase: outcome.phase,
            notice: &outcome.notice,
            quantity: on_hand,
            summary: Summary::from(&view),
        })?;
    } else {
        println!("{}", outcome.notice);
        if let Some(on_hand) = on_hand {
            println!("{} on hand: {on_hand}", item.title);
        }
        println!();
        print_summary(&view);
    }

    if !outcome.is_confirmed() {
        bail!("{} was not recorded", direction);
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total_items: usize,
    total_units: u64,
    low_stock_count: usize,
    low_stock_threshold: u32,
    inventory_value: stockdesk_core::Money,
}

impl From<&StockView> for Summary {
    fn from(view: &StockView) -> Self {
        Self {
            total_items: view.totals.total_items,
            total_units: view.totals.total_units,
            low_stock_count: view.totals.low_stock_count,
            low_stock_threshold: view.low_stock_threshold,
            inventory_value: view.inventory_value,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdjustmentReport<'a> {
    item_id: &'a ItemId,
    phase: stockdesk_app::AdjustmentPhase,
    notice: &'a stockdesk_app::Notice,
    quantity: Option<u32>,
    summary: Summary,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(view: &StockView) {
    println!("Total items:      {}", view.totals.total_items);
    println!("Total units:      {}", view.totals.total_units);
    println!(
        "Low stock:        {} (below {})",
        view.totals.low_stock_count, view.low_stock_threshold
    );
    println!("Inventory value:  {}", view.inventory_value);
}

fn print_stock(view: &StockView) {
    println!(
        "{:<24} {:<10} {:>6} {:>6}  {:<5} {:>5}",
        "Item", "Type", "Qty", "Min", "Status", "Fill"
    );
    for row in &view.rows {
        println!(
            "{:<24} {:<10} {:>6} {:>6}  {:<5} {:>4.0}%",
            row.title,
            row.item_type.label(),
            row.quantity,
            row.min_stock,
            row.status.label(),
            row.fill_percent
        );
    }
    println!(
        "page {} of {} ({} matching)",
        view.page + 1,
        view.page_count.max(1),
        view.filtered_count
    );
}
