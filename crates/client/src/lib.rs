//! `stockdesk-client`
//!
//! **Responsibility:** talk to the stock backend over HTTP.
//!
//! This crate provides:
//! - the `StockBackend` seam (list/create/search/settings)
//! - the `PlaceInventory` seam (place reports, alerts)
//! - a reqwest-backed `HttpBackend`
//! - request payloads for stock-in / order-out
//! - item lookup across the menu-item and addon catalogs
//! - an in-memory backend for tests and demos
//!
//! The backend is the authority for every stock level; nothing here
//! persists or validates stock.

pub mod backend;
pub mod error;
pub mod http;
pub mod lookup;
pub mod memory;
pub mod payload;

pub use backend::{PlaceInventory, StockBackend};
pub use error::ClientError;
pub use http::{DEFAULT_TIMEOUT, HttpBackend};
pub use lookup::{ItemLookup, ItemOption, LookupTrigger, option_label, search_items};
pub use memory::InMemoryBackend;
pub use payload::{CreateRestock, CreateSale, UpdateAlert};
