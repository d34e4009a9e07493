//! `stockdesk-app`
//!
//! **Responsibility:** the stock management session.
//!
//! This crate provides:
//! - page state: immutable snapshots of stock, ledgers and settings, with
//!   per-slot request generations so stale responses are dropped
//! - the adjustment coordinator (optimistic update, then authoritative refetch)
//! - environment configuration and the `stockdesk` command-line front end
//!
//! The backend remains the authority; local state is a cache rebuilt by
//! refetching.

pub mod config;
pub mod coordinator;
pub mod demo;
pub mod notice;
pub mod page;

pub use config::{AppConfig, ConfigError};
pub use coordinator::{AdjustmentCoordinator, AdjustmentOutcome, AdjustmentPhase, AdjustmentTicket};
pub use notice::{Notice, NoticeLevel};
pub use page::{Ledgers, PageState, RefreshOutcome, StockPage, StockRow, StockView};
