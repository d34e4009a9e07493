//! `stockdesk-core` — shared building blocks.
//!
//! Identifiers, money and the domain error type. No IO.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use entity::{Entity, find_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, PlaceId, RecordId};
pub use money::{CURRENCY, Money};
