//! Place-scoped inventory reports and alerts.
//!
//! The backend computes these per place; their bodies are passed through
//! as JSON. Alerts are typed because they can be resolved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use stockdesk_core::RecordId;

/// Look-back window for waste analysis when none is given.
pub const DEFAULT_WASTE_DAYS: u32 = 30;

/// Number of inventory transactions fetched when none is given.
pub const DEFAULT_TRANSACTION_LIMIT: u32 = 20;

pub const ALERT_RESOLVED: &str = "resolved";

/// Report body as the backend returns it.
pub type PlaceReport = Value;

/// Stock alert raised by the backend for a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Alert {
    pub fn new(id: impl Into<RecordId>, status: &str, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Some(status.to_string()),
            message: Some(message.into()),
            extra: Map::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status.as_deref() == Some(ALERT_RESOLVED)
    }

    /// Copy marked resolved.
    pub fn resolved(mut self) -> Self {
        self.status = Some(ALERT_RESOLVED.to_string());
        self
    }
}
