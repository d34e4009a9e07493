//! Manual stock adjustments.
//!
//! Each adjustment moves through `Idle → Optimistic → Confirmed | Reverted`:
//! the local snapshot is changed first, the backend is asked second, and a
//! refetch settles the final numbers either way. Adjustments are not
//! serialized against each other.

use serde::Serialize;

use stockdesk_client::{CreateRestock, CreateSale};
use stockdesk_core::{DomainError, DomainResult, RecordId, find_by_id};
use stockdesk_inventory::{Adjustment, Direction, Item, ItemRef};

use crate::notice::Notice;
use crate::page::{RefreshOutcome, StockPage};

/// Note attached to the per-row `+` / `−` buttons.
pub const MANUAL_IN_NOTE: &str = "Manual +";
pub const MANUAL_OUT_NOTE: &str = "Manual -";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentPhase {
    Idle,
    /// Applied locally, backend request outstanding.
    Optimistic,
    /// Backend accepted; state refetched.
    Confirmed,
    /// Backend rejected or unreachable; state refetched.
    Reverted,
}

/// Handle for looking up an adjustment's phase on the page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdjustmentTicket(pub(crate) u64);

impl AdjustmentTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentOutcome {
    pub ticket: AdjustmentTicket,
    pub phase: AdjustmentPhase,
    pub notice: Notice,
    /// Outcome of the reconciling stock refetch.
    pub refresh: RefreshOutcome,
}

impl AdjustmentOutcome {
    pub fn is_confirmed(&self) -> bool {
        self.phase == AdjustmentPhase::Confirmed
    }
}

#[derive(Clone)]
pub struct AdjustmentCoordinator {
    page: StockPage,
}

impl AdjustmentCoordinator {
    pub fn new(page: StockPage) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &StockPage {
        &self.page
    }

    /// Record a stock change for `item`.
    ///
    /// A quantity of zero counts as one, as the adjustment dialog does.
    /// Backend failures are reported in the outcome (and the page notice),
    /// never as `Err`.
    pub async fn adjust(
        &self,
        item: &Item,
        quantity: u32,
        direction: Direction,
        note: &str,
    ) -> DomainResult<AdjustmentOutcome> {
        let quantity = quantity.max(1);
        let adjustment = Adjustment::new(item.id.clone(), quantity, direction, note)?;

        let ticket = self.page.write().await.begin_adjustment(&adjustment);
        tracing::info!(
            ticket = ticket.id(),
            item_id = %item.id,
            quantity,
            direction = %direction,
            note,
            "optimistic stock adjustment"
        );

        let backend = self.page.backend();
        let result = match direction {
            Direction::StockIn => backend
                .create_restock(&CreateRestock::for_item(item, quantity))
                .await
                .map(|_| ()),
            Direction::StockOut => backend
                .create_sale(&CreateSale::for_item(item, quantity))
                .await
                .map(|_| ()),
        };

        let (phase, notice, refresh) = match result {
            Ok(()) => {
                let notice = Notice::success(match direction {
                    Direction::StockIn => Notice::STOCKED_IN,
                    Direction::StockOut => Notice::ORDERED_OUT,
                });
                self.page
                    .write()
                    .await
                    .finish_adjustment(ticket, AdjustmentPhase::Confirmed, notice.clone());

                let (refresh, _) =
                    tokio::join!(self.page.refresh_stock(), self.page.refresh_ledgers());
                (AdjustmentPhase::Confirmed, notice, refresh)
            }
            Err(err) => {
                tracing::error!(ticket = ticket.id(), error = %err, "adjustment failed");
                let notice = Notice::error(Notice::ADJUSTMENT_FAILED);
                let refresh = self.page.refresh_stock().await;

                let mut state = self.page.write().await;
                if refresh == RefreshOutcome::Failed && state.roll_back(ticket) {
                    tracing::warn!(
                        ticket = ticket.id(),
                        "stock refetch failed; restored prior stock"
                    );
                }
                state.finish_adjustment(ticket, AdjustmentPhase::Reverted, notice.clone());
                (AdjustmentPhase::Reverted, notice, refresh)
            }
        };

        Ok(AdjustmentOutcome {
            ticket,
            phase,
            notice,
            refresh,
        })
    }

    pub async fn stock_in(
        &self,
        item: &Item,
        quantity: u32,
        note: &str,
    ) -> DomainResult<AdjustmentOutcome> {
        self.adjust(item, quantity, Direction::StockIn, note).await
    }

    pub async fn order_out(
        &self,
        item: &Item,
        quantity: u32,
        note: &str,
    ) -> DomainResult<AdjustmentOutcome> {
        self.adjust(item, quantity, Direction::StockOut, note).await
    }

    /// One-unit change from a stock row's `+` / `−` button. The row must
    /// carry its populated item (the price is needed for the ledger).
    pub async fn nudge(
        &self,
        record_id: &RecordId,
        direction: Direction,
    ) -> DomainResult<AdjustmentOutcome> {
        let item = {
            let state = self.page.read().await;
            let stock = state.stock();
            let row = find_by_id(stock.as_slice(), record_id)
                .ok_or_else(|| DomainError::not_found(format!("stock row {record_id}")))?;
            match &row.item {
                Some(ItemRef::Populated(item)) => item.clone(),
                _ => {
                    return Err(DomainError::not_found(format!(
                        "item details for stock row {record_id}"
                    )));
                }
            }
        };

        let note = match direction {
            Direction::StockIn => MANUAL_IN_NOTE,
            Direction::StockOut => MANUAL_OUT_NOTE,
        };
        self.adjust(&item, 1, direction, note).await
    }
}
