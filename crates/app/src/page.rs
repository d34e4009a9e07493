//! Stock management page state.
//!
//! Three slots (stock, sales+restocks, settings) are fetched
//! independently and replaced wholesale. Everything shown on the page is
//! derived from those snapshots.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockdesk_client::StockBackend;
use stockdesk_core::{Money, RecordId, find_by_id};
use stockdesk_inventory::{
    ActivityEntry, Adjustment, ItemRef, ItemType, Pagination, RestockRecord, SaleRecord, Settings,
    StockFilter, StockRecord, StockStatus, StockTotals, apply_optimistic, build_activity_feed,
    compute_inventory_value, compute_totals, fill_percent,
};

use crate::coordinator::{AdjustmentPhase, AdjustmentTicket};
use crate::notice::Notice;

/// Request generations for one slot.
///
/// A response is applied only when no newer request for the same slot has
/// been applied already.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
struct Generation {
    issued: u64,
    applied: u64,
}

impl Generation {
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn accept(&mut self, token: u64) -> bool {
        if token <= self.applied {
            return false;
        }
        self.applied = token;
        true
    }
}

/// Settled adjustment phases kept for [`PageState::phase`]; older ones are
/// forgotten.
const SETTLED_HISTORY: usize = 64;

/// An adjustment whose backend request is still outstanding.
#[derive(Debug, Clone)]
struct PendingAdjustment {
    adjustment: Adjustment,
    /// Stock as it was just before this adjustment was applied.
    before: Arc<Vec<StockRecord>>,
    /// Stock generation applied at that point.
    stock_applied: u64,
}

/// What happened to one refresh request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer response for the same slot had already landed.
    Stale,
    /// The fetch failed; the slot keeps its last good value.
    Failed,
}

/// Both ledgers plus what is derived from them at fetch time.
#[derive(Debug, Clone, Default)]
pub struct Ledgers {
    pub sales: Arc<Vec<SaleRecord>>,
    pub restocks: Arc<Vec<RestockRecord>>,
    pub inventory_value: Money,
    pub feed: Arc<Vec<ActivityEntry>>,
}

impl Ledgers {
    pub fn from_records(sales: Vec<SaleRecord>, restocks: Vec<RestockRecord>) -> Self {
        let inventory_value = compute_inventory_value(&sales, &restocks);
        let feed = build_activity_feed(&sales, &restocks);
        Self {
            sales: Arc::new(sales),
            restocks: Arc::new(restocks),
            inventory_value,
            feed: Arc::new(feed),
        }
    }
}

/// One row of the current-stock table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub id: RecordId,
    pub title: String,
    pub item_type: ItemType,
    pub quantity: u32,
    pub min_stock: u32,
    pub status: StockStatus,
    pub fill_percent: f64,
    #[serde(skip)]
    pub item: Option<ItemRef>,
}

impl StockRow {
    fn from_record(record: &StockRecord, threshold: u32) -> Self {
        let quantity = record.on_hand();
        Self {
            id: record.id.clone(),
            title: record.display_title(),
            item_type: record.item_type,
            quantity,
            min_stock: threshold,
            status: StockStatus::of(quantity, Some(threshold)),
            fill_percent: fill_percent(quantity, Some(threshold)),
            item: record.item.clone(),
        }
    }
}

/// Everything the page renders, computed from one consistent state read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    pub totals: StockTotals,
    pub inventory_value: Money,
    pub low_stock_threshold: u32,
    pub filtered_count: usize,
    pub page: usize,
    pub page_count: usize,
    pub rows: Vec<StockRow>,
    pub activity: Vec<ActivityEntry>,
    pub loading: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Default)]
pub struct PageState {
    stock: Arc<Vec<StockRecord>>,
    ledgers: Ledgers,
    settings: Arc<Settings>,
    stock_gen: Generation,
    ledger_gen: Generation,
    settings_gen: Generation,
    stock_in_flight: usize,
    notice: Option<Notice>,
    pending: BTreeMap<u64, PendingAdjustment>,
    settled: BTreeMap<u64, AdjustmentPhase>,
    next_adjustment: u64,
}

impl PageState {
    pub fn stock(&self) -> Arc<Vec<StockRecord>> {
        Arc::clone(&self.stock)
    }

    pub fn ledgers(&self) -> &Ledgers {
        &self.ledgers
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.settings.effective_low_stock_threshold()
    }

    pub fn totals(&self) -> StockTotals {
        compute_totals(&self.stock, self.settings.low_stock_threshold)
    }

    pub fn inventory_value(&self) -> Money {
        self.ledgers.inventory_value
    }

    pub fn activity(&self) -> &[ActivityEntry] {
        &self.ledgers.feed
    }

    pub fn is_loading(&self) -> bool {
        self.stock_in_flight > 0
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// `Idle` for tickets this page never issued, or settled so long ago
    /// that they were forgotten.
    pub fn phase(&self, ticket: AdjustmentTicket) -> AdjustmentPhase {
        if self.pending.contains_key(&ticket.0) {
            return AdjustmentPhase::Optimistic;
        }
        self.settled
            .get(&ticket.0)
            .copied()
            .unwrap_or(AdjustmentPhase::Idle)
    }

    pub fn pending_adjustments(&self) -> usize {
        self.pending.len()
    }

    pub fn quantity_of(&self, record_id: &RecordId) -> Option<u32> {
        find_by_id(self.stock.as_slice(), record_id).map(StockRecord::on_hand)
    }

    pub fn view(
        &self,
        filter: &StockFilter,
        pagination: &Pagination,
        activity_limit: usize,
    ) -> StockView {
        let threshold = self.low_stock_threshold();
        let filtered = filter.apply(&self.stock);

        StockView {
            totals: self.totals(),
            inventory_value: self.inventory_value(),
            low_stock_threshold: threshold,
            filtered_count: filtered.len(),
            page: pagination.page(),
            page_count: pagination.page_count(filtered.len()),
            rows: pagination
                .slice(&filtered)
                .iter()
                .map(|r| StockRow::from_record(r, threshold))
                .collect(),
            activity: self.activity().iter().take(activity_limit).cloned().collect(),
            loading: self.is_loading(),
            notice: self.notice.clone(),
        }
    }

    pub(crate) fn begin_adjustment(&mut self, adjustment: &Adjustment) -> AdjustmentTicket {
        let before = Arc::clone(&self.stock);
        self.stock = Arc::new(apply_optimistic(&before, adjustment));

        self.next_adjustment += 1;
        self.pending.insert(
            self.next_adjustment,
            PendingAdjustment {
                adjustment: adjustment.clone(),
                before,
                stock_applied: self.stock_gen.applied,
            },
        );
        AdjustmentTicket(self.next_adjustment)
    }

    /// Put back the stock as it was before `ticket`, with every later
    /// still-pending adjustment re-applied on top. Does nothing once a
    /// stock response newer than the adjustment has been applied.
    pub(crate) fn roll_back(&mut self, ticket: AdjustmentTicket) -> bool {
        let Some(pending) = self.pending.get(&ticket.0) else {
            return false;
        };
        if pending.stock_applied != self.stock_gen.applied {
            return false;
        }

        let mut stock = Arc::clone(&pending.before);
        for (_, later) in self.pending.range_mut(ticket.0 + 1..) {
            later.before = Arc::clone(&stock);
            stock = Arc::new(apply_optimistic(&stock, &later.adjustment));
        }
        self.stock = stock;
        true
    }

    pub(crate) fn finish_adjustment(
        &mut self,
        ticket: AdjustmentTicket,
        phase: AdjustmentPhase,
        notice: Notice,
    ) {
        self.pending.remove(&ticket.0);
        self.settled.insert(ticket.0, phase);
        while self.settled.len() > SETTLED_HISTORY {
            self.settled.pop_first();
        }
        self.notice = Some(notice);
    }
}

/// Shared handle to the page: the backend plus the state behind a lock.
///
/// Cheap to clone; clones observe the same state.
#[derive(Clone)]
pub struct StockPage {
    backend: Arc<dyn StockBackend>,
    state: Arc<RwLock<PageState>>,
}

impl StockPage {
    pub fn new(backend: Arc<dyn StockBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(PageState::default())),
        }
    }

    pub fn backend(&self) -> &Arc<dyn StockBackend> {
        &self.backend
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, PageState> {
        self.state.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, PageState> {
        self.state.write().await
    }

    /// Initial load: stock, ledgers and settings concurrently. Each lands
    /// in its own slot in whatever order the responses arrive.
    pub async fn load(&self) -> [RefreshOutcome; 3] {
        let (stock, ledgers, settings) = tokio::join!(
            self.refresh_stock(),
            self.refresh_ledgers(),
            self.refresh_settings(),
        );
        [stock, ledgers, settings]
    }

    pub async fn refresh_stock(&self) -> RefreshOutcome {
        let token = {
            let mut state = self.write().await;
            state.stock_in_flight += 1;
            state.stock_gen.issue()
        };

        let result = self.backend.list_stock().await;

        let mut state = self.write().await;
        state.stock_in_flight -= 1;
        match result {
            Ok(stock) => {
                if !state.stock_gen.accept(token) {
                    tracing::debug!(token, "discarding stale stock response");
                    return RefreshOutcome::Stale;
                }
                state.stock = Arc::new(stock);
                RefreshOutcome::Applied
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch stock");
                RefreshOutcome::Failed
            }
        }
    }

    /// Sales and restocks together; value and feed are recomputed only when
    /// both arrive.
    pub async fn refresh_ledgers(&self) -> RefreshOutcome {
        let token = self.write().await.ledger_gen.issue();

        let result = tokio::try_join!(self.backend.list_sales(), self.backend.list_restocks());

        match result {
            Ok((sales, restocks)) => {
                let ledgers = Ledgers::from_records(sales, restocks);
                let mut state = self.write().await;
                if !state.ledger_gen.accept(token) {
                    tracing::debug!(token, "discarding stale ledger response");
                    return RefreshOutcome::Stale;
                }
                state.ledgers = ledgers;
                RefreshOutcome::Applied
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch transactions");
                RefreshOutcome::Failed
            }
        }
    }

    pub async fn refresh_settings(&self) -> RefreshOutcome {
        let token = self.write().await.settings_gen.issue();

        match self.backend.get_settings().await {
            Ok(settings) => {
                let mut state = self.write().await;
                if !state.settings_gen.accept(token) {
                    return RefreshOutcome::Stale;
                }
                state.settings = Arc::new(settings);
                RefreshOutcome::Applied
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch settings");
                RefreshOutcome::Failed
            }
        }
    }
}
