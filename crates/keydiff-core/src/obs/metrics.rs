//! Thread-local metrics state and the report surface over it.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<EventReport> = RefCell::new(EventReport::default());
}

pub(crate) fn with_state_mut<T>(f: impl FnOnce(&mut EventReport) -> T) -> T {
    STATE.with(|cell| f(&mut cell.borrow_mut()))
}

/// Snapshot the accumulated metrics for this thread.
#[must_use]
pub fn metrics_report() -> EventReport {
    STATE.with(|cell| cell.borrow().clone())
}

/// Reset all accumulated metrics to zero.
pub fn metrics_reset_all() {
    STATE.with(|cell| *cell.borrow_mut() = EventReport::default());
}

///
/// EventReport
///
/// Accumulated operation counters. `classified_*` counts rows produced by
/// classification passes (including dry runs); `rows_*` counts rows whose
/// callbacks completed as part of a full apply.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub classify_calls: u64,
    pub classified_inserts: u64,
    pub classified_updates: u64,
    pub classified_deletes: u64,
    pub upserts_applied: u64,
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub callback_errors: u64,
}
