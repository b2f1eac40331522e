//! Metrics sink boundary.
//!
//! Orchestrator logic MUST NOT write to obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink; this
//! module is the only bridge between execution logic and the metrics state.

use crate::{obs::metrics, upsert::Stage};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    ClassifyFinish {
        inserts: u64,
        updates: u64,
        deletes: u64,
    },
    UpsertFinish {
        inserts: u64,
        updates: u64,
        deletes: u64,
    },
    CallbackError {
        stage: Stage,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ClassifyFinish {
                inserts,
                updates,
                deletes,
            } => {
                metrics::with_state_mut(|m| {
                    m.classify_calls = m.classify_calls.saturating_add(1);
                    m.classified_inserts = m.classified_inserts.saturating_add(inserts);
                    m.classified_updates = m.classified_updates.saturating_add(updates);
                    m.classified_deletes = m.classified_deletes.saturating_add(deletes);
                });
            }

            MetricsEvent::UpsertFinish {
                inserts,
                updates,
                deletes,
            } => {
                metrics::with_state_mut(|m| {
                    m.upserts_applied = m.upserts_applied.saturating_add(1);
                    m.rows_inserted = m.rows_inserted.saturating_add(inserts);
                    m.rows_updated = m.rows_updated.saturating_add(updates);
                    m.rows_deleted = m.rows_deleted.saturating_add(deletes);
                });
            }

            MetricsEvent::CallbackError { .. } => {
                metrics::with_state_mut(|m| {
                    m.callback_errors = m.callback_errors.saturating_add(1);
                });
            }
        }
    }
}

/// Install `sink` for the duration of `f` on this thread, then restore the
/// global sink. Intended for tests and embedders that scrape events.
pub fn with_sink_override<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = Some(sink));
    let out = f();
    SINK_OVERRIDE.with(|cell| *cell.borrow_mut() = None);

    out
}

// Dispatch one event to the scoped sink, falling back to the global sink.
pub(crate) fn record(event: MetricsEvent) {
    let scoped = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match scoped {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}
