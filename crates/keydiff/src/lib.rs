//! keydiff
//!
//! Keyed set reconciliation. Two collections — the items that already exist
//! and the items a caller supplies as desired state — are matched by an
//! arbitrary key and classified into insert, update, and delete groups,
//! then the caller's operations are applied per group in that order.
//!
//! The engine is pure and synchronous: it snapshots its inputs once,
//! classifies in memory, and causes no side effects beyond invoking the
//! caller's operations. Persistence, transactions, and retries belong to
//! the caller.
//!
//! ## Crate layout
//! - `core`: join engine, orchestrator, result types, and observability.
//!
//! The `prelude` module mirrors the surface used by typical callers.

pub use keydiff_core as core;

pub use crate::core::error::{BoxError, Error, ErrorKind};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        error::{BoxError, Error, ErrorKind},
        join::full_outer_join,
        traits::UpsertHandler,
        upsert::{
            Captured, CapturedUpsert, Classification, MatchedPair, Stage, Upsert, UpsertResult,
            UpsertStats, upsert_with,
        },
    };
}
