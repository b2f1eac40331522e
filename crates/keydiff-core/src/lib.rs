//! Core runtime for keydiff: the keyed full outer join, the reconciliation
//! orchestrator, and the observability surface exported via the `prelude`.

pub mod error;
pub mod join;
pub mod obs;
pub mod traits;
pub mod upsert;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No sinks, reports, or internal helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        error::{BoxError, Error, ErrorKind},
        join::full_outer_join,
        traits::UpsertHandler,
        upsert::{
            Captured, CapturedUpsert, Classification, MatchedPair, Stage, Upsert, UpsertResult,
            UpsertStats, upsert_with,
        },
    };
}
