//! Reconciliation orchestrator: input validation, one shared classification
//! pass, and the calling conventions applied over it.

mod result;

pub use result::{Captured, CapturedUpsert, Classification, MatchedPair, UpsertResult, UpsertStats};

use crate::{
    error::{Argument, BoxError, Error},
    join::full_outer_join,
    obs::sink::{self, MetricsEvent},
    traits::UpsertHandler,
};
use derive_more::Display;
use std::{hash::Hash, marker::PhantomData};

type KeyFn<T, K> = Box<dyn Fn(&T) -> K>;

///
/// Stage
///
/// Callback stages in fixed execution order.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Stage {
    #[display("insert")]
    Insert,

    #[display("update")]
    Update,

    #[display("delete")]
    Delete,
}

///
/// Upsert
///
/// Reconciliation orchestrator. The two collections are snapshotted exactly
/// once, when set; terminal methods validate every required input eagerly,
/// classify in one shared pass, then run the caller's operations in fixed
/// stage order — insert, update, delete. Order within a stage follows the
/// unordered key union and is unspecified.
///
/// A failing callback aborts the remaining invocations and propagates; rows
/// already applied are not rolled back here. Rollback, where wanted, is the
/// caller's transaction around the whole call.
///

pub struct Upsert<E, S, K> {
    existing: Option<Vec<E>>,
    supplied: Option<Vec<S>>,
    key_of_existing: Option<KeyFn<E, K>>,
    key_of_supplied: Option<KeyFn<S, K>>,
    debug: bool,
}

impl<E, S, K> Default for Upsert<E, S, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S, K> Upsert<E, S, K> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            existing: None,
            supplied: None,
            key_of_existing: None,
            key_of_supplied: None,
            debug: false,
        }
    }

    /// Snapshot the existing side. The iterator is consumed exactly once.
    #[must_use]
    pub fn existing(mut self, items: impl IntoIterator<Item = E>) -> Self {
        self.existing = Some(items.into_iter().collect());
        self
    }

    /// Snapshot the supplied side. The iterator is consumed exactly once.
    #[must_use]
    pub fn supplied(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.supplied = Some(items.into_iter().collect());
        self
    }

    /// Set the key extractor for existing items.
    #[must_use]
    pub fn key_of_existing(mut self, key_of: impl Fn(&E) -> K + 'static) -> Self {
        self.key_of_existing = Some(Box::new(key_of));
        self
    }

    /// Set the key extractor for supplied items.
    #[must_use]
    pub fn key_of_supplied(mut self, key_of: impl Fn(&S) -> K + 'static) -> Self {
        self.key_of_supplied = Some(Box::new(key_of));
        self
    }

    /// Enable verbose classification logging.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }
}

impl<E, S, K> Upsert<E, S, K>
where
    E: Clone,
    S: Clone,
    K: Eq + Hash,
{
    // ======================================================================
    // Terminal operations
    // ======================================================================

    /// Classify without invoking any callbacks.
    pub fn classify(self) -> Result<Classification<E, S>, Error> {
        Ok(self.into_inputs()?.classify())
    }

    /// Apply per-item callbacks with no captured results.
    pub fn apply(
        self,
        on_insert: impl FnMut(&S) -> Result<(), BoxError>,
        on_update: impl FnMut(&MatchedPair<E, S>) -> Result<(), BoxError>,
        on_delete: impl FnMut(&E) -> Result<(), BoxError>,
    ) -> Result<UpsertResult<E, S>, Error> {
        Ok(self
            .apply_returning(on_insert, on_update, on_delete)?
            .into_result())
    }

    /// Apply batch callbacks, each invoked exactly once with its whole
    /// partition — including empty partitions.
    pub fn apply_batch(
        self,
        on_insert: impl FnOnce(&[S]) -> Result<(), BoxError>,
        on_update: impl FnOnce(&[MatchedPair<E, S>]) -> Result<(), BoxError>,
        on_delete: impl FnOnce(&[E]) -> Result<(), BoxError>,
    ) -> Result<UpsertResult<E, S>, Error> {
        let inputs = self.into_inputs()?;
        let classification = inputs.classify();

        on_insert(&classification.unmatched_supplied)
            .map_err(|err| stage_error(Stage::Insert, err))?;
        on_update(&classification.matched).map_err(|err| stage_error(Stage::Update, err))?;
        on_delete(&classification.unmatched_existing)
            .map_err(|err| stage_error(Stage::Delete, err))?;

        let out = classification.into_result();
        record_applied(out.stats());

        Ok(out)
    }

    /// Apply per-item callbacks, pairing every partition entry with its
    /// callback's return value.
    pub fn apply_returning<RI, RU, RD>(
        self,
        on_insert: impl FnMut(&S) -> Result<RI, BoxError>,
        on_update: impl FnMut(&MatchedPair<E, S>) -> Result<RU, BoxError>,
        on_delete: impl FnMut(&E) -> Result<RD, BoxError>,
    ) -> Result<CapturedUpsert<E, S, RI, RU, RD>, Error> {
        let mut handler = FnHandler {
            on_insert,
            on_update,
            on_delete,
            _marker: PhantomData,
        };

        self.apply_with(&mut handler, &mut ())
    }

    /// Apply a handler's operations over the classification.
    ///
    /// This is the single composition point: every other calling convention
    /// is a thin adapter over it.
    pub fn apply_with<C, H>(
        self,
        handler: &mut H,
        ctx: &mut C,
    ) -> Result<CapturedUpsert<E, S, H::InsertResult, H::UpdateResult, H::DeleteResult>, Error>
    where
        H: UpsertHandler<E, S, C>,
    {
        let inputs = self.into_inputs()?;
        let Classification {
            unmatched_existing,
            unmatched_supplied,
            matched,
        } = inputs.classify();

        inputs.debug_log(format!("insert stage: {} rows", unmatched_supplied.len()));
        let mut inserted = Vec::with_capacity(unmatched_supplied.len());
        for item in unmatched_supplied {
            let result = handler
                .insert(ctx, &item)
                .map_err(|err| stage_error(Stage::Insert, err))?;
            inserted.push(Captured { item, result });
        }

        inputs.debug_log(format!("update stage: {} rows", matched.len()));
        let mut updated = Vec::with_capacity(matched.len());
        for pair in matched {
            let result = handler
                .update(ctx, &pair)
                .map_err(|err| stage_error(Stage::Update, err))?;
            updated.push(Captured { item: pair, result });
        }

        inputs.debug_log(format!("delete stage: {} rows", unmatched_existing.len()));
        let mut deleted = Vec::with_capacity(unmatched_existing.len());
        for item in unmatched_existing {
            let result = handler
                .delete(ctx, &item)
                .map_err(|err| stage_error(Stage::Delete, err))?;
            deleted.push(Captured { item, result });
        }

        let out = CapturedUpsert {
            inserted,
            updated,
            deleted,
        };
        record_applied(out.stats());

        Ok(out)
    }

    // ======================================================================
    // Validation
    // ======================================================================

    // Check every required input, in declaration order, before any work.
    fn into_inputs(self) -> Result<UpsertInputs<E, S, K>, Error> {
        let Some(existing) = self.existing else {
            return Err(Error::MissingArgument(Argument::Existing));
        };
        let Some(supplied) = self.supplied else {
            return Err(Error::MissingArgument(Argument::Supplied));
        };
        let Some(key_of_existing) = self.key_of_existing else {
            return Err(Error::MissingArgument(Argument::KeyOfExisting));
        };
        let Some(key_of_supplied) = self.key_of_supplied else {
            return Err(Error::MissingArgument(Argument::KeyOfSupplied));
        };

        Ok(UpsertInputs {
            existing,
            supplied,
            key_of_existing,
            key_of_supplied,
            debug: self.debug,
        })
    }
}

/// Run a full reconciliation through `handler` in one call.
///
/// Convenience entry point for handler-style consumers; equivalent to
/// configuring an [`Upsert`] and finishing with
/// [`apply_with`](Upsert::apply_with).
pub fn upsert_with<E, S, K, C, H>(
    handler: &mut H,
    ctx: &mut C,
    existing: impl IntoIterator<Item = E>,
    supplied: impl IntoIterator<Item = S>,
    key_of_existing: impl Fn(&E) -> K + 'static,
    key_of_supplied: impl Fn(&S) -> K + 'static,
) -> Result<CapturedUpsert<E, S, H::InsertResult, H::UpdateResult, H::DeleteResult>, Error>
where
    E: Clone,
    S: Clone,
    K: Eq + Hash,
    H: UpsertHandler<E, S, C>,
{
    Upsert::new()
        .existing(existing)
        .supplied(supplied)
        .key_of_existing(key_of_existing)
        .key_of_supplied(key_of_supplied)
        .apply_with(handler, ctx)
}

///
/// UpsertInputs
///
/// Validated snapshot of the four data arguments.
///

struct UpsertInputs<E, S, K> {
    existing: Vec<E>,
    supplied: Vec<S>,
    key_of_existing: KeyFn<E, K>,
    key_of_supplied: KeyFn<S, K>,
    debug: bool,
}

impl<E, S, K> UpsertInputs<E, S, K>
where
    E: Clone,
    S: Clone,
    K: Eq + Hash,
{
    // Materialize the join once, then partition the rows.
    fn classify(&self) -> Classification<E, S> {
        let rows = full_outer_join(
            &self.existing,
            &self.supplied,
            &self.key_of_existing,
            &self.key_of_supplied,
            |existing, supplied, _key| (existing.cloned(), supplied.cloned()),
        );

        let mut out = Classification {
            unmatched_existing: Vec::new(),
            unmatched_supplied: Vec::new(),
            matched: Vec::new(),
        };
        for row in rows {
            match row {
                (Some(existing), Some(supplied)) => out.matched.push(MatchedPair {
                    existing,
                    supplied,
                }),
                (Some(existing), None) => out.unmatched_existing.push(existing),
                (None, Some(supplied)) => out.unmatched_supplied.push(supplied),
                // The join never emits a row without at least one side.
                (None, None) => {}
            }
        }

        let stats = out.stats();
        sink::record(MetricsEvent::ClassifyFinish {
            inserts: stats.inserts,
            updates: stats.updates,
            deletes: stats.deletes,
        });
        self.debug_log(format!("classified rows: {}", out.debug_summary()));

        out
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.debug {
            println!("[debug] {}", s.as_ref());
        }
    }
}

///
/// FnHandler
///
/// Closure-backed handler bridging the per-item conventions onto
/// [`Upsert::apply_with`].
///

struct FnHandler<FI, FU, FD, RI, RU, RD> {
    on_insert: FI,
    on_update: FU,
    on_delete: FD,
    _marker: PhantomData<(RI, RU, RD)>,
}

impl<E, S, FI, FU, FD, RI, RU, RD> UpsertHandler<E, S> for FnHandler<FI, FU, FD, RI, RU, RD>
where
    FI: FnMut(&S) -> Result<RI, BoxError>,
    FU: FnMut(&MatchedPair<E, S>) -> Result<RU, BoxError>,
    FD: FnMut(&E) -> Result<RD, BoxError>,
{
    type InsertResult = RI;
    type UpdateResult = RU;
    type DeleteResult = RD;

    fn insert(&mut self, _ctx: &mut (), supplied: &S) -> Result<RI, BoxError> {
        (self.on_insert)(supplied)
    }

    fn update(&mut self, _ctx: &mut (), pair: &MatchedPair<E, S>) -> Result<RU, BoxError> {
        (self.on_update)(pair)
    }

    fn delete(&mut self, _ctx: &mut (), existing: &E) -> Result<RD, BoxError> {
        (self.on_delete)(existing)
    }
}

// Record the callback failure, then wrap the caller's error.
fn stage_error(stage: Stage, source: BoxError) -> Error {
    sink::record(MetricsEvent::CallbackError { stage });

    Error::Callback { stage, source }
}

fn record_applied(stats: UpsertStats) {
    sink::record(MetricsEvent::UpsertFinish {
        inserts: stats.inserts,
        updates: stats.updates,
        deletes: stats.deletes,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn upsert_for(
        existing: Vec<(u8, &'static str)>,
        supplied: Vec<(u8, &'static str)>,
    ) -> Upsert<(u8, &'static str), (u8, &'static str), u8> {
        Upsert::new()
            .existing(existing)
            .supplied(supplied)
            .key_of_existing(|item: &(u8, &'static str)| item.0)
            .key_of_supplied(|item: &(u8, &'static str)| item.0)
    }

    #[test]
    fn classify_partitions_by_key() {
        let classification = upsert_for(
            vec![(1, "stale"), (2, "shared")],
            vec![(2, "fresh"), (3, "new")],
        )
        .classify()
        .expect("classification should succeed");

        assert_eq!(classification.unmatched_existing, vec![(1, "stale")]);
        assert_eq!(classification.unmatched_supplied, vec![(3, "new")]);
        assert_eq!(
            classification.matched,
            vec![MatchedPair {
                existing: (2, "shared"),
                supplied: (2, "fresh"),
            }]
        );
    }

    #[test]
    fn missing_arguments_are_reported_in_declaration_order() {
        let err = Upsert::<u8, u8, u8>::new()
            .classify()
            .expect_err("empty builder should be rejected");
        assert_eq!(err.to_string(), "missing required argument: existing");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = Upsert::<u8, u8, u8>::new()
            .existing(vec![1])
            .classify()
            .expect_err("builder without supplied should be rejected");
        assert_eq!(err.to_string(), "missing required argument: supplied");

        let err = Upsert::<u8, u8, u8>::new()
            .existing(vec![1])
            .supplied(vec![2])
            .classify()
            .expect_err("builder without key extractors should be rejected");
        assert_eq!(
            err.to_string(),
            "missing required argument: key_of_existing"
        );

        let err = Upsert::<u8, u8, u8>::new()
            .existing(vec![1])
            .supplied(vec![2])
            .key_of_existing(|item: &u8| *item)
            .classify()
            .expect_err("builder without supplied key extractor should be rejected");
        assert_eq!(
            err.to_string(),
            "missing required argument: key_of_supplied"
        );
    }

    #[test]
    fn apply_relabels_partitions_by_operation() {
        let result = upsert_for(vec![(1, "stale")], vec![(1, "fresh"), (9, "new")])
            .apply(|_| Ok(()), |_| Ok(()), |_| Ok(()))
            .expect("apply should succeed");

        assert_eq!(result.inserted, vec![(9, "new")]);
        assert_eq!(result.deleted, Vec::<(u8, &'static str)>::new());
        assert_eq!(result.updated.len(), 1);
        assert_eq!(
            result.stats(),
            UpsertStats {
                inserts: 1,
                updates: 1,
                deletes: 0,
            }
        );
        assert!(!result.is_noop());
    }

    #[test]
    fn empty_inputs_apply_as_noop() {
        let result = upsert_for(vec![], vec![])
            .apply(|_| Ok(()), |_| Ok(()), |_| Ok(()))
            .expect("apply over empty inputs should succeed");

        assert!(result.is_noop());
        assert_eq!(result.stats().total(), 0);
    }
}
