//! Capability traits consumed by the orchestrator.

use crate::{error::BoxError, upsert::MatchedPair};

///
/// UpsertHandler
///
/// Implementers provide the insert/update/delete operations as methods and
/// hand the whole set to [`Upsert::apply_with`](crate::upsert::Upsert::apply_with),
/// which composes them with the shared classification pass. The context
/// parameter `C` threads an auxiliary value (a store session, an audit
/// trail) through every operation; it defaults to `()` for handlers that
/// need none.
///
/// Operations run in fixed stage order — insert, update, delete — and a
/// failing operation aborts the remainder of the run.
///

pub trait UpsertHandler<E, S, C = ()> {
    type InsertResult;
    type UpdateResult;
    type DeleteResult;

    /// Insert one supplied item that matched nothing existing.
    fn insert(&mut self, ctx: &mut C, supplied: &S) -> Result<Self::InsertResult, BoxError>;

    /// Update from one matched existing/supplied pair.
    fn update(
        &mut self,
        ctx: &mut C,
        pair: &MatchedPair<E, S>,
    ) -> Result<Self::UpdateResult, BoxError>;

    /// Delete one existing item that no supplied item matched.
    fn delete(&mut self, ctx: &mut C, existing: &E) -> Result<Self::DeleteResult, BoxError>;
}
