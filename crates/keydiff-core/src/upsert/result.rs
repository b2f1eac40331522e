use serde::{Deserialize, Serialize};

///
/// MatchedPair
///
/// One existing item and one supplied item sharing a key. Both sides are
/// present by construction; duplicate keys on both sides produce one pair
/// per cross-product combination.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchedPair<E, S> {
    pub existing: E,
    pub supplied: S,
}

///
/// Classification
///
/// Three disjoint, collectively exhaustive partitions over the two inputs:
/// every existing item lands in `unmatched_existing` or on the existing side
/// of `matched`, and every supplied item lands in `unmatched_supplied` or on
/// the supplied side of `matched`. No item is dropped and none appears in
/// two partitions.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Classification<E, S> {
    pub unmatched_existing: Vec<E>,
    pub unmatched_supplied: Vec<S>,
    pub matched: Vec<MatchedPair<E, S>>,
}

impl<E, S> Classification<E, S> {
    /// Row counts per partition.
    #[must_use]
    pub const fn stats(&self) -> UpsertStats {
        UpsertStats {
            inserts: self.unmatched_supplied.len() as u64,
            updates: self.matched.len() as u64,
            deletes: self.unmatched_existing.len() as u64,
        }
    }

    /// Returns `true` when every partition is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.unmatched_existing.is_empty()
            && self.unmatched_supplied.is_empty()
            && self.matched.is_empty()
    }

    // Render a compact one-line description for debug logging.
    pub(crate) fn debug_summary(&self) -> String {
        let stats = self.stats();

        format!(
            "inserts={} updates={} deletes={}",
            stats.inserts, stats.updates, stats.deletes
        )
    }

    // Relabel partitions by the operations that consume them.
    pub(crate) fn into_result(self) -> UpsertResult<E, S> {
        UpsertResult {
            inserted: self.unmatched_supplied,
            updated: self.matched,
            deleted: self.unmatched_existing,
        }
    }
}

///
/// UpsertStats
///
/// Row counts for one classification or apply outcome.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct UpsertStats {
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
}

impl UpsertStats {
    /// Total number of classified rows.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.inserts
            .saturating_add(self.updates)
            .saturating_add(self.deletes)
    }
}

///
/// UpsertResult
///
/// The three partitions after the callbacks have run, named by the
/// operation that consumed them. Immutable once assembled; owns no external
/// resources.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UpsertResult<E, S> {
    pub inserted: Vec<S>,
    pub updated: Vec<MatchedPair<E, S>>,
    pub deleted: Vec<E>,
}

impl<E, S> UpsertResult<E, S> {
    /// Row counts per partition.
    #[must_use]
    pub const fn stats(&self) -> UpsertStats {
        UpsertStats {
            inserts: self.inserted.len() as u64,
            updates: self.updated.len() as u64,
            deletes: self.deleted.len() as u64,
        }
    }

    /// Returns `true` when no operation was performed.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}

///
/// Captured
///
/// One partition entry paired with the value its callback returned.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Captured<T, R> {
    pub item: T,
    pub result: R,
}

///
/// CapturedUpsert
///
/// Result-capturing variant of [`UpsertResult`]: every partition entry
/// carries the return value of the callback that consumed it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CapturedUpsert<E, S, I, U, D> {
    pub inserted: Vec<Captured<S, I>>,
    pub updated: Vec<Captured<MatchedPair<E, S>, U>>,
    pub deleted: Vec<Captured<E, D>>,
}

impl<E, S, I, U, D> CapturedUpsert<E, S, I, U, D> {
    /// Row counts per partition.
    #[must_use]
    pub const fn stats(&self) -> UpsertStats {
        UpsertStats {
            inserts: self.inserted.len() as u64,
            updates: self.updated.len() as u64,
            deletes: self.deleted.len() as u64,
        }
    }

    /// Drop the captured results, keeping the partitions.
    #[must_use]
    pub fn into_result(self) -> UpsertResult<E, S> {
        UpsertResult {
            inserted: self.inserted.into_iter().map(|c| c.item).collect(),
            updated: self.updated.into_iter().map(|c| c.item).collect(),
            deleted: self.deleted.into_iter().map(|c| c.item).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_round_trip_through_serde() {
        let result = UpsertResult {
            inserted: vec![(3u8, "new")],
            updated: vec![MatchedPair {
                existing: (2u8, "old"),
                supplied: (2u8, "fresh"),
            }],
            deleted: vec![(1u8, "stale")],
        };

        let json = serde_json::to_string(&result).expect("result should serialize");
        let decoded: UpsertResult<(u8, &str), (u8, &str)> =
            serde_json::from_str(&json).expect("result should deserialize");

        assert_eq!(decoded, result);
        assert_eq!(
            decoded.stats(),
            UpsertStats {
                inserts: 1,
                updates: 1,
                deletes: 1,
            }
        );
    }

    #[test]
    fn stats_total_saturates_instead_of_wrapping() {
        let stats = UpsertStats {
            inserts: u64::MAX,
            updates: 1,
            deletes: 1,
        };

        assert_eq!(stats.total(), u64::MAX);
    }
}
