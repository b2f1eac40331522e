//! Keyed full outer join over two in-memory slices.
//!
//! Deterministic, pure logic. No IO, no clocks, no stores.

use std::{collections::HashMap, hash::Hash};

///
/// KeyGroup
///
/// Per-key index buckets for the two join sides. Bucket order equals input
/// order; a group is only ever created by pushing an index, so at least one
/// bucket is always non-empty.
///

#[derive(Debug, Default)]
struct KeyGroup {
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Full outer join of two slices by extracted key.
///
/// For every key present in either input, `combine` is invoked once per
/// joined row: the full cross-product when the key appears on both sides
/// (m left items and n right items sharing one key yield m * n rows), or one
/// row per item with `None` on the absent side. Callers relying on unique
/// keys per side get the intuitive 1:1 pairing; duplicate keys get
/// cross-product semantics.
///
/// Output order follows the key union of an internal map and is therefore
/// unspecified; callers must not rely on it. Key extraction must be total
/// and pure — a panicking selector unwinds through the call with no partial
/// result. A non-standard key equality is expressed by wrapping the key in
/// a newtype with the desired `Eq`/`Hash` contract.
pub fn full_outer_join<L, R, K, T>(
    left: &[L],
    right: &[R],
    key_of_left: impl Fn(&L) -> K,
    key_of_right: impl Fn(&R) -> K,
    mut combine: impl FnMut(Option<&L>, Option<&R>, &K) -> T,
) -> Vec<T>
where
    K: Eq + Hash,
{
    let mut groups: HashMap<K, KeyGroup> = HashMap::with_capacity(left.len().max(right.len()));

    for (index, item) in left.iter().enumerate() {
        groups.entry(key_of_left(item)).or_default().left.push(index);
    }
    for (index, item) in right.iter().enumerate() {
        groups
            .entry(key_of_right(item))
            .or_default()
            .right
            .push(index);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (key, group) in &groups {
        if group.left.is_empty() {
            for &ri in &group.right {
                rows.push(combine(None, Some(&right[ri]), key));
            }
        } else if group.right.is_empty() {
            for &li in &group.left {
                rows.push(combine(Some(&left[li]), None, key));
            }
        } else {
            for &li in &group.left {
                for &ri in &group.right {
                    rows.push(combine(Some(&left[li]), Some(&right[ri]), key));
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    type Row = (Option<u32>, Option<u32>, u8);

    fn join(left: &[(u8, u32)], right: &[(u8, u32)]) -> Vec<Row> {
        full_outer_join(
            left,
            right,
            |l| l.0,
            |r| r.0,
            |l, r, key| (l.map(|item| item.1), r.map(|item| item.1), *key),
        )
    }

    #[test]
    fn join_of_empty_inputs_is_empty() {
        let rows = join(&[], &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn join_emits_one_sided_rows_for_unshared_keys() {
        let rows = join(&[(1, 10)], &[(2, 20)]);

        assert_eq!(rows.len(), 2);
        assert!(rows.contains(&(Some(10), None, 1)));
        assert!(rows.contains(&(None, Some(20), 2)));
    }

    #[test]
    fn join_pairs_shared_keys() {
        let rows = join(&[(1, 10), (2, 11)], &[(2, 20), (3, 21)]);

        assert_eq!(rows.len(), 3);
        assert!(rows.contains(&(Some(10), None, 1)));
        assert!(rows.contains(&(Some(11), Some(20), 2)));
        assert!(rows.contains(&(None, Some(21), 3)));
    }

    #[test]
    fn join_emits_cross_product_for_duplicate_keys() {
        let rows = join(&[(7, 1), (7, 2)], &[(7, 10), (7, 20), (7, 30)]);

        assert_eq!(rows.len(), 6);
        for l in [1, 2] {
            for r in [10, 20, 30] {
                assert!(rows.contains(&(Some(l), Some(r), 7)));
            }
        }
    }

    #[test]
    fn join_with_empty_left_emits_only_right_rows() {
        let rows = join(&[], &[(1, 10), (2, 20)]);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|(l, r, _)| l.is_none() && r.is_some()));
    }
}
