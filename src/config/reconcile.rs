//! Keyed list reconciliation.
//!
//! Settings edits arrive as a whole replacement tree, but the in-memory
//! tree must keep its entries alive in place so observers holding on to
//! them see updates rather than stale copies. [`sync_keyed`] merges a
//! source list into a target list by key in three phases: add entries the
//! target is missing, drop entries the source no longer has, then reorder
//! to the source's order and field-copy into the surviving entries.

/// An entry addressable by a stable key within its list.
pub trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;
}

/// Merge `source` into `target` by key, mutating surviving entries in
/// place via `copy`. Entry order follows `source` afterwards.
pub fn sync_keyed<T, F>(target: &mut Vec<T>, source: &[T], copy: F)
where
    T: Keyed + Clone,
    F: Fn(&mut T, &T),
{
    for s in source {
        if !target.iter().any(|t| t.key() == s.key()) {
            target.push(s.clone());
        }
    }
    target.retain(|t| source.iter().any(|s| s.key() == t.key()));

    // Both lists now hold the same key set (assuming unique keys), so a
    // positional move per source entry restores the source's order.
    if target.len() == source.len() {
        for (i, s) in source.iter().enumerate() {
            if let Some(j) = target.iter().position(|t| t.key() == s.key()) {
                if j != i {
                    let entry = target.remove(j);
                    target.insert(i, entry);
                }
            }
        }
    }

    for t in target.iter_mut() {
        if let Some(s) = source.iter().find(|s| s.key() == t.key()) {
            copy(t, s);
        }
    }
}
