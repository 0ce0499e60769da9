//! Drag-and-drop reorder rule.
//!
//! The source takes the destination's former logical index: it is removed
//! and reinserted at the index the destination had before the removal.
//! For `[A, B, C]`, dragging `A` onto `C` yields `[B, C, A]` and dragging
//! `C` onto `A` yields `[C, A, B]`.

use super::TabId;

/// Move the element identified by `source` to the position of the element
/// identified by `destination`.
///
/// Returns `false` (and leaves `seq` untouched) if either id is missing or
/// they are equal.
pub fn reorder<T>(
    seq: &mut Vec<T>,
    id_of: impl Fn(&T) -> TabId,
    source: TabId,
    destination: TabId,
) -> bool {
    if source == destination {
        return false;
    }
    let Some(from) = seq.iter().position(|t| id_of(t) == source) else {
        return false;
    };
    // Captured before the removal shifts anything
    let Some(to) = seq.iter().position(|t| id_of(t) == destination) else {
        return false;
    };

    let item = seq.remove(from);
    seq.insert(to, item);
    true
}

/// Convenience form over a plain id sequence.
pub fn reordered(ids: &[TabId], source: TabId, destination: TabId) -> Vec<TabId> {
    let mut out = ids.to_vec();
    reorder(&mut out, |id| *id, source, destination);
    out
}
