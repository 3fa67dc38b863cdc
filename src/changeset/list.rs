//! Element-level edits for collection-valued properties.
//!
//! Property sets compare collections as a whole: a segment list that gained
//! one entry is reported as "the list changed". A rendering layer that wants
//! to avoid re-creating every native element can turn the old and new
//! collections into positional edits with [`edits`].

/// One positional edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit<T> {
    Replace { index: usize, value: T },
    Insert { index: usize, value: T },
    Remove { index: usize },
}

/// Positional edits turning `previous` into `next`.
///
/// Equal elements at the same position produce nothing. Inserts are
/// appended past the shared length; removes run from the last index down.
pub fn edits<T: Clone + PartialEq>(previous: &[T], next: &[T]) -> Vec<ListEdit<T>> {
    let mut edits: Vec<ListEdit<T>> = previous
        .iter()
        .zip(next)
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(index, (_, new))| ListEdit::Replace {
            index,
            value: new.clone(),
        })
        .collect();

    let shared = previous.len().min(next.len());
    edits.extend(
        next.iter()
            .enumerate()
            .skip(shared)
            .map(|(index, value)| ListEdit::Insert {
                index,
                value: value.clone(),
            }),
    );
    edits.extend((shared..previous.len()).rev().map(|index| ListEdit::Remove { index }));
    edits
}

/// Apply edits produced by [`edits`] in order.
pub fn apply<T: Clone>(list: &mut Vec<T>, edits: &[ListEdit<T>]) {
    for edit in edits {
        match edit {
            ListEdit::Replace { index, value } => {
                if let Some(slot) = list.get_mut(*index) {
                    *slot = value.clone();
                }
            }
            ListEdit::Insert { index, value } => {
                let at = (*index).min(list.len());
                list.insert(at, value.clone());
            }
            ListEdit::Remove { index } => {
                if *index < list.len() {
                    list.remove(*index);
                }
            }
        }
    }
}
