//! Change-set engine.
//!
//! Computes the minimal delta between two declarative descriptions so a
//! rendering layer only touches what changed. The engine is pure: it never
//! sees a rendering target, it only produces change-set values.
//!
//! # Levels
//!
//! - [`PropertySet`]: one category of one node (content, style or layout),
//!   diffed tag by tag into a [`ChangeSet`]
//! - [`Node`]: the three categories of one node, diffed independently
//! - [`Tree`]: a node with ordered children, diffed positionally
//! - [`list`]: optional element-level edits for collection-valued properties

pub mod list;
mod node;
mod property;
mod tree;

use std::fmt;

pub use node::{Category, Node, NodeChangeSet};
pub use property::{diff, Change, ChangeSet, PropertyChange, PropertySet};
pub use tree::{ChildChange, Tree, TreeChangeSet};

/// A change-set value: empty when nothing changed.
pub trait Delta {
    /// Whether applying this delta would be a no-op.
    fn is_empty(&self) -> bool;

    /// Number of individual property entries in this delta.
    fn len(&self) -> usize;
}

/// A declarative description that can be diffed against a previous one.
pub trait Diff: Clone + fmt::Debug + Send + 'static {
    /// The delta type produced by [`Diff::diff`].
    type Changes: Delta + Clone + fmt::Debug + Send + 'static;

    /// Compute the delta from `previous` to `next`.
    ///
    /// `None` for `previous` is the first render: every value present in
    /// `next` is reported as changed.
    fn diff(previous: Option<&Self>, next: &Self) -> Self::Changes;
}

/// A description that can replay its own deltas.
///
/// Used by value-level mirrors and by tests: patching `a` with
/// `diff(Some(&a), &b)` yields a value equal to `b`.
pub trait Patch: Diff {
    /// The value a rendering target starts from before its first render.
    fn blank() -> Self;

    /// Apply a delta in place.
    fn patch(&mut self, changes: &Self::Changes);
}

impl<P: PropertySet> Diff for P {
    type Changes = ChangeSet<P>;

    fn diff(previous: Option<&Self>, next: &Self) -> Self::Changes {
        property::diff(previous, next)
    }
}

impl<P: PropertySet> Patch for P {
    fn blank() -> Self {
        P::default()
    }

    fn patch(&mut self, changes: &Self::Changes) {
        for change in changes {
            self.apply_change(change);
        }
    }
}
