//! Positional diffing of node trees.

use super::{Delta, Diff, Patch};

/// A node with ordered children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree<N> {
    pub node: N,
    pub children: Vec<Tree<N>>,
}

impl<N> Tree<N> {
    pub fn leaf(node: N) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    pub fn with_children(node: N, children: Vec<Tree<N>>) -> Self {
        Self { node, children }
    }
}

/// Change to one child position.
#[derive(Debug, Clone)]
pub enum ChildChange<N: Diff> {
    /// The child at `index` exists on both sides and changed.
    Update {
        index: usize,
        changes: TreeChangeSet<N>,
    },
    /// A new child at `index`; `changes` is its first-render change set.
    Insert {
        index: usize,
        changes: TreeChangeSet<N>,
    },
    /// The child at `index` no longer exists.
    Remove { index: usize },
}

/// Delta between two trees.
///
/// Children are matched by position. Unchanged children are omitted,
/// inserts only happen past the end of the previous children and removes
/// are listed from the last index down, so applying entries in order is
/// always valid.
#[derive(Debug, Clone)]
pub struct TreeChangeSet<N: Diff> {
    pub node: N::Changes,
    pub children: Vec<ChildChange<N>>,
}

// Written by hand: a derive would bound `N: PartialEq` instead of the
// node's change-set type, which the recursive fields need.
impl<N: Diff> PartialEq for ChildChange<N>
where
    N::Changes: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ChildChange::Update { index, changes },
                ChildChange::Update {
                    index: other_index,
                    changes: other_changes,
                },
            )
            | (
                ChildChange::Insert { index, changes },
                ChildChange::Insert {
                    index: other_index,
                    changes: other_changes,
                },
            ) => index == other_index && changes == other_changes,
            (ChildChange::Remove { index }, ChildChange::Remove { index: other_index }) => {
                index == other_index
            }
            _ => false,
        }
    }
}

impl<N: Diff> PartialEq for TreeChangeSet<N>
where
    N::Changes: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.children == other.children
    }
}

impl<N: Diff> Delta for TreeChangeSet<N> {
    fn is_empty(&self) -> bool {
        self.node.is_empty() && self.children.is_empty()
    }

    fn len(&self) -> usize {
        self.node.len()
            + self
                .children
                .iter()
                .map(|child| match child {
                    ChildChange::Update { changes, .. } | ChildChange::Insert { changes, .. } => {
                        changes.len()
                    }
                    ChildChange::Remove { .. } => 1,
                })
                .sum::<usize>()
    }
}

impl<N: Diff> Diff for Tree<N> {
    type Changes = TreeChangeSet<N>;

    fn diff(previous: Option<&Self>, next: &Self) -> Self::Changes {
        let Some(previous) = previous else {
            return TreeChangeSet {
                node: N::diff(None, &next.node),
                children: next
                    .children
                    .iter()
                    .enumerate()
                    .map(|(index, child)| ChildChange::Insert {
                        index,
                        changes: Tree::diff(None, child),
                    })
                    .collect(),
            };
        };

        if std::ptr::eq(previous, next) {
            return TreeChangeSet {
                node: N::diff(Some(&previous.node), &next.node),
                children: Vec::new(),
            };
        }

        let mut children = Vec::new();
        for (index, (old, new)) in previous.children.iter().zip(&next.children).enumerate() {
            let changes = Tree::diff(Some(old), new);
            if !changes.is_empty() {
                children.push(ChildChange::Update { index, changes });
            }
        }

        let shared = previous.children.len().min(next.children.len());
        for (offset, child) in next.children[shared..].iter().enumerate() {
            children.push(ChildChange::Insert {
                index: shared + offset,
                changes: Tree::diff(None, child),
            });
        }
        for index in (shared..previous.children.len()).rev() {
            children.push(ChildChange::Remove { index });
        }

        TreeChangeSet {
            node: N::diff(Some(&previous.node), &next.node),
            children,
        }
    }
}

impl<N: Patch> Patch for Tree<N> {
    fn blank() -> Self {
        Tree::leaf(N::blank())
    }

    fn patch(&mut self, changes: &Self::Changes) {
        self.node.patch(&changes.node);
        for child in &changes.children {
            match child {
                ChildChange::Update { index, changes } => {
                    if let Some(existing) = self.children.get_mut(*index) {
                        existing.patch(changes);
                    }
                }
                ChildChange::Insert { index, changes } => {
                    let mut fresh = Tree::blank();
                    fresh.patch(changes);
                    let at = (*index).min(self.children.len());
                    self.children.insert(at, fresh);
                }
                ChildChange::Remove { index } => {
                    if *index < self.children.len() {
                        self.children.remove(*index);
                    }
                }
            }
        }
    }
}
