//! A renderable node: content, style and layout categories.

use super::property::{diff, ChangeSet, PropertySet};
use super::{Delta, Diff, Patch};

/// Property category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Content,
    Style,
    Layout,
}

/// Declarative description of one node, split by category.
///
/// Categories are diffed independently; a tag of one category is never
/// compared against another category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node<C, S = (), L = ()> {
    pub content: C,
    pub style: S,
    pub layout: L,
}

impl<C, S, L> Node<C, S, L>
where
    C: PropertySet,
    S: PropertySet,
    L: PropertySet,
{
    pub fn new(content: C, style: S, layout: L) -> Self {
        Self {
            content,
            style,
            layout,
        }
    }
}

/// Change sets of the three categories of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeChangeSet<C: PropertySet, S: PropertySet, L: PropertySet> {
    pub content: ChangeSet<C>,
    pub style: ChangeSet<S>,
    pub layout: ChangeSet<L>,
}

impl<C, S, L> NodeChangeSet<C, S, L>
where
    C: PropertySet,
    S: PropertySet,
    L: PropertySet,
{
    /// Categories holding at least one change, in content/style/layout order.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::with_capacity(3);
        if !self.content.is_empty() {
            categories.push(Category::Content);
        }
        if !self.style.is_empty() {
            categories.push(Category::Style);
        }
        if !self.layout.is_empty() {
            categories.push(Category::Layout);
        }
        categories
    }
}

impl<C, S, L> Delta for NodeChangeSet<C, S, L>
where
    C: PropertySet,
    S: PropertySet,
    L: PropertySet,
{
    fn is_empty(&self) -> bool {
        self.content.is_empty() && self.style.is_empty() && self.layout.is_empty()
    }

    fn len(&self) -> usize {
        self.content.len() + self.style.len() + self.layout.len()
    }
}

impl<C, S, L> Diff for Node<C, S, L>
where
    C: PropertySet,
    S: PropertySet,
    L: PropertySet,
{
    type Changes = NodeChangeSet<C, S, L>;

    fn diff(previous: Option<&Self>, next: &Self) -> Self::Changes {
        NodeChangeSet {
            content: diff(previous.map(|node| &node.content), &next.content),
            style: diff(previous.map(|node| &node.style), &next.style),
            layout: diff(previous.map(|node| &node.layout), &next.layout),
        }
    }
}

impl<C, S, L> Patch for Node<C, S, L>
where
    C: PropertySet,
    S: PropertySet,
    L: PropertySet,
{
    fn blank() -> Self {
        Self::default()
    }

    fn patch(&mut self, changes: &Self::Changes) {
        self.content.patch(&changes.content);
        self.style.patch(&changes.style);
        self.layout.patch(&changes.layout);
    }
}
