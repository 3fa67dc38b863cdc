//! Schema-scoped property sets and their change sets.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;

use super::Delta;

/// One category of a node's declarative configuration.
///
/// Each implementor fixes a closed enumeration of tags (its schema) and a
/// closed enumeration of property values, one variant per tag. Every field
/// is optional: an absent value means "rendering layer default".
///
/// Values must have reflexive equality so that diffing a set against a
/// copy of itself is always empty. Floating-point values need a wrapper
/// with total equality (for instance comparing `to_bits()`).
///
/// Implementations are normally generated with [`property_set!`](crate::property_set).
pub trait PropertySet: Clone + Eq + Default + fmt::Debug + Send + 'static {
    /// Closed enumeration of the tags this set supports.
    type Tag: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Closed enumeration of tagged values.
    type Property: Clone + Eq + fmt::Debug + Send + 'static;

    /// Every tag of the schema, in schema order.
    const TAGS: &'static [Self::Tag];

    /// Tag carried by a property value.
    fn tag_of(property: &Self::Property) -> Self::Tag;

    /// Current value for a tag, if any.
    fn get(&self, tag: Self::Tag) -> Option<Self::Property>;

    /// Whether a value is present for a tag.
    fn is_set(&self, tag: Self::Tag) -> bool;

    /// Whether `self` and `other` hold different values for a tag.
    fn differs(&self, other: &Self, tag: Self::Tag) -> bool;

    /// Store a value under its tag.
    fn set(&mut self, property: Self::Property);

    /// Clear the value for a tag.
    fn unset(&mut self, tag: Self::Tag);

    /// Replay a single change entry.
    fn apply_change(&mut self, change: &Change<Self>) {
        match change {
            Change::Set(property) => self.set(property.clone()),
            Change::Unset(tag) => self.unset(*tag),
        }
    }
}

/// A single change entry for one tag.
#[derive(Clone, PartialEq)]
pub enum Change<P: PropertySet> {
    /// The tag now holds this value.
    Set(P::Property),
    /// The tag no longer holds a value.
    Unset(P::Tag),
}

impl<P: PropertySet> Change<P> {
    /// Tag this entry refers to.
    pub fn tag(&self) -> P::Tag {
        match self {
            Change::Set(property) => P::tag_of(property),
            Change::Unset(tag) => *tag,
        }
    }

    /// New value, `None` for an unset entry.
    pub fn value(&self) -> Option<&P::Property> {
        match self {
            Change::Set(property) => Some(property),
            Change::Unset(_) => None,
        }
    }
}

impl<P: PropertySet> fmt::Debug for Change<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Set(property) => write!(f, "Set({:?})", property),
            Change::Unset(tag) => write!(f, "Unset({:?})", tag),
        }
    }
}

/// Whether a single value changed, and to what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyChange<T> {
    NoChange,
    Change(T),
}

impl<T> PropertyChange<T> {
    /// Compare an old and a new value.
    pub fn between(old: &T, new: &T) -> Self
    where
        T: PartialEq + Clone,
    {
        if old == new {
            PropertyChange::NoChange
        } else {
            PropertyChange::Change(new.clone())
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, PropertyChange::Change(_))
    }

    pub fn changed_value(self) -> Option<T> {
        match self {
            PropertyChange::NoChange => None,
            PropertyChange::Change(value) => Some(value),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PropertyChange<U> {
        match self {
            PropertyChange::NoChange => PropertyChange::NoChange,
            PropertyChange::Change(value) => PropertyChange::Change(f(value)),
        }
    }
}

/// Ordered list of the entries that changed for one property set.
///
/// Entries follow schema order. Tags that do not appear did not change.
#[derive(Clone, PartialEq)]
pub struct ChangeSet<P: PropertySet> {
    changes: Vec<Change<P>>,
}

impl<P: PropertySet> ChangeSet<P> {
    pub fn empty() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change<P>> {
        self.changes.iter()
    }

    /// Entry for a tag, if it changed.
    pub fn get(&self, tag: P::Tag) -> Option<&Change<P>> {
        self.changes.iter().find(|change| change.tag() == tag)
    }

    pub fn contains(&self, tag: P::Tag) -> bool {
        self.get(tag).is_some()
    }

    /// Look a tag up as "no change" or "change to value" (`None` = unset).
    pub fn lookup(&self, tag: P::Tag) -> PropertyChange<Option<&P::Property>> {
        match self.get(tag) {
            Some(change) => PropertyChange::Change(change.value()),
            None => PropertyChange::NoChange,
        }
    }

    /// Values of every `Set` entry, in schema order.
    pub fn properties(&self) -> impl Iterator<Item = &P::Property> {
        self.changes.iter().filter_map(Change::value)
    }

    pub fn into_vec(self) -> Vec<Change<P>> {
        self.changes
    }
}

impl<P: PropertySet> Default for ChangeSet<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P: PropertySet> fmt::Debug for ChangeSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.changes.iter()).finish()
    }
}

impl<P: PropertySet> Delta for ChangeSet<P> {
    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn len(&self) -> usize {
        self.changes.len()
    }
}

impl<'a, P: PropertySet> IntoIterator for &'a ChangeSet<P> {
    type Item = &'a Change<P>;
    type IntoIter = std::slice::Iter<'a, Change<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl<P: PropertySet> FromIterator<Change<P>> for ChangeSet<P> {
    fn from_iter<I: IntoIterator<Item = Change<P>>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// Compute the change set from `previous` to `next`.
///
/// Walks every tag of the schema. Without a previous set (first render)
/// every tag holding a value in `next` is reported.
pub fn diff<P: PropertySet>(previous: Option<&P>, next: &P) -> ChangeSet<P> {
    let Some(previous) = previous else {
        return P::TAGS
            .iter()
            .filter_map(|tag| next.get(*tag))
            .map(Change::Set)
            .collect();
    };

    if std::ptr::eq(previous, next) {
        return ChangeSet::empty();
    }

    P::TAGS
        .iter()
        .filter(|tag| previous.differs(next, **tag))
        .map(|tag| match next.get(*tag) {
            Some(property) => Change::Set(property),
            None => Change::Unset(*tag),
        })
        .collect()
}

/// Empty category, for nodes without style or layout properties.
impl PropertySet for () {
    type Tag = Infallible;
    type Property = Infallible;

    const TAGS: &'static [Infallible] = &[];

    fn tag_of(property: &Infallible) -> Infallible {
        match *property {}
    }

    fn get(&self, tag: Infallible) -> Option<Infallible> {
        match tag {}
    }

    fn is_set(&self, tag: Infallible) -> bool {
        match tag {}
    }

    fn differs(&self, _other: &Self, tag: Infallible) -> bool {
        match tag {}
    }

    fn set(&mut self, property: Infallible) {
        match property {}
    }

    fn unset(&mut self, tag: Infallible) {
        match tag {}
    }
}
