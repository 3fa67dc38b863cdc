//! Rendering boundary: where change sets leave the runtime.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::changeset::{Delta, Diff, Patch};
use crate::error::RuntimeError;

/// The external rendering layer.
///
/// Called once per render cycle with the delta between the previous and the
/// current view. An empty change set must be a no-op. Errors are reported
/// to the runtime error sink; the loop keeps going and the next cycle
/// renders from scratch.
pub trait RenderTarget<V: Diff>: Send + 'static {
    fn apply(&mut self, changes: &V::Changes) -> anyhow::Result<()>;
}

/// Target that discards every change set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTarget;

impl<V: Diff> RenderTarget<V> for NullTarget {
    fn apply(&mut self, _changes: &V::Changes) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Target keeping a value-level copy of the rendered view.
///
/// Clones share the same copy, so a test or host can keep one clone and
/// hand the other to the runtime.
pub struct Mirror<V> {
    view: Arc<Mutex<V>>,
}

impl<V: Patch> Mirror<V> {
    pub fn new() -> Self {
        Self {
            view: Arc::new(Mutex::new(V::blank())),
        }
    }

    /// Copy of the view as rendered so far.
    pub fn current(&self) -> V {
        self.view.lock().clone()
    }
}

impl<V: Patch> Default for Mirror<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Mirror<V> {
    fn clone(&self) -> Self {
        Self {
            view: Arc::clone(&self.view),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Mirror<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror").field("view", &*self.view.lock()).finish()
    }
}

impl<V: Patch> RenderTarget<V> for Mirror<V> {
    fn apply(&mut self, changes: &V::Changes) -> anyhow::Result<()> {
        self.view.lock().patch(changes);
        Ok(())
    }
}

/// Target backed by a closure. Build with [`from_fn`].
pub struct FnTarget<V, F> {
    apply: F,
    _view: PhantomData<fn(V)>,
}

/// Adapt a closure into a [`RenderTarget`].
pub fn from_fn<V, F>(apply: F) -> FnTarget<V, F>
where
    V: Diff,
    F: FnMut(&V::Changes) -> anyhow::Result<()> + Send + 'static,
{
    FnTarget {
        apply,
        _view: PhantomData,
    }
}

impl<V, F> RenderTarget<V> for FnTarget<V, F>
where
    V: Diff,
    F: FnMut(&V::Changes) -> anyhow::Result<()> + Send + 'static,
{
    fn apply(&mut self, changes: &V::Changes) -> anyhow::Result<()> {
        (self.apply)(changes)
    }
}

/// Holds the last successfully rendered view and diffs each new one
/// against it.
pub(crate) struct Renderer<V: Diff> {
    target: Box<dyn RenderTarget<V>>,
    previous: Option<V>,
}

impl<V: Diff> Renderer<V> {
    pub(crate) fn new(target: Box<dyn RenderTarget<V>>) -> Self {
        Self {
            target,
            previous: None,
        }
    }

    /// Diff `next` against the previous view and hand the delta to the
    /// target. Returns the number of entries applied.
    ///
    /// After a failed apply the previous view is forgotten, so the next
    /// cycle is a full first render.
    pub(crate) fn render(&mut self, next: V) -> Result<usize, RuntimeError> {
        let changes = V::diff(self.previous.as_ref(), &next);
        match self.target.apply(&changes) {
            Ok(()) => {
                self.previous = Some(next);
                Ok(changes.len())
            }
            Err(source) => {
                self.previous = None;
                Err(RuntimeError::Render { source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::ChangeSet;

    crate::property_set! {
        struct Label / LabelTag / LabelProperty {
            text: String => Text,
        }
    }

    fn label(text: &str) -> Label {
        Label {
            text: Some(text.into()),
        }
    }

    #[test]
    fn renderer_diffs_against_last_view() {
        let mirror = Mirror::<Label>::new();
        let mut renderer = Renderer::new(Box::new(mirror.clone()));

        assert_eq!(renderer.render(label("a")).ok(), Some(1));
        assert_eq!(renderer.render(label("a")).ok(), Some(0));
        assert_eq!(renderer.render(label("b")).ok(), Some(1));
        assert_eq!(mirror.current(), label("b"));
    }

    #[test]
    fn failed_apply_forces_full_render() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut fail_next = true;
        let target = {
            let seen = Arc::clone(&seen);
            from_fn::<Label, _>(move |changes: &ChangeSet<Label>| {
                if std::mem::take(&mut fail_next) {
                    anyhow::bail!("detached");
                }
                seen.lock().push(changes.clone());
                Ok(())
            })
        };
        let mut renderer = Renderer::new(Box::new(target));

        assert!(matches!(
            renderer.render(label("a")),
            Err(RuntimeError::Render { .. })
        ));
        // Same view again: still a full render because nothing was applied.
        assert_eq!(renderer.render(label("a")).ok(), Some(1));
        assert_eq!(seen.lock().len(), 1);
    }
}
