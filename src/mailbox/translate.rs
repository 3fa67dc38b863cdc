//! Ready-made translations for common native controls.

/// Translation for selection controls: the raw event is the selected index,
/// and each position maps to an optional message.
///
/// Indices past the end, or positions without a message, are absorbed.
pub fn select_index<M>(messages: Vec<Option<M>>) -> impl Fn(&usize) -> Option<M> + Send + Sync
where
    M: Clone + Send + Sync,
{
    move |index| messages.get(*index).cloned().flatten()
}

/// Translation ignoring the raw payload and always producing `message`.
pub fn constant<E, M>(message: M) -> impl Fn(&E) -> Option<M> + Send + Sync
where
    M: Clone + Send + Sync,
{
    move |_| Some(message.clone())
}
