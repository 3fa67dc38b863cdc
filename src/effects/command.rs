//! Command execution contract.

use async_trait::async_trait;

use crate::mailbox::Dispatcher;

/// Executes one-shot effects requested by transitions.
///
/// The runtime calls [`CommandExecutor::execute`] at most once per issued
/// command, on its own task, so a slow command never blocks the transition
/// loop. A command runs to completion; there is no cancellation.
#[async_trait]
pub trait CommandExecutor<C, M>: Send + Sync + 'static {
    /// Perform the effect. Results, including user-visible failures, are
    /// reported by dispatching messages. An `Err` is routed to the runtime
    /// error sink and never reaches the transition function.
    async fn execute(&self, command: C, dispatcher: Dispatcher<M>) -> anyhow::Result<()>;
}

/// Executor for applications without commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommands;

#[async_trait]
impl<C, M> CommandExecutor<C, M> for NoCommands
where
    C: Send + 'static,
    M: Send + 'static,
{
    async fn execute(&self, _command: C, _dispatcher: Dispatcher<M>) -> anyhow::Result<()> {
        Ok(())
    }
}
