//! Core traits for state machines.

use crate::{Action, Event};

/// A state machine that processes events.
///
/// This is the core abstraction for participant logic. Implementations are:
///
/// - **Synchronous**: No async, no `.await`
/// - **Deterministic**: Same state + event = same actions
/// - **Pure-ish**: Mutates self, but performs no I/O
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ParticipantState {
///     fn handle(&mut self, event: Event) -> Vec<Action> {
///         match event {
///             Event::SendRequested { to } => self.on_send(to),
///             Event::MessageReceived(message) => self.on_message(message),
///             // ... etc
///         }
///     }
/// }
/// ```
pub trait StateMachine {
    /// Process an event, returning actions to perform.
    ///
    /// # Guarantees
    ///
    /// - **Synchronous**: This method never blocks or awaits
    /// - **Deterministic**: Given the same state and event, always returns the same actions
    /// - **No I/O**: All I/O is performed by the runner via the returned actions
    ///
    /// # Returns
    ///
    /// A list of actions for the runner to execute, in order. Actions may include:
    /// - Sending data or marker messages
    /// - Publishing a round record
    /// - Finalizing a completed round
    fn handle(&mut self, event: Event) -> Vec<Action>;
}
