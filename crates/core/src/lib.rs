//! Core types for the snapshot protocol.
//!
//! A participant's protocol logic is a synchronous [`StateMachine`]: the
//! runner feeds it [`Event`]s and performs the [`Action`]s it returns. All
//! channel I/O, sleeping and sink writes stay in the runner.

mod action;
mod event;
mod traits;

pub use action::Action;
pub use event::Event;
pub use traits::StateMachine;
