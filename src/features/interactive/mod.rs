//! # Interactive Flows
//!
//! Multi-turn exchanges built on the response waiter: a reaction-based
//! confirm/cancel prompt and the question-and-answer guessing game. A flow
//! holds at most one open wait at a time and always ends in a terminal state.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Response waiter, confirm flow and guessing flow

pub mod confirm;
pub mod guessing;
pub mod waiter;

pub use confirm::{AuditRequest, ConfirmFlow, ConfirmOutcome, CANCEL, CONFIRM, CONFIRM_TIMEOUT};
pub use guessing::{ConversationState, FlowState, GuessingConfig, GuessingFlow};
pub use waiter::{ResponseWaiter, WaitScope, WaitedEvent};
