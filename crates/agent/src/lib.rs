//! The course assistant — prompts, memory, and the turn logic around a model call.
//!
//! Two ways in:
//!
//! 1. **Webhook** — [`CourseAssistant::answer`] asks a single standalone
//!    question (`[system, preamble, user]`) and never fails; model errors
//!    become the reply text.
//! 2. **Interactive chat** — [`ChatSession::send`] builds the prompt through a
//!    bounded [`ConversationMemory`] and records completed exchanges.
//!
//! Every reply has its `<think>` reasoning trace removed before it is returned.

pub mod assistant;
pub mod history;
pub mod probe;
pub mod prompts;
pub mod reasoning;
pub mod session;

#[cfg(any(test, feature = "test-util"))]
pub mod test_helpers;

pub use assistant::CourseAssistant;
pub use history::{ConversationMemory, MemoryModeError};
pub use probe::{ProbeOutcome, is_refusal, run_probe};
pub use reasoning::strip_reasoning_trace;
pub use session::{ChatSession, SessionCommand};
