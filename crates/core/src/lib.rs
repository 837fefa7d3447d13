//! # coursebot core
//!
//! Domain types, traits, and error definitions for the course-assistant bot.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! Every external collaborator (the language model, the messaging platform)
//! is a trait here. Implementations live in their respective crates, and
//! tests swap in scripted stand-ins.

pub mod error;
pub mod message;
pub mod provider;
pub mod channel;
pub mod course;

// Re-export key types at crate root for ergonomics
pub use error::{ChannelError, ProviderError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use channel::{Channel, ChannelId, IncomingMessage};
pub use course::{Assignment, CourseInfo};
