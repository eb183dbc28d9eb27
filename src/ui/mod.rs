//! Terminal presentation for chat sessions.
//!
//! - [`markdown`]: the formatting engine that turns message text into
//!   segments and styled lines.
//! - [`chat_loop`]: the line-oriented interactive loop that dispatches input
//!   to [`crate::commands`] or the assistant.
//! - [`ansi`] and [`theme`]: terminal output and color policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns conversations, persistence and the backend session.

pub mod ansi;
pub mod chat_loop;
pub mod markdown;
pub mod theme;
