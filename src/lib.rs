//! CodeMint is a terminal chat client for a code assistant backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation store and its persistence, the session
//!   bound chat client, and configuration.
//! - [`ui`] formats message content (fenced code blocks, `**bold**` runs,
//!   syntax highlighting) and runs the interactive chat loop.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`api`] defines the request/response payloads exchanged with the backend.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
