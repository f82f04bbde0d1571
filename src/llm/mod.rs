//! Chat-completion and speech clients plus the prompt builder.
//!
//! Everything that talks to the remote API, or shapes what is sent to it,
//! lives here; the CLI commands only wire these pieces together.

/// Image normalization and `data:` URL helpers.
pub mod attachment;
pub(crate) mod client;
/// Role-tagged chat messages and multipart content.
pub mod message;
/// Chat-completions client.
pub mod openai;
/// Consultation prompt assembly.
pub mod prompt;
/// Text-to-speech client.
pub mod speech;

pub use client::{ApiError, DEFAULT_BASE_URL};
