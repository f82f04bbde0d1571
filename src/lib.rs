//! Symptom advisor: turns a symptom form into a chat-completion request and
//! renders the returned health advice.

pub mod commands;
pub mod config;
pub mod consultation;
pub mod error;
pub mod form;
pub mod llm;
pub mod logging;

pub use consultation::{ConsultationRequest, Severity};
pub use error::AdvisorError;
