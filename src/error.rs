use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::consultation::IncompleteInput;
use crate::llm::ApiError;
use crate::llm::attachment::ImageError;
use crate::llm::prompt::BuildError;

/// Every way a submission can end without advice.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Form-level rejection raised before anything is sent.
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("{0}")]
    Config(String),
    #[error("OPENAI_API_KEY is not set. Please add your OpenAI API key to continue.")]
    MissingApiKey,
    #[error("Failed to read image '{}': {source}", .path.display())]
    ReadImage { path: PathBuf, source: io::Error },
    #[error("Failed to process image '{}': {source}", .path.display())]
    Image { path: PathBuf, source: ImageError },
    #[error("An error occurred: {0}")]
    Remote(#[from] ApiError),
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{context}: {source}")]
    Io { context: String, source: io::Error },
}

impl AdvisorError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code: 2 for incomplete forms, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Build(BuildError::Incomplete(_)) => 2,
            _ => 1,
        }
    }
}

impl From<IncompleteInput> for AdvisorError {
    fn from(err: IncompleteInput) -> Self {
        Self::Build(BuildError::Incomplete(err))
    }
}

impl From<String> for AdvisorError {
    fn from(message: String) -> Self {
        Self::Config(message)
    }
}
