use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    NotFound = 1,
    InvalidArguments = 2,
    Io = 3,
    InvalidContent = 4,
    ContentTooLarge = 5,
    Configuration = 6,
    Remote = 7,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::NotFound),
            2 => Some(Self::InvalidArguments),
            3 => Some(Self::Io),
            4 => Some(Self::InvalidContent),
            5 => Some(Self::ContentTooLarge),
            6 => Some(Self::Configuration),
            7 => Some(Self::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid content source: {0}")]
    InvalidContent(String),

    #[error("content is {actual} characters, limit is {limit}")]
    ContentTooLarge { limit: usize, actual: usize },

    #[error("{0}")]
    Configuration(String),

    #[error("remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl EditError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound(_) => ExitCode::NotFound,
            Self::InvalidArguments(_) => ExitCode::InvalidArguments,
            Self::Io(_) => ExitCode::Io,
            Self::InvalidContent(_) => ExitCode::InvalidContent,
            Self::ContentTooLarge { .. } => ExitCode::ContentTooLarge,
            Self::Configuration(_) => ExitCode::Configuration,
            Self::Remote { .. } | Self::Http(_) | Self::Decode(_) => ExitCode::Remote,
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;
