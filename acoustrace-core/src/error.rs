//! Error types for Acoustrace

use crate::world::{MicrophoneId, SourceId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcoustraceError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input signal is empty")]
    EmptySignal,

    #[error("Convolution error: {0}")]
    Convolution(String),

    #[error("Unknown source: {0}")]
    UnknownSource(SourceId),

    #[error("Unknown microphone: {0}")]
    UnknownMicrophone(MicrophoneId),
}

impl AcoustraceError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<realfft::FftError> for AcoustraceError {
    fn from(err: realfft::FftError) -> Self {
        Self::Convolution(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AcoustraceError>;
