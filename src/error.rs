use crate::models::FallbackReason;
use thiserror::Error;

/// Errors visible to the caller of the detector
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("no image provided")]
    MissingInput,
}

/// Failure of a contour pipeline stage
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("processing failed: {0}")]
    Processing(String),
    #[error("no card candidates survived filtering")]
    EmptyResult,
    #[error("contour detection is not available in this build")]
    Unavailable,
    #[error("failed to write debug output: {0}")]
    DebugOutput(String),
}

impl PipelineError {
    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            PipelineError::Decode(_) => FallbackReason::DecodeFailure,
            PipelineError::Processing(_) | PipelineError::DebugOutput(_) => {
                FallbackReason::ProcessingFailure
            }
            PipelineError::EmptyResult => FallbackReason::EmptyResult,
            PipelineError::Unavailable => FallbackReason::Unavailable,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::DebugOutput(e.to_string())
    }
}
