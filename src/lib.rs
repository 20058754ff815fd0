pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod pipeline;

#[cfg(feature = "vision")]
pub mod detection;

pub use config::{DetectorConfig, ServerConfig};
pub use detector::{Capability, Detector};
pub use error::{DetectError, PipelineError};
pub use models::{mock_boxes, BoundingBox, DetectionResult, FallbackReason, Source};
pub use pipeline::{Pipeline, PipelineContext, PipelineData, PipelineStep};
