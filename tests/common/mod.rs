#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types for tests
pub use card_detector::{
    mock_boxes, BoundingBox, Capability, DetectError, DetectionResult, Detector, DetectorConfig,
    FallbackReason, Source,
};
