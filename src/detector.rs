use crate::config::DetectorConfig;
use crate::error::{DetectError, PipelineError};
use crate::models::{BoundingBox, DetectionResult, FallbackReason};
use std::path::PathBuf;

#[cfg(feature = "vision")]
use crate::detection::ContourDetector;

/// Whether real contour detection can run in this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Available,
    Unavailable,
}

impl Capability {
    /// Resolved once at startup from the build features and operator settings
    pub fn resolve(mock_only: bool) -> Self {
        if cfg!(feature = "vision") && !mock_only {
            Capability::Available
        } else {
            Capability::Unavailable
        }
    }
}

/// Stateless card detector shared by all requests
#[derive(Clone)]
pub struct Detector {
    capability: Capability,
    config: DetectorConfig,
    #[cfg(feature = "vision")]
    contours: ContourDetector,
}

impl Detector {
    pub fn new(capability: Capability, config: DetectorConfig) -> Self {
        Self {
            capability,
            #[cfg(feature = "vision")]
            contours: ContourDetector::new(&config),
            config,
        }
    }

    /// Write per-step images of every detection to `output_dir`
    pub fn with_debug(self, output_dir: PathBuf) -> anyhow::Result<Self> {
        #[cfg(feature = "vision")]
        {
            let mut detector = self;
            detector.contours = detector.contours.with_debug(output_dir)?;
            Ok(detector)
        }
        #[cfg(not(feature = "vision"))]
        {
            tracing::warn!(
                "debug output to {} ignored: built without contour detection",
                output_dir.display()
            );
            Ok(self)
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect card boxes in an uploaded image.
    ///
    /// Fails only when no image was supplied. Every other problem, including an
    /// empty upload or an image with no card candidates, yields the mock box set
    /// tagged with the reason.
    pub fn detect(&self, image: Option<&[u8]>) -> Result<DetectionResult, DetectError> {
        let Some(bytes) = image else {
            return Err(DetectError::MissingInput);
        };

        if self.capability == Capability::Unavailable {
            return Ok(DetectionResult::mocked(FallbackReason::Unavailable));
        }

        match self.run_contours(bytes) {
            Ok(boxes) => {
                tracing::debug!("contour pipeline found {} card boxes", boxes.len());
                Ok(DetectionResult::computed(boxes))
            }
            Err(e) => {
                let reason = e.fallback_reason();
                tracing::debug!(?reason, "falling back to mock boxes: {}", e);
                Ok(DetectionResult::mocked(reason))
            }
        }
    }

    #[cfg(feature = "vision")]
    fn run_contours(&self, bytes: &[u8]) -> Result<Vec<BoundingBox>, PipelineError> {
        self.contours.detect(bytes)
    }

    #[cfg(not(feature = "vision"))]
    fn run_contours(&self, _bytes: &[u8]) -> Result<Vec<BoundingBox>, PipelineError> {
        Err(PipelineError::Unavailable)
    }
}
