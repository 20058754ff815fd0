pub mod contours;
pub mod preprocessing;
pub mod steps;

use crate::config::DetectorConfig;
use crate::error::PipelineError;
use crate::models::BoundingBox;
use crate::pipeline::{Pipeline, PipelineData};
use std::path::PathBuf;
use std::sync::Arc;
use steps::*;

/// Build the card contour pipeline from the configured thresholds
pub fn build_standard_pipeline(config: &DetectorConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BlurStep {
            kernel_size: config.blur_kernel_size,
            sigma: config.blur_sigma(),
        }))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: config.canny_low,
            high_threshold: config.canny_high,
        }))
        .add_step(Arc::new(ExternalContourStep))
        .add_step(Arc::new(AreaFilterStep {
            min_area_ratio: config.min_area_ratio,
        }))
        .add_step(Arc::new(AspectRatioFilterStep {
            min_aspect_ratio: config.min_aspect_ratio,
            max_aspect_ratio: config.max_aspect_ratio,
        }))
}

/// Locates card-shaped regions with the classical edge/contour pipeline
#[derive(Clone)]
pub struct ContourDetector {
    pipeline: Pipeline,
}

impl ContourDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            pipeline: build_standard_pipeline(config),
        }
    }

    /// Save every step's images under `output_dir`
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    /// Decode `bytes` and return normalized card boxes sorted left to right.
    /// An empty result is reported as `PipelineError::EmptyResult`.
    pub fn detect(&self, bytes: &[u8]) -> Result<Vec<BoundingBox>, PipelineError> {
        let img = preprocessing::decode(bytes)?;
        tracing::debug!("decoded image {}x{}", img.width(), img.height());

        let regions = self.pipeline.run(img)?;
        let mut boxes = regions
            .iter()
            .map(normalize_region)
            .collect::<Result<Vec<_>, _>>()?;

        if boxes.is_empty() {
            return Err(PipelineError::EmptyResult);
        }

        sort_left_to_right(&mut boxes);
        Ok(boxes)
    }
}

/// Stable sort by `x`; boxes with equal `x` keep contour discovery order
pub fn sort_left_to_right(boxes: &mut [BoundingBox]) {
    boxes.sort_by(|a, b| a.x.total_cmp(&b.x));
}

fn normalize_region(item: &PipelineData) -> Result<BoundingBox, PipelineError> {
    let bbox = item
        .bbox
        .ok_or_else(|| PipelineError::Processing("pipeline returned a full-image item".into()))?;
    let (img_width, img_height) = item.original_dimensions();

    tracing::trace!(
        contour = ?item.get_int(CONTOUR_INDEX),
        area = ?item.get_float(CONTOUR_AREA),
        aspect = ?item.get_float(ASPECT_RATIO),
        "card candidate at ({}, {}) {}x{}",
        bbox.x,
        bbox.y,
        bbox.width,
        bbox.height
    );

    Ok(BoundingBox::from_pixels(
        bbox.x,
        bbox.y,
        bbox.width,
        bbox.height,
        img_width,
        img_height,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(x: f64, label: &str) -> BoundingBox {
        BoundingBox {
            x,
            y: 0.0,
            w: 0.1,
            h: 0.1,
            label: Some(label.to_string()),
        }
    }

    #[test]
    fn test_sort_keeps_discovery_order_on_ties() {
        let mut boxes = vec![
            labeled(0.5, "a"),
            labeled(0.25, "b"),
            labeled(0.5, "c"),
            labeled(0.25, "d"),
            labeled(0.1, "e"),
        ];
        sort_left_to_right(&mut boxes);

        let order: Vec<_> = boxes.iter().filter_map(|b| b.label.as_deref()).collect();
        assert_eq!(order, vec!["e", "b", "d", "a", "c"]);
    }
}
