use crate::detection::{contours, preprocessing};
use crate::error::PipelineError;
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep, PixelRect};
use image::DynamicImage;

pub const CONTOUR_AREA: &str = "contour_area";
pub const ASPECT_RATIO: &str = "aspect_ratio";
pub const CONTOUR_INDEX: &str = "contour_index";

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(
        &self,
        data: Vec<PipelineData>,
        _context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError> {
        Ok(data
            .iter()
            .map(|item| {
                let gray = preprocessing::to_grayscale(&item.image);
                item.with_image(DynamicImage::ImageLuma8(gray))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Apply a `kernel_size`-tap Gaussian blur
pub struct BlurStep {
    pub kernel_size: u32,
    pub sigma: f32,
}

impl PipelineStep for BlurStep {
    fn process(
        &self,
        data: Vec<PipelineData>,
        _context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError> {
        let mut result = Vec::with_capacity(data.len());
        for item in data {
            let blurred =
                preprocessing::apply_blur(&item.image.to_luma8(), self.kernel_size, self.sigma)?;
            result.push(item.with_image(DynamicImage::ImageLuma8(blurred)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(
        &self,
        data: Vec<PipelineData>,
        _context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError> {
        Ok(data
            .iter()
            .map(|item| {
                let edges = preprocessing::detect_edges(
                    &item.image.to_luma8(),
                    self.low_threshold,
                    self.high_threshold,
                );
                item.with_image(DynamicImage::ImageLuma8(edges))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Find external contours in the edge map - splits one image into many regions.
/// Region items carry a crop of the original only when debug output is enabled;
/// otherwise their image is empty and only `bbox` and metadata are meaningful.
pub struct ExternalContourStep;

impl PipelineStep for ExternalContourStep {
    fn process(
        &self,
        data: Vec<PipelineData>,
        context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError> {
        let mut result = Vec::new();

        for item in data {
            let edges = item.image.to_luma8();
            let (img_width, img_height) = item.original_dimensions();
            if edges.dimensions() != (img_width, img_height) {
                return Err(PipelineError::Processing(format!(
                    "edge map is {:?}, expected {}x{}",
                    edges.dimensions(),
                    img_width,
                    img_height
                )));
            }

            for region in contours::find_external_contours(&edges) {
                let bbox = PixelRect {
                    x: region.min_x,
                    y: region.min_y,
                    width: region.width(),
                    height: region.height(),
                };
                let image = if context.debug.is_some() {
                    item.original.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height)
                } else {
                    DynamicImage::new_luma8(0, 0)
                };

                let region_data = PipelineData::from_region(image, item.original.clone(), bbox)
                    .with_metadata(CONTOUR_AREA, MetadataValue::Float(region.area))
                    .with_metadata(ASPECT_RATIO, MetadataValue::Float(region.aspect_ratio()))
                    .with_metadata(CONTOUR_INDEX, MetadataValue::Int(region.index as i64));
                result.push(region_data);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Contour Detection"
    }
}

/// Whether a contour is large enough to be more than a noise speck
pub fn passes_area(area: f64, img_width: u32, img_height: u32, min_area_ratio: f64) -> bool {
    let threshold = img_width as f64 * img_height as f64 * min_area_ratio;
    area >= threshold
}

/// Drop contours covering less than a fraction of the image
pub struct AreaFilterStep {
    pub min_area_ratio: f64,
}

impl PipelineStep for AreaFilterStep {
    fn process(
        &self,
        data: Vec<PipelineData>,
        _context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError> {
        let mut result = Vec::new();
        for item in data {
            let area = item
                .get_float(CONTOUR_AREA)
                .ok_or_else(|| PipelineError::Processing(format!("missing {CONTOUR_AREA}")))?;
            let (w, h) = item.original_dimensions();
            if passes_area(area, w, h, self.min_area_ratio) {
                result.push(item);
            }
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Area Filtering"
    }
}

/// Whether a width/height ratio looks like a card silhouette
pub fn passes_aspect(aspect_ratio: f64, min: f64, max: f64) -> bool {
    aspect_ratio >= min && aspect_ratio <= max
}

/// Drop contours whose bounding rectangle is too thin or too wide
pub struct AspectRatioFilterStep {
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
}

impl PipelineStep for AspectRatioFilterStep {
    fn process(
        &self,
        data: Vec<PipelineData>,
        _context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError> {
        let mut result = Vec::new();
        for item in data {
            let aspect = item
                .get_float(ASPECT_RATIO)
                .ok_or_else(|| PipelineError::Processing(format!("missing {ASPECT_RATIO}")))?;
            if passes_aspect(aspect, self.min_aspect_ratio, self.max_aspect_ratio) {
                result.push(item);
            }
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Aspect Ratio Filtering"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DebugConfig;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    /// Full-frame item whose current image is an edge map with one square outline
    fn outlined_square() -> PipelineData {
        let original = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 80, Rgb([200, 10, 10])));
        let mut edges = GrayImage::new(100, 80);
        for i in 20..50 {
            for (x, y) in [(i, 20), (i, 49), (20, i), (49, i)] {
                edges.put_pixel(x, y, Luma([255]));
            }
        }
        PipelineData::from_image(original).with_image(DynamicImage::ImageLuma8(edges))
    }

    #[test]
    fn test_regions_skip_crops_without_debug() {
        let regions = ExternalContourStep
            .process(vec![outlined_square()], &PipelineContext::default())
            .unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].image.width(), 0);
        assert_eq!(
            regions[0].bbox,
            Some(PixelRect {
                x: 20,
                y: 20,
                width: 30,
                height: 30
            })
        );
        assert_eq!(regions[0].get_float(CONTOUR_AREA), Some(29.0 * 29.0));
    }

    #[test]
    fn test_regions_are_cropped_for_debug_output() {
        let context = PipelineContext {
            debug: Some(DebugConfig {
                output_dir: "unused".into(),
            }),
        };
        let regions = ExternalContourStep
            .process(vec![outlined_square()], &context)
            .unwrap();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].image.width(), 30);
        assert_eq!(regions[0].image.height(), 30);
    }

    #[test]
    fn test_area_threshold_keeps_equality() {
        // 1000x1000 image at 0.1% gives a threshold of exactly 1000
        assert!(passes_area(1000.0, 1000, 1000, 0.001));
        assert!(passes_area(1000.5, 1000, 1000, 0.001));
        assert!(!passes_area(999.0, 1000, 1000, 0.001));
    }

    #[test]
    fn test_aspect_bounds_are_inclusive() {
        assert!(passes_aspect(0.2, 0.2, 2.5));
        assert!(passes_aspect(2.5, 0.2, 2.5));
        assert!(passes_aspect(0.7, 0.2, 2.5));
        assert!(!passes_aspect(0.19, 0.2, 2.5));
        assert!(!passes_aspect(2.51, 0.2, 2.5));
        assert!(!passes_aspect(0.0, 0.2, 2.5));
    }
}
