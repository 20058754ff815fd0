use crate::error::PipelineError;
use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::separable_filter_equal;

/// Decode raw upload bytes into an image
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    let img = image::load_from_memory(bytes).map_err(|e| PipelineError::Decode(e.to_string()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PipelineError::Decode(format!(
            "image has no pixels ({}x{})",
            img.width(),
            img.height()
        )));
    }
    Ok(img)
}

pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Normalized 1-D Gaussian with exactly `size` taps
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - radius;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian blur with a `kernel_size` x `kernel_size` support
pub fn apply_blur(
    img: &GrayImage,
    kernel_size: u32,
    sigma: f32,
) -> Result<GrayImage, PipelineError> {
    if kernel_size % 2 == 0 {
        return Err(PipelineError::Processing(format!(
            "blur kernel size must be odd, got {kernel_size}"
        )));
    }
    if sigma.is_nan() || sigma <= 0.0 {
        return Err(PipelineError::Processing(format!("invalid blur sigma {sigma}")));
    }
    Ok(separable_filter_equal(img, &gaussian_kernel(kernel_size, sigma)))
}

/// Binary edge map (edges are 255) from the Canny detector.
///
/// `imageproc`'s Canny smooths its input with its own Gaussian (sigma 1.4)
/// before computing gradients, so the blurred image is smoothed once more here.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
