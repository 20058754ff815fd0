use serde::{Deserialize, Serialize};

/// Bounding box in normalized image coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub label: Option<String>,
}

impl BoundingBox {
    fn mocked(x: f64, y: f64, w: f64, h: f64, label: &str) -> Self {
        Self {
            x,
            y,
            w,
            h,
            label: Some(label.to_string()),
        }
    }

    /// Normalize a pixel rectangle against the image dimensions
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        img_width: u32,
        img_height: u32,
    ) -> Self {
        let iw = img_width as f64;
        let ih = img_height as f64;
        Self {
            x: round4(x as f64 / iw),
            y: round4(y as f64 / ih),
            w: round4(width as f64 / iw),
            h: round4(height as f64 / ih),
            label: None,
        }
    }
}

/// Round to 4 decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Fixed card positions returned whenever real detection is not used.
/// Order and values are part of the wire contract.
pub fn mock_boxes() -> Vec<BoundingBox> {
    vec![
        BoundingBox::mocked(0.1, 0.6, 0.12, 0.2, "AS"),
        BoundingBox::mocked(0.25, 0.6, 0.12, 0.2, "KH"),
        BoundingBox::mocked(0.45, 0.5, 0.12, 0.2, "7D"),
    ]
}

/// Where the boxes of a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Mocked,
    Computed,
}

/// Why a result fell back to the mock box set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Unavailable,
    DecodeFailure,
    ProcessingFailure,
    EmptyResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub boxes: Vec<BoundingBox>,
    pub note: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
}

impl DetectionResult {
    pub fn mocked(reason: FallbackReason) -> Self {
        Self {
            boxes: mock_boxes(),
            note: "from cv_service (mocked)".to_string(),
            source: Source::Mocked,
            fallback_reason: Some(reason),
        }
    }

    pub fn computed(boxes: Vec<BoundingBox>) -> Self {
        Self {
            boxes,
            note: "from cv_service (computed)".to_string(),
            source: Source::Computed,
            fallback_reason: None,
        }
    }

    pub fn is_mocked(&self) -> bool {
        self.source == Source::Mocked
    }
}

/// Outer border of a connected edge region, in pixel space
#[derive(Debug, Clone)]
pub struct ContourRegion {
    /// Position in contour discovery order
    pub index: usize,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// Polygon area enclosed by the border
    pub area: f64,
}

impl ContourRegion {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn aspect_ratio(&self) -> f64 {
        let w = self.width() as f64;
        let h = self.height() as f64;
        if h == 0.0 {
            return 0.0;
        }
        w / h
    }
}
