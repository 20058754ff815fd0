use crate::error::PipelineError;
use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Pixel-space rectangle in the original image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Data that flows through the pipeline.
/// Each PipelineData is either the full image or one candidate region of it.
#[derive(Clone)]
pub struct PipelineData {
    /// Current image of this item (full frame, edge map, or cropped region)
    pub image: DynamicImage,

    /// The decoded input, shared by every item derived from it
    pub original: Arc<DynamicImage>,

    /// Region in the original image (None means full image)
    pub bbox: Option<PixelRect>,

    /// Measurements attached by earlier steps (e.g. "contour_area", "aspect_ratio")
    pub metadata: HashMap<String, MetadataValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f64),
    Int(i64),
}

impl PipelineData {
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            bbox: None,
            metadata: HashMap::new(),
        }
    }

    pub fn from_region(image: DynamicImage, original: Arc<DynamicImage>, bbox: PixelRect) -> Self {
        Self {
            image,
            original,
            bbox: Some(bbox),
            metadata: HashMap::new(),
        }
    }

    /// Replace the image, keeping provenance and metadata
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            original: self.original.clone(),
            bbox: self.bbox,
            metadata: self.metadata.clone(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Width and height of the original image
    pub fn original_dimensions(&self) -> (u32, u32) {
        (self.original.width(), self.original.height())
    }
}

#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for per-step images
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many)
    fn process(
        &self,
        data: Vec<PipelineData>,
        context: &PipelineContext,
    ) -> Result<Vec<PipelineData>, PipelineError>;

    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run all steps sequentially on an input image
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>, PipelineError> {
        let mut data = vec![PipelineData::from_image(input)];
        self.save_debug_output(0, "input", &data)?;

        for (step_idx, step) in self.steps.iter().enumerate() {
            let before = data.len();
            data = step.process(data, &self.context)?;
            tracing::trace!(step = step.name(), before, after = data.len(), "pipeline step done");

            self.save_debug_output(step_idx + 1, step.name(), &data)?;
        }

        Ok(data)
    }

    fn save_debug_output(
        &self,
        step_idx: usize,
        step_name: &str,
        data: &[PipelineData],
    ) -> Result<(), PipelineError> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir_name = format!(
            "{:02}_{}",
            step_idx,
            step_name.to_lowercase().replace(' ', "_")
        );
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            item.image
                .save(&output_path)
                .map_err(|e| PipelineError::DebugOutput(e.to_string()))?;
        }

        tracing::debug!("saved {} debug images to {}/", data.len(), step_dir_name);
        Ok(())
    }
}
