use clap::Args;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5100;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_MIN_AREA_RATIO: f64 = 0.001;
const DEFAULT_MIN_ASPECT_RATIO: f64 = 0.2;
const DEFAULT_MAX_ASPECT_RATIO: f64 = 2.5;
const DEFAULT_BLUR_KERNEL_SIZE: u32 = 5;
const DEFAULT_CANNY_LOW: f32 = 50.0;
const DEFAULT_CANNY_HIGH: f32 = 150.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("blur kernel size must be odd and positive, got {0}")]
    BlurKernel(u32),
    #[error("canny low threshold {low} exceeds high threshold {high}")]
    CannyThresholds { low: f32, high: f32 },
    #[error("aspect ratio bounds are inverted: {min} > {max}")]
    AspectBounds { min: f64, max: f64 },
    #[error("minimum area ratio must be in [0, 1), got {0}")]
    AreaRatio(f64),
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    #[error("invalid listen address {0}")]
    Address(String),
}

/// Tunable thresholds of the contour pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Args)]
pub struct DetectorConfig {
    /// Contours smaller than this fraction of the image area are discarded
    #[arg(long, env = "CV_MIN_AREA_RATIO", default_value_t = DEFAULT_MIN_AREA_RATIO)]
    pub min_area_ratio: f64,

    /// Lowest accepted width/height ratio of a card candidate
    #[arg(long, env = "CV_MIN_ASPECT_RATIO", default_value_t = DEFAULT_MIN_ASPECT_RATIO)]
    pub min_aspect_ratio: f64,

    /// Highest accepted width/height ratio of a card candidate
    #[arg(long, env = "CV_MAX_ASPECT_RATIO", default_value_t = DEFAULT_MAX_ASPECT_RATIO)]
    pub max_aspect_ratio: f64,

    /// Gaussian blur kernel size (odd)
    #[arg(long, env = "CV_BLUR_KERNEL", default_value_t = DEFAULT_BLUR_KERNEL_SIZE)]
    pub blur_kernel_size: u32,

    /// Canny hysteresis low threshold
    #[arg(long, env = "CV_CANNY_LOW", default_value_t = DEFAULT_CANNY_LOW)]
    pub canny_low: f32,

    /// Canny hysteresis high threshold
    #[arg(long, env = "CV_CANNY_HIGH", default_value_t = DEFAULT_CANNY_HIGH)]
    pub canny_high: f32,
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("min_area_ratio", self.min_area_ratio),
            ("min_aspect_ratio", self.min_aspect_ratio),
            ("max_aspect_ratio", self.max_aspect_ratio),
            ("canny_low", self.canny_low as f64),
            ("canny_high", self.canny_high as f64),
        ];
        if let Some(&(name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite(name));
        }
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(ConfigError::BlurKernel(self.blur_kernel_size));
        }
        if self.canny_low > self.canny_high {
            return Err(ConfigError::CannyThresholds {
                low: self.canny_low,
                high: self.canny_high,
            });
        }
        if self.min_aspect_ratio > self.max_aspect_ratio {
            return Err(ConfigError::AspectBounds {
                min: self.min_aspect_ratio,
                max: self.max_aspect_ratio,
            });
        }
        if !(0.0..1.0).contains(&self.min_area_ratio) {
            return Err(ConfigError::AreaRatio(self.min_area_ratio));
        }
        Ok(())
    }

    /// Gaussian sigma implied by the kernel size when no sigma is given
    pub fn blur_sigma(&self) -> f32 {
        let k = self.blur_kernel_size as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            min_aspect_ratio: DEFAULT_MIN_ASPECT_RATIO,
            max_aspect_ratio: DEFAULT_MAX_ASPECT_RATIO,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    #[arg(long, env = "CV_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "CV_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest accepted request body
    #[arg(long, env = "CV_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.blur_kernel_size, 5);
        assert_eq!(config.min_area_ratio, 0.001);
    }

    #[test]
    fn test_blur_sigma_for_default_kernel() {
        let sigma = DetectorConfig::default().blur_sigma();
        assert!((sigma - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_validation_rejects_even_kernel() {
        let config = DetectorConfig {
            blur_kernel_size: 4,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BlurKernel(4)));
    }

    #[test]
    fn test_validation_rejects_inverted_bounds() {
        let config = DetectorConfig {
            min_aspect_ratio: 3.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetectorConfig {
            canny_low: 200.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_finite_values() {
        let config = DetectorConfig {
            canny_low: f32::NAN,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonFinite("canny_low")));

        let config = DetectorConfig {
            max_aspect_ratio: f64::NAN,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonFinite("max_aspect_ratio")));

        let config = DetectorConfig {
            canny_high: f32::INFINITY,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NonFinite("canny_high")));
    }

    #[test]
    fn test_default_socket_addr() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 5100);
    }
}
