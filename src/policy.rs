//! The encoding policy: one immutable value describing what a batch run
//! must enforce.
//!
//! A policy is assembled at the boundary (config file + CLI flags), validated
//! once, and then passed into the driver by reference. Nothing in the core
//! mutates it mid-run; changing settings between runs is the caller's
//! business.

use crate::format::OutputFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    #[error("max_width must be at least 1, got {0}")]
    WidthOutOfRange(u32),
    #[error("min_quality must be in 1..=100, got {0}")]
    QualityOutOfRange(u32),
    #[error("max_size_kb must be at least 1, got {0}")]
    SizeOutOfRange(u32),
}

/// Which constraint wins when encoding lossy formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// Encode once at the quality floor; size is whatever results.
    #[serde(rename = "quality")]
    #[clap(name = "quality")]
    QualityPriority,
    /// Search for the highest quality that stays under the size ceiling.
    #[serde(rename = "size")]
    #[clap(name = "size")]
    SizePriority,
}

/// Everything a batch run enforces, fixed for the duration of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingPolicy {
    /// Maximum output width in pixels; wider images are downscaled.
    pub max_width: u32,
    /// Quality floor (1..=100) for quality-priority encodes.
    pub min_quality: u32,
    /// File-size ceiling in KB for size-priority encodes and the copy
    /// fast-path check.
    pub max_size_kb: u32,
    pub mode: PolicyMode,
    pub output_format: OutputFormat,
}

impl EncodingPolicy {
    /// Reject out-of-range values before a run starts.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_width == 0 {
            return Err(PolicyError::WidthOutOfRange(self.max_width));
        }
        if self.min_quality == 0 || self.min_quality > 100 {
            return Err(PolicyError::QualityOutOfRange(self.min_quality));
        }
        if self.max_size_kb == 0 {
            return Err(PolicyError::SizeOutOfRange(self.max_size_kb));
        }
        Ok(())
    }

    /// Size ceiling in bytes, as used by the copy fast-path.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_kb as u64 * 1024
    }
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            max_width: 1024,
            min_quality: 85,
            max_size_kb: 300,
            mode: PolicyMode::QualityPriority,
            output_format: OutputFormat::Jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(EncodingPolicy::default().validate().is_ok());
    }

    #[test]
    fn zero_width_rejected() {
        let p = EncodingPolicy {
            max_width: 0,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(PolicyError::WidthOutOfRange(0)));
    }

    #[test]
    fn quality_bounds_rejected() {
        for q in [0, 101] {
            let p = EncodingPolicy {
                min_quality: q,
                ..Default::default()
            };
            assert_eq!(p.validate(), Err(PolicyError::QualityOutOfRange(q)));
        }
        for q in [1, 100] {
            let p = EncodingPolicy {
                min_quality: q,
                ..Default::default()
            };
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn zero_size_rejected() {
        let p = EncodingPolicy {
            max_size_kb: 0,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(PolicyError::SizeOutOfRange(0)));
    }

    #[test]
    fn size_ceiling_in_bytes() {
        let p = EncodingPolicy {
            max_size_kb: 300,
            ..Default::default()
        };
        assert_eq!(p.max_size_bytes(), 300 * 1024);
    }
}
