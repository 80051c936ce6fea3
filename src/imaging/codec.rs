//! Codec adapter trait and shared types.
//!
//! The [`Codec`] trait defines the three operations the rest of the crate
//! needs from an image library: probe (cheap container metadata, no decode),
//! decode (orientation-normalized RGB8 pixels), and encode (in-memory bytes
//! at a given quality).
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec) — pure Rust, everything
//! statically linked into the binary.

use crate::format::FormatFamily;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of a probe: declared dimensions and on-disk size, read from
/// container metadata without decoding any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    pub file_bytes: u64,
}

impl SourceInfo {
    pub fn file_kb(&self) -> f64 {
        self.file_bytes as f64 / 1024.0
    }
}

/// Trait for image codecs.
///
/// Probe must stay cheap (the copy fast-path depends on it); decode applies
/// EXIF orientation unconditionally and converts to RGB8 so later resize and
/// encode steps never see a color-mode mismatch; encode returns bytes in
/// memory so size-priority probes never touch the filesystem.
pub trait Codec: Sync {
    /// Declared dimensions and byte size, no pixel decode.
    fn probe(&self, path: &Path) -> Result<SourceInfo, CodecError>;

    /// Full decode, orientation-normalized, canonical RGB8.
    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError>;

    /// Encode to `family` at `quality` (1..=100; ignored by lossless and
    /// uncompressed families).
    fn encode(
        &self,
        img: &DynamicImage,
        family: FormatFamily,
        quality: u32,
    ) -> Result<Vec<u8>, CodecError>;
}
