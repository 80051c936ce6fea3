//! Pure Rust production codec — everything statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe (JPEG, PNG, TIFF, WebP, BMP, GIF, ICO) | `image::image_dimensions` |
//! | Probe (AVIF) | `avif-parse` container metadata |
//! | Decode (non-AVIF) | `image` crate (pure Rust decoders) |
//! | Decode (AVIF) | `avif-parse` + `rav1d` + YUV→RGB (see [`super::avif`]) |
//! | Orientation | `kamadak-exif` tag read + `image` rotate/flip |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder`, `CompressionType::Best` |
//! | Encode → WebP | lossy `webp::Encoder` (the `image` crate only encodes lossless WebP) |
//! | Encode → AVIF | `AvifEncoder::new_with_speed_quality`, speed 1 |
//! | Encode → TIFF / BMP / GIF / ICO | `image` encoders, fixed parameters |

use super::avif;
use super::codec::{Codec, CodecError, SourceInfo};
use crate::format::FormatFamily;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Production codec built on the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn is_avif(path: &Path) -> bool {
    FormatFamily::from_path(path) == Some(FormatFamily::Avif)
}

/// EXIF orientation tag value, 1 (normal) when absent or unreadable.
fn exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let Ok(reader) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };
    reader
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Apply the EXIF orientation transform.
///
/// 1 = normal, 2 = mirrored, 3 = 180°, 4 = flipped V,
/// 5 = mirrored + 90° CW, 6 = 90° CW, 7 = mirrored + 270° CW, 8 = 270° CW.
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

fn lossy_webp(img: &DynamicImage, quality: u32) -> Result<Vec<u8>, CodecError> {
    let encoder = webp::Encoder::from_image(img)
        .map_err(|e| CodecError::Encode(format!("WebP encode rejected input: {e}")))?;
    Ok(encoder.encode(quality as f32).to_vec())
}

impl Codec for RustCodec {
    fn probe(&self, path: &Path) -> Result<SourceInfo, CodecError> {
        let file_bytes = std::fs::metadata(path)?.len();
        let (width, height) = if is_avif(path) {
            let data = std::fs::read(path)?;
            avif::probe_dimensions(&data)?
        } else {
            image::image_dimensions(path)
                .map_err(|e| CodecError::Decode(format!("Failed to read dimensions: {e}")))?
        };
        Ok(SourceInfo {
            width,
            height,
            file_bytes,
        })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, CodecError> {
        let bytes = std::fs::read(path)?;

        let img = if is_avif(path) {
            avif::decode(&bytes)?
        } else {
            ImageReader::new(Cursor::new(&bytes))
                .with_guessed_format()
                .map_err(CodecError::Io)?
                .decode()
                // The caller logs the file name; the reason carries only the
                // decoder's message so no full path reaches the console.
                .map_err(|e| CodecError::Decode(e.to_string()))?
        };

        // Normalize orientation before anything measures width, then drop
        // alpha so every later resize/encode sees the same color mode.
        let img = apply_orientation(img, exif_orientation(&bytes));
        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    }

    fn encode(
        &self,
        img: &DynamicImage,
        family: FormatFamily,
        quality: u32,
    ) -> Result<Vec<u8>, CodecError> {
        let quality = quality.clamp(1, 100) as u8;
        let mut out = Vec::new();

        match family {
            FormatFamily::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), quality);
                img.write_with_encoder(encoder)
                    .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
            }
            FormatFamily::Png => {
                let encoder = PngEncoder::new_with_quality(
                    Cursor::new(&mut out),
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                img.write_with_encoder(encoder)
                    .map_err(|e| CodecError::Encode(format!("PNG encode failed: {e}")))?;
            }
            FormatFamily::WebP => {
                out = lossy_webp(img, quality as u32)?;
            }
            FormatFamily::Avif => {
                // Speed 1: slowest, most thorough. Size-priority probes live
                // or die on encoder consistency, not throughput.
                let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                    Cursor::new(&mut out),
                    1,
                    quality,
                );
                img.write_with_encoder(encoder)
                    .map_err(|e| CodecError::Encode(format!("AVIF encode failed: {e}")))?;
            }
            FormatFamily::Tiff => {
                img.write_to(&mut Cursor::new(&mut out), ImageFormat::Tiff)
                    .map_err(|e| CodecError::Encode(format!("TIFF encode failed: {e}")))?;
            }
            FormatFamily::Bmp => {
                img.write_to(&mut Cursor::new(&mut out), ImageFormat::Bmp)
                    .map_err(|e| CodecError::Encode(format!("BMP encode failed: {e}")))?;
            }
            FormatFamily::Gif => {
                img.write_to(&mut Cursor::new(&mut out), ImageFormat::Gif)
                    .map_err(|e| CodecError::Encode(format!("GIF encode failed: {e}")))?;
            }
            FormatFamily::Ico => {
                img.write_to(&mut Cursor::new(&mut out), ImageFormat::Ico)
                    .map_err(|e| CodecError::Encode(format!("ICO encode failed: {e}")))?;
            }
        }
        Ok(out)
    }
}
