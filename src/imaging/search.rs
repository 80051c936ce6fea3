//! Quality search engine.
//!
//! Given a decoded image and the active policy, find the encoding parameter
//! that satisfies it:
//!
//! - **Quality priority**: one encode at the quality floor; the size is
//!   whatever results.
//! - **Size priority**: bounded binary search over quality 10..=100 for the
//!   highest quality whose output fits under the size ceiling. The size goal
//!   overrides the user-visible quality floor (treated as 1).
//!
//! Formats with no tunable size/quality axis (PNG, TIFF, BMP and anything
//! else lossless or uncompressed) always take a single fixed-parameter
//! encode; their mode input is ignored.
//!
//! Probes encode in memory and the accepted probe's bytes are retained in
//! the result, so the reported size is byte-exact for what the driver
//! writes out.

use super::codec::{Codec, CodecError};
use crate::cancel::CancelToken;
use crate::format::FormatFamily;
use crate::policy::{EncodingPolicy, PolicyMode};
use image::DynamicImage;

/// A successful search: the achieved parameter, its exact output, and the
/// human-readable policy description for the log line.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub quality: u32,
    pub size_kb: f64,
    pub bytes: Vec<u8>,
    pub detail: String,
}

/// What a search run produced. A canceled search is neither a success nor a
/// failure; `NoFit` is a real outcome, never defaulted to a guessed quality.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(SearchResult),
    NoFit { last_attempted: u32 },
    Canceled,
}

/// Families where the quality parameter actually moves the output size.
fn is_tunable(family: FormatFamily) -> bool {
    matches!(
        family,
        FormatFamily::Jpeg | FormatFamily::WebP | FormatFamily::Avif
    )
}

fn kb(bytes: &[u8]) -> f64 {
    bytes.len() as f64 / 1024.0
}

/// Run the search for one image against one policy.
///
/// Errors out only when an encode fails before any fitting parameter was
/// found; a mid-search failure after a fit keeps the best-so-far.
pub fn find_encoding(
    codec: &dyn Codec,
    img: &DynamicImage,
    family: FormatFamily,
    policy: &EncodingPolicy,
    cancel: &CancelToken,
) -> Result<SearchOutcome, CodecError> {
    if !is_tunable(family) {
        let bytes = codec.encode(img, family, policy.min_quality)?;
        let size_kb = kb(&bytes);
        let tag = match family {
            FormatFamily::Png | FormatFamily::Tiff => "[무손실]",
            _ => "[무압축]",
        };
        let detail = format!("{tag} size={}KB", size_kb.round() as u64);
        return Ok(SearchOutcome::Found(SearchResult {
            quality: policy.min_quality,
            size_kb,
            bytes,
            detail,
        }));
    }

    match policy.mode {
        PolicyMode::QualityPriority => {
            let quality = policy.min_quality;
            let bytes = codec.encode(img, family, quality)?;
            let size_kb = kb(&bytes);
            let detail = format!(
                "[화질 우선] quality={quality}, size={}KB",
                size_kb.round() as u64
            );
            Ok(SearchOutcome::Found(SearchResult {
                quality,
                size_kb,
                bytes,
                detail,
            }))
        }
        PolicyMode::SizePriority => size_search(codec, img, family, policy, cancel),
    }
}

/// Binary search quality 10..=100 for the highest parameter whose encoded
/// output is within the size ceiling.
fn size_search(
    codec: &dyn Codec,
    img: &DynamicImage,
    family: FormatFamily,
    policy: &EncodingPolicy,
    cancel: &CancelToken,
) -> Result<SearchOutcome, CodecError> {
    // The size goal overrides the user-visible quality floor.
    let floor = 1u32;
    let ceiling_kb = policy.max_size_kb as f64;

    let (mut low, mut high) = (10u32, 100u32);
    let mut best: Option<(u32, Vec<u8>)> = None;
    let mut last_attempted = 0u32;

    while low <= high {
        if cancel.is_requested() {
            return Ok(SearchOutcome::Canceled);
        }
        let mid = (low + high) / 2;
        if mid < floor {
            low = mid + 1;
            continue;
        }

        last_attempted = mid;
        let bytes = match codec.encode(img, family, mid) {
            Ok(bytes) => bytes,
            // A fit already in hand wins over a later probe failure;
            // otherwise the failure is the caller's to handle.
            Err(_) if best.is_some() => break,
            Err(e) => return Err(e),
        };

        if kb(&bytes) <= ceiling_kb {
            best = Some((mid, bytes));
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    match best {
        Some((quality, bytes)) => {
            let size_kb = kb(&bytes);
            let detail = format!(
                "[용량 우선] quality={quality}, size={}KB",
                size_kb.round() as u64
            );
            Ok(SearchOutcome::Found(SearchResult {
                quality,
                size_kb,
                bytes,
                detail,
            }))
        }
        None => Ok(SearchOutcome::NoFit { last_attempted }),
    }
}
