//! Image decode, resize, encode, and the quality search.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::image_dimensions` / `avif-parse` |
//! | **Decode** | `image` crate decoders, `rav1d` for AVIF |
//! | **Orientation** | `kamadak-exif` tag + `image` rotate/flip |
//! | **Resize** | Lanczos3 downscale to a max width |
//! | **Encode** | per-format `image` encoders, lossy `webp` |
//!
//! The module is split into:
//! - **Codec**: [`Codec`] trait + [`RustCodec`] + error taxonomy
//! - **AVIF**: container probe and AV1 decode
//! - **Resize**: the one supported transform
//! - **Search**: quality-priority / size-priority parameter search

pub mod avif;
pub mod codec;
pub mod resize;
pub mod rust_codec;
pub mod search;

pub use codec::{Codec, CodecError, SourceInfo};
pub use resize::resize_keep_ratio;
pub use rust_codec::RustCodec;
pub use search::{SearchOutcome, SearchResult, find_encoding};
