//! Format families and extension handling.
//!
//! All format reasoning in the crate goes through two types:
//!
//! - [`OutputFormat`] — what the operator asked for (`--format jpeg`, or
//!   `KeepOriginal` to re-encode each file in its own format).
//! - [`FormatFamily`] — the canonical grouping of extension aliases. `jpg`
//!   and `jpeg` are one family, `webp` and `WebP` are one family. The
//!   shortcut classifier compares families, never raw extensions.
//!
//! The recognized-extension set is unified for list adds and directory
//! expansion (the original tool used a narrower set for expansion).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions accepted when adding files to the pending list or expanding a
/// directory one level deep.
pub const RECOGNIZED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "avif", "gif", "ico",
];

/// Returns true when the path's extension is a recognized image extension.
pub fn is_recognized(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RECOGNIZED_EXTENSIONS.iter().any(|r| e.eq_ignore_ascii_case(r)))
}

/// Canonical grouping of extension aliases.
///
/// Families exist so that `photo.jpeg` counts as "already JPEG" when the
/// output format is JPEG, and so the pending list can display a stable
/// format name regardless of which alias the file used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFamily {
    Jpeg,
    Png,
    WebP,
    Avif,
    Tiff,
    Bmp,
    Gif,
    Ico,
}

impl FormatFamily {
    /// Derive the family from a file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "avif" => Some(Self::Avif),
            "tif" | "tiff" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }

    /// Derive the family from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension for this family (JPEG family collapses to `jpg`).
    pub fn canonical_extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Avif => "avif",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Ico => "ico",
        }
    }

    /// Display name used in the pending list's format column.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Avif => "AVIF",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Ico => "ICO",
        }
    }
}

impl fmt::Display for FormatFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The operator-selected output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    #[serde(rename = "webp")]
    WebP,
    Avif,
    Tiff,
    Bmp,
    /// Re-encode each file in its own source format.
    #[serde(rename = "keep")]
    #[clap(name = "keep")]
    KeepOriginal,
}

impl OutputFormat {
    /// Resolve the concrete family an item will be written as.
    ///
    /// `KeepOriginal` resolves to the source's own family, so it always
    /// family-matches in the shortcut classifier.
    pub fn resolve_family(self, source: FormatFamily) -> FormatFamily {
        match self {
            Self::Jpeg => FormatFamily::Jpeg,
            Self::Png => FormatFamily::Png,
            Self::WebP => FormatFamily::WebP,
            Self::Avif => FormatFamily::Avif,
            Self::Tiff => FormatFamily::Tiff,
            Self::Bmp => FormatFamily::Bmp,
            Self::KeepOriginal => source,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WebP",
            Self::Avif => "AVIF",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
            Self::KeepOriginal => "keep",
        };
        f.write_str(name)
    }
}

/// Derive the destination path for a source file.
///
/// The name is the source stem plus the canonical extension of the resolved
/// output family; `KeepOriginal` on a `.jpeg` source therefore still lands on
/// `.jpg` (the JPEG family has one canonical spelling on disk).
pub fn destination_path(source: &Path, dest_dir: &Path, resolved: FormatFamily) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest_dir.join(format!("{}.{}", stem, resolved.canonical_extension()))
}
