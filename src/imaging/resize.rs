//! Aspect-preserving downscale to a maximum width.

use image::DynamicImage;
use image::imageops::FilterType;

/// Downscale `img` so its width is at most `max_width`, preserving aspect
/// ratio. Images already within the bound pass through untouched — no
/// resample cost, no pixel churn.
///
/// Lanczos3 keeps downscale artifacts from skewing the later quality search.
pub fn resize_keep_ratio(img: DynamicImage, max_width: u32) -> DynamicImage {
    if img.width() <= max_width {
        return img;
    }
    let height = (img.height() as f64 * max_width as f64 / img.width() as f64).round() as u32;
    img.resize_exact(max_width, height.max(1), FilterType::Lanczos3)
}
