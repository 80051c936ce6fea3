//! AVIF container probe and AV1 decode.
//!
//! The `image` crate's `"avif"` feature only provides the encoder (rav1e).
//! Decoding would need `"avif-native"` and the C library dav1d. Instead the
//! container is parsed with `avif-parse` and the primary AV1 item is decoded
//! with `rav1d` (pure Rust port of dav1d), followed by a BT.601 YUV→RGB
//! conversion. Both entry points take the file's bytes; the caller owns the
//! read.

use super::codec::CodecError;
use image::DynamicImage;

/// Read the primary item's dimensions from the container metadata alone —
/// no AV1 decode.
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), CodecError> {
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(data))
        .map_err(|e| CodecError::Decode(format!("AVIF container parse failed: {e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| CodecError::Decode(format!("AVIF metadata read failed: {e:?}")))?;
    Ok((meta.max_frame_width.get(), meta.max_frame_height.get()))
}

/// Decode the primary item to RGB8.
pub fn decode(data: &[u8]) -> Result<DynamicImage, CodecError> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(data))
        .map_err(|e| CodecError::Decode(format!("AVIF container parse failed: {e:?}")))?;
    let av1_bytes: &[u8] = &avif.primary_item;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe {
        rav1d::src::lib::dav1d_default_settings(NonNull::new(settings.as_mut_ptr()).unwrap())
    };
    let mut settings = unsafe { settings.assume_init() };
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(CodecError::Decode(format!("rav1d open failed ({})", rc.0)));
    }

    let mut av1_data = Dav1dData::default();
    let buf_ptr = unsafe {
        rav1d::src::lib::dav1d_data_create(NonNull::new(&mut av1_data), av1_bytes.len())
    };
    if buf_ptr.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(CodecError::Decode("rav1d data_create failed".into()));
    }
    unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf_ptr, av1_bytes.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut av1_data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut av1_data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(CodecError::Decode(format!(
            "rav1d send_data failed ({})",
            rc.0
        )));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(CodecError::Decode(format!(
            "rav1d get_picture failed ({})",
            rc.0
        )));
    }

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;
    let layout = pic.p.layout;

    let luma = Plane {
        base: pic.data[0].unwrap().as_ptr() as *const u8,
        stride: pic.stride[0],
        bpc,
    };
    let chroma = if layout == DAV1D_PIXEL_LAYOUT_I400 {
        None
    } else {
        let (shift_x, shift_y) = match layout {
            DAV1D_PIXEL_LAYOUT_I420 => (1, 1),
            DAV1D_PIXEL_LAYOUT_I422 => (1, 0),
            DAV1D_PIXEL_LAYOUT_I444 => (0, 0),
            _ => {
                unsafe {
                    rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
                    rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
                }
                return Err(CodecError::Decode(format!(
                    "unsupported AVIF pixel layout: {layout}"
                )));
            }
        };
        Some(ChromaPair {
            cb: Plane {
                base: pic.data[1].unwrap().as_ptr() as *const u8,
                stride: pic.stride[1],
                bpc,
            },
            cr: Plane {
                base: pic.data[2].unwrap().as_ptr() as *const u8,
                stride: pic.stride[1],
                bpc,
            },
            shift_x,
            shift_y,
        })
    };

    let rgb = interleave_rgb(width, height, &luma, chroma.as_ref());

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| CodecError::Decode("decoded AVIF plane data has wrong length".into()))
}

/// One decoded plane as rav1d lays it out: base pointer, byte stride, and
/// the bit depth that decides whether samples are `u8` or `u16` cells.
#[derive(Clone, Copy)]
struct Plane {
    base: *const u8,
    stride: isize,
    bpc: u32,
}

impl Plane {
    /// Sample at (`x`, `y`), scaled down to the 0..=255 range.
    ///
    /// Callers must keep coordinates inside the picture; rav1d guarantees
    /// the plane is at least stride × height bytes.
    #[inline]
    fn get(&self, x: u32, y: u32) -> i32 {
        if self.bpc <= 8 {
            (unsafe { *self.base.offset(y as isize * self.stride + x as isize) }) as i32
        } else {
            // 10-bit and 12-bit samples occupy u16 cells
            let offset = y as isize * self.stride + x as isize * 2;
            let raw = (unsafe { *(self.base.offset(offset) as *const u16) }) as u32;
            let max = (1u32 << self.bpc) - 1;
            ((raw * 255 + max / 2) / max) as i32
        }
    }
}

/// Cb/Cr planes plus their log2 subsampling relative to luma
/// (I420 = 1/1, I422 = 1/0, I444 = 0/0).
struct ChromaPair {
    cb: Plane,
    cr: Plane,
    shift_x: u32,
    shift_y: u32,
}

const FIX_BITS: i32 = 14;
const HALF: i32 = 1 << (FIX_BITS - 1);

/// Clamp a 14-bit fixed-point channel value into a display byte.
#[inline]
fn fixed_to_u8(v: i32) -> u8 {
    ((v + HALF) >> FIX_BITS).clamp(0, 255) as u8
}

/// Interleave the planes into packed RGB8.
///
/// Color conversion is BT.601 full-range in 14-bit fixed point; a missing
/// chroma pair means a monochrome picture and luma is replicated.
fn interleave_rgb(width: u32, height: u32, luma: &Plane, chroma: Option<&ChromaPair>) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);

    for row in 0..height {
        for col in 0..width {
            let y = luma.get(col, row);
            match chroma {
                None => {
                    let v = y.clamp(0, 255) as u8;
                    rgb.extend_from_slice(&[v, v, v]);
                }
                Some(pair) => {
                    let cx = col >> pair.shift_x;
                    let cy = row >> pair.shift_y;
                    let cb = pair.cb.get(cx, cy) - 128;
                    let cr = pair.cr.get(cx, cy) - 128;

                    // BT.601: R = Y + 1.402 Cr, G = Y - 0.344 Cb - 0.714 Cr,
                    // B = Y + 1.772 Cb, coefficients scaled by 2^14
                    let y = y << FIX_BITS;
                    rgb.extend_from_slice(&[
                        fixed_to_u8(y + 22970 * cr),
                        fixed_to_u8(y - 5638 * cb - 11700 * cr),
                        fixed_to_u8(y + 29032 * cb),
                    ]);
                }
            }
        }
    }

    rgb
}
