//! Per-image transform chain: fit-scale, drop shadow, border, rotation, and
//! re-centering inside the allotted cell.

use fast_image_resize as fir;
use image::{Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::geometry::{PixelBox, fit_scale, paste_offset, scaled_size};
use crate::style::{RotationRange, StyleConfig};

pub const SHADOW_BLUR_RADIUS: u32 = 3;
pub const SHADOW_OFFSET: (u32, u32) = (4, 4);
pub const SHADOW_OPACITY: u8 = 40;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Resolved geometry for one image in one build, shared by the raster and
/// markup outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlacedImage {
    /// Position of the image in the caller's input sequence.
    pub index: usize,
    pub source_ref: String,
    pub cell: PixelBox,
    pub rotation_deg: f32,
    pub scale: f64,
    pub final_size: (u32, u32),
    pub paste_offset: (i64, i64),
}

/// A placed image together with the pixels to paste.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub placed: PlacedImage,
    pub pixels: RgbaImage,
}

/// Draw a rotation uniformly from the inclusive range.
pub fn draw_rotation(range: RotationRange, rng: &mut impl Rng) -> f32 {
    if range.min_deg >= range.max_deg {
        return range.min_deg;
    }
    rng.random_range(range.min_deg..=range.max_deg)
}

/// Run the full chain for one source image.
///
/// Returns `Ok(None)` when the cell is degenerate; nothing should be pasted.
pub fn transform(
    index: usize,
    source_ref: &str,
    source: &RgbaImage,
    cell: PixelBox,
    style: &StyleConfig,
    rotation_deg: f32,
) -> Result<Option<TransformedImage>> {
    let scale = fit_scale(source.dimensions(), cell);
    if scale <= 0.0 {
        return Ok(None);
    }

    let mut pixels = if scale < 1.0 {
        let (w, h) = scaled_size(source.dimensions(), scale);
        resize_rgba(source, w, h)?
    } else {
        source.clone()
    };

    if style.shadow {
        pixels = add_drop_shadow(&pixels);
    }
    if style.border_width_px > 0 {
        pixels = add_border(&pixels, style.border_width_px, style.border_color.rgba());
    }
    pixels = rotate_expand(&pixels, rotation_deg);

    let final_size = pixels.dimensions();
    let offset = paste_offset(cell, final_size);
    trace!(index, scale, rotation_deg, ?final_size, ?offset, "transformed image");

    Ok(Some(TransformedImage {
        placed: PlacedImage {
            index,
            source_ref: source_ref.to_string(),
            cell,
            rotation_deg,
            scale,
            final_size,
            paste_offset: offset,
        },
        pixels,
    }))
}

/// Lanczos resample through `fast_image_resize`.
pub fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    if target_w == 0 || target_h == 0 {
        return Err(Error::Resize("resize dimensions must be positive".into()));
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| Error::Resize(format!("source view: {err}")))?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options =
        fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| Error::Resize(err.to_string()))?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| Error::Resize("resized buffer has unexpected length".into()))
}

/// Soft dark rectangle offset behind the image. Grows the canvas by the
/// blur radius plus the offset on the right and bottom.
pub fn add_drop_shadow(image: &RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let (ox, oy) = SHADOW_OFFSET;
    let mut layer = RgbaImage::from_pixel(
        w + ox + SHADOW_BLUR_RADIUS,
        h + oy + SHADOW_BLUR_RADIUS,
        TRANSPARENT,
    );
    let shade = Rgba([0, 0, 0, SHADOW_OPACITY]);
    for y in oy..oy + h {
        for x in ox..ox + w {
            layer.put_pixel(x, y, shade);
        }
    }
    let mut layer = imageops::blur(&layer, SHADOW_BLUR_RADIUS as f32);
    imageops::overlay(&mut layer, image, 0, 0);
    layer
}

/// Solid frame of `width` pixels on every side.
pub fn add_border(image: &RgbaImage, width: u32, color: Rgba<u8>) -> RgbaImage {
    let (w, h) = image.dimensions();
    let mut framed = RgbaImage::from_pixel(w + 2 * width, h + 2 * width, color);
    imageops::overlay(&mut framed, image, width as i64, width as i64);
    framed
}

/// Bounding box of a `w`×`h` rectangle rotated by `degrees`.
pub fn rotated_bounds(w: u32, h: u32, degrees: f32) -> (u32, u32) {
    let theta = (degrees as f64).to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let bw = (w as f64 * cos + h as f64 * sin - 1e-6).ceil().max(1.0);
    let bh = (w as f64 * sin + h as f64 * cos - 1e-6).ceil().max(1.0);
    (bw as u32, bh as u32)
}

/// Clockwise rotation with bicubic resampling. The result is exactly the
/// rotated bounding box; uncovered pixels are transparent.
pub fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    if degrees == 0.0 {
        return image.clone();
    }
    let (w, h) = image.dimensions();
    let (bw, bh) = rotated_bounds(w, h, degrees);
    // work area holding both the source and its rotated bounds
    let (pw, ph) = (bw.max(w), bh.max(h));
    let mut padded = RgbaImage::from_pixel(pw, ph, TRANSPARENT);
    imageops::replace(&mut padded, image, ((pw - w) / 2) as i64, ((ph - h) / 2) as i64);
    let rotated = rotate_about_center(
        &padded,
        degrees.to_radians(),
        Interpolation::Bicubic,
        TRANSPARENT,
    );
    if (pw, ph) == (bw, bh) {
        return rotated;
    }
    imageops::crop_imm(&rotated, (pw - bw) / 2, (ph - bh) / 2, bw, bh).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Background, Color};

    fn plain_style() -> StyleConfig {
        StyleConfig {
            background: Background::Solid(Color::WHITE),
            gradient: false,
            rotation_range: RotationRange::NONE,
            border_width_px: 0,
            border_color: Color::WHITE,
            shadow: false,
        }
    }

    fn cell(x: u32, y: u32, w: u32, h: u32) -> PixelBox {
        PixelBox { x, y, w, h }
    }

    #[test]
    fn small_image_is_not_resized() {
        let src = RgbaImage::from_pixel(40, 20, Rgba([9, 9, 9, 255]));
        let out = transform(0, "a", &src, cell(0, 0, 100, 100), &plain_style(), 0.0)
            .unwrap()
            .expect("placed");
        assert_eq!(out.placed.scale, 1.0);
        assert_eq!(out.placed.final_size, (40, 20));
        assert_eq!(out.placed.paste_offset, (30, 40));
    }

    #[test]
    fn large_image_is_shrunk_to_limiting_axis() {
        let src = RgbaImage::from_pixel(400, 200, Rgba([9, 9, 9, 255]));
        let out = transform(0, "a", &src, cell(10, 10, 100, 100), &plain_style(), 0.0)
            .unwrap()
            .expect("placed");
        assert_eq!(out.pixels.dimensions(), (100, 50));
        assert_eq!(out.placed.paste_offset, (10, 35));
    }

    #[test]
    fn degenerate_cell_yields_nothing() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
        let out = transform(0, "a", &src, cell(0, 0, 0, 30), &plain_style(), 0.0).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn shadow_and_border_grow_the_image() {
        let mut style = plain_style();
        style.shadow = true;
        style.border_width_px = 4;
        let src = RgbaImage::from_pixel(50, 30, Rgba([200, 0, 0, 255]));
        let out = transform(0, "a", &src, cell(0, 0, 200, 200), &style, 0.0)
            .unwrap()
            .expect("placed");
        let grow = SHADOW_OFFSET.0 + SHADOW_BLUR_RADIUS;
        assert_eq!(out.placed.final_size, (50 + grow + 8, 30 + grow + 8));
        // frame pixel
        assert_eq!(*out.pixels.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        // image pixel just inside the frame
        assert_eq!(*out.pixels.get_pixel(4, 4), Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn shadow_is_translucent_and_dark() {
        let src = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let out = add_drop_shadow(&src);
        let corner = out.get_pixel(out.width() - 4, out.height() - 4);
        assert!(corner[3] > 0 && corner[3] < SHADOW_OPACITY + 1);
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn rotation_expands_without_cropping() {
        let src = RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255]));
        let out = rotate_expand(&src, 90.0);
        assert_eq!(out.dimensions(), (50, 100));
        assert_eq!(out.get_pixel(25, 50)[3], 255);
        let out = rotate_expand(&src, 10.0);
        assert_eq!(out.dimensions(), rotated_bounds(100, 50, 10.0));
        assert!(out.width() > 100 && out.height() > 50);
        // corners of the expanded canvas stay transparent
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn quarter_turn_reports_the_tight_bounds() {
        let src = RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255]));
        let out = transform(0, "a", &src, cell(0, 0, 300, 300), &plain_style(), -90.0)
            .unwrap()
            .expect("placed");
        assert_eq!(out.placed.final_size, (50, 100));
        assert_eq!(out.pixels.dimensions(), out.placed.final_size);
        assert_eq!(out.placed.paste_offset, (125, 100));
    }

    #[test]
    fn rotated_image_is_centered_on_its_cell() {
        let src = RgbaImage::from_pixel(80, 80, Rgba([1, 2, 3, 255]));
        let out = transform(0, "a", &src, cell(100, 100, 80, 80), &plain_style(), 5.0)
            .unwrap()
            .expect("placed");
        let (fw, fh) = out.placed.final_size;
        assert!(fw > 80 && fh > 80);
        assert_eq!(
            out.placed.paste_offset,
            (100 + (80 - fw as i64).div_euclid(2), 100 + (80 - fh as i64).div_euclid(2))
        );
    }

    #[test]
    fn draw_rotation_stays_in_range() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);
        let range = RotationRange::symmetric(3.0);
        for _ in 0..100 {
            let r = draw_rotation(range, &mut rng);
            assert!((-3.0..=3.0).contains(&r));
        }
        assert_eq!(draw_rotation(RotationRange::NONE, &mut rng), 0.0);
    }
}
