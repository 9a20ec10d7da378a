//! Owns the destination canvas for one build and pastes transformed images
//! in template order.

use image::{DynamicImage, Pixel, Rgba, RgbImage, RgbaImage, imageops};
use tracing::trace;

use crate::geometry::CanvasSize;
use crate::style::{Background, StyleConfig};
use crate::transform::{PlacedImage, TransformedImage};

/// Peak alpha of the background wash, as a fraction of full opacity.
pub const GRADIENT_PEAK: f32 = 0.1;

/// Output of [`Compositor::finalize`].
#[derive(Debug, Clone)]
pub struct FlattenedImage {
    pub image: DynamicImage,
}

impl FlattenedImage {
    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

#[derive(Debug)]
pub struct Compositor {
    canvas: RgbaImage,
    background: Background,
    pasted: Vec<PlacedImage>,
}

impl Compositor {
    pub fn new(size: CanvasSize, style: &StyleConfig) -> Self {
        let canvas = match style.background {
            Background::Transparent => RgbaImage::new(size.width, size.height),
            Background::Solid(color) => {
                let mut canvas = RgbaImage::from_pixel(size.width, size.height, color.rgba());
                if style.gradient {
                    apply_gradient(&mut canvas);
                }
                canvas
            }
        };
        Self {
            canvas,
            background: style.background,
            pasted: Vec::new(),
        }
    }

    /// Alpha-blend `image` at its paste offset. Parts outside the canvas are
    /// clipped; later pastes cover earlier ones.
    pub fn paste(&mut self, image: &TransformedImage) {
        let (x, y) = image.placed.paste_offset;
        trace!(index = image.placed.index, x, y, "paste");
        imageops::overlay(&mut self.canvas, &image.pixels, x, y);
        self.pasted.push(image.placed.clone());
    }

    /// Every placement made so far, in paste order.
    pub fn placed(&self) -> &[PlacedImage] {
        &self.pasted
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Keep alpha for transparent backgrounds, otherwise flatten onto the
    /// opaque background color.
    pub fn finalize(self) -> FlattenedImage {
        let image = match self.background {
            Background::Transparent => DynamicImage::ImageRgba8(self.canvas),
            Background::Solid(color) => {
                let [r, g, b, _] = color.0;
                let base = Rgba([r, g, b, 255]);
                let mut out = RgbImage::new(self.canvas.width(), self.canvas.height());
                for (dst, src) in out.pixels_mut().zip(self.canvas.pixels()) {
                    let mut px = base;
                    px.blend(src);
                    *dst = px.to_rgb();
                }
                DynamicImage::ImageRgb8(out)
            }
        };
        FlattenedImage { image }
    }
}

/// White wash fading from `GRADIENT_PEAK` at the top to nothing at the bottom.
fn apply_gradient(canvas: &mut RgbaImage) {
    let h = canvas.height().max(1) as f32;
    for (_, y, px) in canvas.enumerate_pixels_mut() {
        let alpha = (255.0 * (1.0 - y as f32 / h) * GRADIENT_PEAK) as u8;
        if alpha > 0 {
            px.blend(&Rgba([255, 255, 255, alpha]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PixelBox;
    use crate::style::{Color, RotationRange};

    fn style(background: Background) -> StyleConfig {
        StyleConfig {
            background,
            gradient: false,
            rotation_range: RotationRange::NONE,
            border_width_px: 0,
            border_color: Color::WHITE,
            shadow: false,
        }
    }

    fn block(index: usize, offset: (i64, i64), size: u32, color: [u8; 4]) -> TransformedImage {
        TransformedImage {
            placed: PlacedImage {
                index,
                source_ref: format!("img{index}"),
                cell: PixelBox {
                    x: offset.0.max(0) as u32,
                    y: offset.1.max(0) as u32,
                    w: size,
                    h: size,
                },
                rotation_deg: 0.0,
                scale: 1.0,
                final_size: (size, size),
                paste_offset: offset,
            },
            pixels: RgbaImage::from_pixel(size, size, Rgba(color)),
        }
    }

    #[test]
    fn later_paste_wins_on_overlap() {
        let mut comp = Compositor::new(CanvasSize::new(50, 50), &style(Background::Solid(Color::WHITE)));
        comp.paste(&block(0, (0, 0), 30, [255, 0, 0, 255]));
        comp.paste(&block(1, (20, 20), 30, [0, 0, 255, 255]));
        assert_eq!(*comp.canvas().get_pixel(25, 25), Rgba([0, 0, 255, 255]));
        assert_eq!(*comp.canvas().get_pixel(5, 5), Rgba([255, 0, 0, 255]));
        assert_eq!(comp.placed().len(), 2);
    }

    #[test]
    fn out_of_canvas_offsets_are_clipped() {
        let mut comp = Compositor::new(CanvasSize::new(20, 20), &style(Background::Transparent));
        comp.paste(&block(0, (-10, -10), 15, [0, 255, 0, 255]));
        comp.paste(&block(1, (15, 15), 15, [0, 0, 255, 255]));
        assert_eq!(*comp.canvas().get_pixel(0, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*comp.canvas().get_pixel(19, 19), Rgba([0, 0, 255, 255]));
        assert_eq!(comp.canvas().get_pixel(10, 10)[3], 0);
    }

    #[test]
    fn finalize_keeps_alpha_only_for_transparent_backgrounds() {
        let clear = Compositor::new(CanvasSize::new(8, 8), &style(Background::Transparent)).finalize();
        assert!(clear.has_alpha());
        let solid = Compositor::new(CanvasSize::new(8, 8), &style(Background::Solid(Color::BLACK)))
            .finalize();
        assert!(!solid.has_alpha());
        assert_eq!(solid.dimensions(), (8, 8));
    }

    #[test]
    fn gradient_brightens_the_top_row_only() {
        let mut s = style(Background::Solid(Color::BLACK));
        s.gradient = true;
        let comp = Compositor::new(CanvasSize::new(4, 100), &s);
        assert!(comp.canvas().get_pixel(0, 0)[0] > 0);
        assert_eq!(comp.canvas().get_pixel(0, 99)[0], 0);
    }
}
