//! Pure geometry: normalized cell ratios to pixel boxes, shrink-only fit
//! scaling, and re-centering of transformed images inside their cells.

use serde::{Deserialize, Serialize};

/// Overflow tolerated past the right/bottom canvas edge for bleed cells.
pub const CELL_BLEED_EPSILON: f64 = 0.05;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<[u32; 2]> for CanvasSize {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<CanvasSize> for [u32; 2] {
    fn from(size: CanvasSize) -> Self {
        [size.width, size.height]
    }
}

/// A cell rectangle relative to the canvas, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct CellRatio {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl CellRatio {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Check the ratio invariant, returning a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(self.x) && in_unit(self.y) && in_unit(self.w) && in_unit(self.h)) {
            return Err(format!("{self:?} has components outside [0, 1]"));
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(format!("{self:?} has an empty extent"));
        }
        if self.x + self.w > 1.0 + CELL_BLEED_EPSILON || self.y + self.h > 1.0 + CELL_BLEED_EPSILON
        {
            return Err(format!("{self:?} runs off the canvas"));
        }
        Ok(())
    }
}

impl From<[f64; 4]> for CellRatio {
    fn from([x, y, w, h]: [f64; 4]) -> Self {
        Self { x, y, w, h }
    }
}

impl From<CellRatio> for [f64; 4] {
    fn from(r: CellRatio) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

/// Integer pixel rectangle. `w`/`h` of zero means the cell degenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelBox {
    pub fn is_degenerate(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Coarse aspect classification used as an optional placement hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn classify(width: u32, height: u32) -> Self {
        if height == 0 {
            return Self::Landscape;
        }
        let aspect = width as f64 / height as f64;
        if aspect > 1.1 {
            Self::Landscape
        } else if aspect < 0.9 {
            Self::Portrait
        } else {
            Self::Square
        }
    }
}

/// Scale a cell ratio to the canvas, truncating, then shrink the extent by
/// twice the border width on each axis (floored at zero).
pub fn ratios_to_pixel_box(ratio: CellRatio, canvas: CanvasSize, border_width_px: u32) -> PixelBox {
    let cw = canvas.width as f64;
    let ch = canvas.height as f64;
    let inset = border_width_px.saturating_mul(2);
    PixelBox {
        x: (ratio.x * cw) as u32,
        y: (ratio.y * ch) as u32,
        w: ((ratio.w * cw) as u32).saturating_sub(inset),
        h: ((ratio.h * ch) as u32).saturating_sub(inset),
    }
}

/// Shrink-only, aspect-preserving scale of `source` into `target`.
///
/// Returns `1.0` when the source already fits, `0.0` when the target (or the
/// source) is empty, otherwise the smaller of the two axis ratios.
pub fn fit_scale(source: (u32, u32), target: PixelBox) -> f64 {
    let (sw, sh) = source;
    if target.is_degenerate() || sw == 0 || sh == 0 {
        return 0.0;
    }
    if sw <= target.w && sh <= target.h {
        return 1.0;
    }
    let sx = target.w as f64 / sw as f64;
    let sy = target.h as f64 / sh as f64;
    sx.min(sy)
}

/// Integer size after applying `scale`, never below one pixel on either axis.
pub fn scaled_size(source: (u32, u32), scale: f64) -> (u32, u32) {
    let w = ((source.0 as f64) * scale).floor().max(1.0);
    let h = ((source.1 as f64) * scale).floor().max(1.0);
    (w as u32, h as u32)
}

/// Top-left paste position centering an image of `final_size` in `cell`.
///
/// The result goes negative (or past the cell) when the image is larger than
/// its cell, e.g. after expand-on-rotate.
pub fn paste_offset(cell: PixelBox, final_size: (u32, u32)) -> (i64, i64) {
    let dx = (cell.w as i64 - final_size.0 as i64).div_euclid(2);
    let dy = (cell.h as i64 - final_size.1 as i64).div_euclid(2);
    (cell.x as i64 + dx, cell.y as i64 + dy)
}
