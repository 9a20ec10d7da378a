//! Structured (HTML/CSS) twin of the raster collage.
//!
//! Elements are built from the same [`PlacedImage`] records the compositor
//! consumed, so cell boxes and rotation angles match the raster output
//! exactly. Sources point at the original images; border, shadow and rotation
//! are declared in CSS rather than baked into pixels.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::Template;
use crate::compositor::GRADIENT_PEAK;
use crate::geometry::{CanvasSize, PixelBox};
use crate::style::{Background, Color, StyleConfig};
use crate::transform::{PlacedImage, SHADOW_BLUR_RADIUS, SHADOW_OFFSET, SHADOW_OPACITY};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarkupBorder {
    pub width_px: u32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarkupElement {
    pub index: usize,
    pub source: String,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub rotation_deg: f32,
    pub border: Option<MarkupBorder>,
    pub shadow: bool,
}

impl MarkupElement {
    pub fn cell(&self) -> PixelBox {
        PixelBox {
            x: self.left,
            y: self.top,
            w: self.width,
            h: self.height,
        }
    }

    fn css(&self) -> String {
        let mut parts = vec![
            format!("left: {}px", self.left),
            format!("top: {}px", self.top),
            format!("width: {}px", self.width),
            format!("height: {}px", self.height),
            format!("transform: rotate({}deg)", self.rotation_deg),
            "object-fit: scale-down".to_string(),
        ];
        if let Some(border) = &self.border {
            parts.push(format!("border: {}px solid {}", border.width_px, border.color.css()));
        }
        if self.shadow {
            parts.push(format!(
                "box-shadow: {}px {}px {}px {}",
                SHADOW_OFFSET.0,
                SHADOW_OFFSET.1,
                SHADOW_BLUR_RADIUS,
                Color([0, 0, 0, SHADOW_OPACITY]).css()
            ));
        }
        parts.join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MarkupDescription {
    pub template: String,
    pub width: u32,
    pub height: u32,
    pub background: Background,
    pub gradient: bool,
    pub elements: Vec<MarkupElement>,
}

/// Build the layout description for the images that were actually placed.
pub fn emit(
    template: &Template,
    placed: &[PlacedImage],
    canvas: CanvasSize,
    style: &StyleConfig,
) -> MarkupDescription {
    let border = (style.border_width_px > 0).then_some(MarkupBorder {
        width_px: style.border_width_px,
        color: style.border_color,
    });
    let elements = placed
        .iter()
        .map(|p| MarkupElement {
            index: p.index,
            source: p.source_ref.clone(),
            left: p.cell.x,
            top: p.cell.y,
            width: p.cell.w,
            height: p.cell.h,
            rotation_deg: p.rotation_deg,
            border: border.clone(),
            shadow: style.shadow,
        })
        .collect();
    MarkupDescription {
        template: template.name.clone(),
        width: canvas.width,
        height: canvas.height,
        background: style.background,
        gradient: style.gradient && !style.is_transparent(),
        elements,
    }
}

impl MarkupDescription {
    /// Standalone HTML page with a heading and one absolutely positioned
    /// `<img>` per element.
    pub fn to_html(&self, title: &str) -> String {
        self.to_html_with(title, |el| el.source.clone())
    }

    /// Like [`to_html`](Self::to_html), with `src` attributes produced by
    /// `resolve_src` instead of the stored source reference.
    pub fn to_html_with(&self, title: &str, resolve_src: impl Fn(&MarkupElement) -> String) -> String {
        let title = escape_html(title);
        let mut background = match self.background {
            Background::Transparent => "background-color: transparent".to_string(),
            Background::Solid(c) => format!("background-color: {}", c.css()),
        };
        if self.gradient {
            let _ = write!(
                background,
                "; background-image: linear-gradient(to bottom, {}, {})",
                Color([255, 255, 255, (255.0 * GRADIENT_PEAK) as u8]).css(),
                Color([255, 255, 255, 0]).css()
            );
        }

        let mut html = String::new();
        let _ = writeln!(html, "<!DOCTYPE html>");
        let _ = writeln!(html, "<html>");
        let _ = writeln!(html, "<head>");
        let _ = writeln!(html, "    <meta charset=\"UTF-8\">");
        let _ = writeln!(html, "    <title>{title}</title>");
        let _ = writeln!(html, "    <style>");
        let _ = writeln!(
            html,
            "        body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; text-align: center; }}"
        );
        let _ = writeln!(
            html,
            "        .collage-container {{ position: relative; width: {}px; height: {}px; {}; margin: 0 auto; overflow: hidden; }}",
            self.width, self.height, background
        );
        let _ = writeln!(
            html,
            "        .collage-image {{ position: absolute; box-sizing: border-box; }}"
        );
        let _ = writeln!(html, "    </style>");
        let _ = writeln!(html, "</head>");
        let _ = writeln!(html, "<body>");
        let _ = writeln!(html, "    <h1>{title}</h1>");
        let _ = writeln!(
            html,
            "    <div class=\"collage-container\" data-template=\"{}\">",
            escape_html(&self.template)
        );
        for el in &self.elements {
            let _ = writeln!(
                html,
                "        <img class=\"collage-image\" src=\"{}\" alt=\"Collage image {}\" style=\"{}\">",
                escape_html(&resolve_src(el)),
                el.index + 1,
                el.css()
            );
        }
        let _ = writeln!(html, "    </div>");
        let _ = writeln!(html, "</body>");
        let _ = write!(html, "</html>");
        html
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CellRatio;
    use crate::style::StylePreset;

    fn placed(index: usize, cell: PixelBox, rotation_deg: f32) -> PlacedImage {
        PlacedImage {
            index,
            source_ref: format!("photos/{index}.jpg"),
            cell,
            rotation_deg,
            scale: 1.0,
            final_size: (cell.w, cell.h),
            paste_offset: (cell.x as i64, cell.y as i64),
        }
    }

    #[test]
    fn elements_mirror_placements() {
        let template = Template::new("Pair", "", vec![CellRatio::new(0.0, 0.0, 0.5, 1.0); 2]);
        let records = vec![
            placed(0, PixelBox { x: 0, y: 0, w: 42, h: 92 }, -1.25),
            placed(2, PixelBox { x: 50, y: 0, w: 42, h: 92 }, 2.5),
        ];
        let style = StylePreset::Modern.config();
        let markup = emit(&template, &records, CanvasSize::new(100, 100), &style);
        assert_eq!(markup.elements.len(), 2);
        for (el, p) in markup.elements.iter().zip(&records) {
            assert_eq!(el.cell(), p.cell);
            assert_eq!(el.rotation_deg, p.rotation_deg);
            assert_eq!(el.source, p.source_ref);
            assert_eq!(el.border.as_ref().map(|b| b.width_px), Some(4));
            assert!(el.shadow);
        }
        assert_eq!(markup.elements[1].index, 2);
    }

    #[test]
    fn html_declares_geometry_and_escapes_text() {
        let template = Template::new("Solo", "", vec![CellRatio::new(0.1, 0.1, 0.8, 0.8)]);
        let mut style = StylePreset::Minimal.config();
        style.border_width_px = 0;
        let markup = emit(
            &template,
            &[placed(0, PixelBox { x: 10, y: 12, w: 80, h: 70 }, 0.0)],
            CanvasSize::new(100, 100),
            &style,
        );
        let html = markup.to_html("Tom & Jerry <3");
        assert!(html.contains("<title>Tom &amp; Jerry &lt;3</title>"));
        assert!(html.contains("left: 10px; top: 12px; width: 80px; height: 70px; transform: rotate(0deg)"));
        assert!(!html.contains("border:"));
        assert!(html.contains("width: 100px; height: 100px; background-color: #000000"));
    }

    #[test]
    fn small_source_is_never_upscaled_by_css() {
        let template = Template::new("Solo", "", vec![CellRatio::new(0.1, 0.1, 0.8, 0.8)]);
        let cell = PixelBox { x: 120, y: 120, w: 956, h: 956 };
        let mut record = placed(0, cell, 0.0);
        record.final_size = (40, 20);
        let style = StylePreset::Minimal.config();
        let markup = emit(&template, &[record], CanvasSize::new(1200, 1200), &style);
        let html = markup.to_html("Small");
        assert!(html.contains("width: 956px; height: 956px"));
        assert!(html.contains("object-fit: scale-down"));
        assert!(!html.contains("object-fit: contain"));
    }

    #[test]
    fn resolver_rewrites_src_but_not_the_description() {
        let template = Template::new("Solo", "", vec![CellRatio::new(0.0, 0.0, 1.0, 1.0)]);
        let style = StylePreset::Minimal.config();
        let markup = emit(
            &template,
            &[placed(0, PixelBox { x: 0, y: 0, w: 10, h: 10 }, 0.0)],
            CanvasSize::new(10, 10),
            &style,
        );
        let html = markup.to_html_with("t", |el| format!("../{}", el.source));
        assert!(html.contains("src=\"../photos/0.jpg\""));
        assert_eq!(markup.elements[0].source, "photos/0.jpg");
    }
}
