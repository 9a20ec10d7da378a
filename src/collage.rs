//! One collage build: select a template, transform each image into its cell,
//! composite in template order, and emit the markup twin from the same
//! placements.

use image::RgbaImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{LayoutCatalog, Template, arrange_by_orientation};
use crate::compositor::{Compositor, FlattenedImage};
use crate::error::{Error, Result};
use crate::geometry::{CanvasSize, Orientation, PixelBox, ratios_to_pixel_box};
use crate::markup::{self, MarkupDescription};
use crate::style::StyleCatalog;
use crate::transform::{self, PlacedImage};

/// A decoded raster, or the reason the image source could not supply one.
#[derive(Debug, Clone)]
pub enum SourceImage {
    Loaded { reference: String, image: RgbaImage },
    Failed { reference: String, reason: String },
}

impl SourceImage {
    pub fn loaded(reference: impl Into<String>, image: RgbaImage) -> Self {
        Self::Loaded {
            reference: reference.into(),
            image,
        }
    }

    pub fn failed(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::Loaded { reference, .. } | Self::Failed { reference, .. } => reference,
        }
    }

    fn orientation(&self) -> Option<Orientation> {
        match self {
            Self::Loaded { image, .. } => Some(Orientation::classify(image.width(), image.height())),
            Self::Failed { .. } => None,
        }
    }
}

/// Recovered, per-image conditions collected during a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Diagnostic {
    /// The image source reported a failure; the slot stays empty.
    ImageLoadFailed {
        index: usize,
        reference: String,
        reason: String,
    },
    /// The cell has zero area after border subtraction; the image is skipped.
    DegenerateCell {
        index: usize,
        reference: String,
        cell: PixelBox,
    },
    /// The template has fewer cells than images were supplied.
    Unplaced { index: usize, reference: String },
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub canvas: CanvasSize,
    pub style: String,
    pub seed: Option<u64>,
    pub orientation_hint: bool,
}

impl BuildOptions {
    pub fn new(canvas: CanvasSize, style: impl Into<String>) -> Self {
        Self {
            canvas,
            style: style.into(),
            seed: None,
            orientation_hint: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_orientation_hint(mut self, enabled: bool) -> Self {
        self.orientation_hint = enabled;
        self
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct Collage {
    pub image: FlattenedImage,
    pub markup: MarkupDescription,
    pub placed: Vec<PlacedImage>,
    pub template: Template,
    /// `true` when the catalog had no template for the image count.
    pub fallback: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub requested: usize,
}

impl Collage {
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// e.g. "5 of 6 images placed".
    pub fn summary(&self) -> String {
        format!("{} of {} images placed", self.placed_count(), self.requested)
    }
}

/// Holds the immutable catalogs injected at construction.
#[derive(Debug, Clone)]
pub struct CollageBuilder {
    layouts: LayoutCatalog,
    styles: StyleCatalog,
}

impl Default for CollageBuilder {
    fn default() -> Self {
        Self::new(LayoutCatalog::builtin(), StyleCatalog::builtin())
    }
}

impl CollageBuilder {
    pub fn new(layouts: LayoutCatalog, styles: StyleCatalog) -> Self {
        Self { layouts, styles }
    }

    pub fn layouts(&self) -> &LayoutCatalog {
        &self.layouts
    }

    pub fn styles(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Build one collage.
    ///
    /// # Errors
    /// [`Error::NoImages`] for an empty input, [`Error::UnknownStyle`] for an
    /// unknown style name, or a resize failure. Per-image problems are
    /// reported through [`Collage::diagnostics`] instead.
    pub fn build(&self, images: &[SourceImage], opts: &BuildOptions) -> Result<Collage> {
        if images.is_empty() {
            return Err(Error::NoImages);
        }
        let style = self.styles.resolve(&opts.style)?;
        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let selection = self.layouts.select(images.len(), &mut rng);
        let template = selection.template;
        if selection.fallback {
            warn!(
                count = images.len(),
                template = %template.name,
                "no layout for image count, using fallback"
            );
        }

        let cells: Vec<PixelBox> = template
            .cells
            .iter()
            .map(|r| ratios_to_pixel_box(*r, opts.canvas, style.border_width_px))
            .collect();

        let order = if opts.orientation_hint {
            let cell_orientations: Vec<Orientation> = cells
                .iter()
                .map(|c| Orientation::classify(c.w, c.h))
                .collect();
            let image_orientations: Vec<Orientation> = images
                .iter()
                .map(|img| img.orientation().unwrap_or(Orientation::Square))
                .collect();
            arrange_by_orientation(&cell_orientations, &image_orientations)
        } else {
            (0..images.len()).collect()
        };

        let mut compositor = Compositor::new(opts.canvas, style);
        let mut diagnostics = Vec::new();

        for (slot, &index) in order.iter().enumerate() {
            let source = &images[index];
            let reference = source.reference();
            let Some(&cell) = cells.get(slot) else {
                diagnostics.push(Diagnostic::Unplaced {
                    index,
                    reference: reference.to_string(),
                });
                continue;
            };
            // drawn per cell so a skipped image never shifts later angles
            let rotation = transform::draw_rotation(style.rotation_range, &mut rng);

            let image = match source {
                SourceImage::Loaded { image, .. } => image,
                SourceImage::Failed { reason, .. } => {
                    warn!(index, reference, reason = %reason, "image failed to load, leaving gap");
                    diagnostics.push(Diagnostic::ImageLoadFailed {
                        index,
                        reference: reference.to_string(),
                        reason: reason.clone(),
                    });
                    continue;
                }
            };
            if cell.is_degenerate() {
                warn!(index, reference, ?cell, "cell degenerates after border, skipping");
                diagnostics.push(Diagnostic::DegenerateCell {
                    index,
                    reference: reference.to_string(),
                    cell,
                });
                continue;
            }

            match transform::transform(index, reference, image, cell, style, rotation)? {
                Some(transformed) => {
                    debug!(
                        index,
                        reference,
                        rotation,
                        scale = transformed.placed.scale,
                        "placing image"
                    );
                    compositor.paste(&transformed);
                }
                None => diagnostics.push(Diagnostic::DegenerateCell {
                    index,
                    reference: reference.to_string(),
                    cell,
                }),
            }
        }

        for diag in &diagnostics {
            if let Diagnostic::Unplaced { index, reference } = diag {
                warn!(index, reference = %reference, template = %template.name, "no cell left for image");
            }
        }

        let placed = compositor.placed().to_vec();
        let markup = markup::emit(&template, &placed, opts.canvas, style);
        let image = compositor.finalize();

        let collage = Collage {
            image,
            markup,
            placed,
            template,
            fallback: selection.fallback,
            diagnostics,
            requested: images.len(),
        };
        info!(
            template = %collage.template.name,
            style = %opts.style,
            "{}",
            collage.summary()
        );
        Ok(collage)
    }
}

/// Build with the built-in catalogs.
pub fn build_collage(
    images: &[SourceImage],
    canvas: CanvasSize,
    style: &str,
    seed: Option<u64>,
) -> Result<Collage> {
    let mut opts = BuildOptions::new(canvas, style);
    opts.seed = seed;
    CollageBuilder::default().build(images, &opts)
}
