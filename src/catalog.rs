//! Named proportional layout templates keyed by image count.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{CellRatio, Orientation};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cells: Vec<CellRatio>,
}

impl Template {
    pub fn new(name: impl Into<String>, description: impl Into<String>, cells: Vec<CellRatio>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cells,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cells.is_empty() {
            return Err(Error::InvalidTemplate {
                name: self.name.clone(),
                reason: "template has no cells".into(),
            });
        }
        for (idx, cell) in self.cells.iter().enumerate() {
            cell.validate().map_err(|reason| Error::InvalidTemplate {
                name: self.name.clone(),
                reason: format!("cell {idx}: {reason}"),
            })?;
        }
        Ok(())
    }
}

/// Keep only the first `count` cells, in their original order.
pub fn truncate(template: &Template, count: usize) -> Template {
    let keep = count.min(template.cells.len());
    Template {
        name: template.name.clone(),
        description: template.description.clone(),
        cells: template.cells[..keep].to_vec(),
    }
}

/// Result of a catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub template: Template,
    /// `true` when the catalog had no entry for the requested count.
    pub fallback: bool,
}

/// Read-only mapping from image count to alternative templates.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    templates: BTreeMap<usize, Vec<Template>>,
    fallback: Template,
}

impl LayoutCatalog {
    /// Build a catalog from explicit tables, validating every cell.
    pub fn new(templates: BTreeMap<usize, Vec<Template>>, fallback: Template) -> Result<Self> {
        fallback.validate()?;
        for list in templates.values() {
            for template in list {
                template.validate()?;
            }
        }
        Ok(Self { templates, fallback })
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        let templates = BUILTIN
            .iter()
            .map(|(count, list)| (*count, list.iter().map(BuiltinTemplate::to_template).collect()))
            .collect();
        Self {
            templates,
            fallback: FALLBACK.to_template(),
        }
    }

    /// Replace the alternatives for each count present in `overrides`.
    pub fn with_overrides(mut self, overrides: BTreeMap<usize, Vec<Template>>) -> Result<Self> {
        for (count, list) in overrides {
            for template in &list {
                template.validate()?;
            }
            self.templates.insert(count, list);
        }
        Ok(self)
    }

    pub fn fallback(&self) -> &Template {
        &self.fallback
    }

    pub fn templates_for(&self, count: usize) -> &[Template] {
        self.templates.get(&count).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pick a template for `count` images, uniformly among the alternatives.
    ///
    /// Deterministic for a seeded `rng`. Unlisted counts get the single-cell
    /// fallback.
    pub fn select(&self, count: usize, rng: &mut impl Rng) -> Selection {
        let options = self.templates_for(count);
        if options.is_empty() {
            debug!(count, fallback = %self.fallback.name, "no template for image count");
            return Selection {
                template: truncate(&self.fallback, count),
                fallback: true,
            };
        }
        let chosen = &options[rng.random_range(0..options.len())];
        debug!(count, template = %chosen.name, "selected layout");
        Selection {
            template: truncate(chosen, count),
            fallback: false,
        }
    }
}

/// Reorder images so each cell prefers an image of matching orientation.
///
/// Returns a permutation of `0..images.len()`: cells are visited in template
/// order and each takes the first remaining image whose orientation matches,
/// else the first remaining image. Images beyond the cell count keep their
/// relative order at the tail.
pub fn arrange_by_orientation(cells: &[Orientation], images: &[Orientation]) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..images.len()).collect();
    let mut order = Vec::with_capacity(images.len());
    for cell in cells {
        if remaining.is_empty() {
            break;
        }
        let pick = remaining
            .iter()
            .position(|&i| images[i] == *cell)
            .unwrap_or(0);
        order.push(remaining.remove(pick));
    }
    order.extend(remaining);
    order
}

struct BuiltinTemplate {
    name: &'static str,
    description: &'static str,
    cells: &'static [[f64; 4]],
}

impl BuiltinTemplate {
    fn to_template(&self) -> Template {
        Template::new(
            self.name,
            self.description,
            self.cells.iter().copied().map(CellRatio::from).collect(),
        )
    }
}

const fn t(
    name: &'static str,
    description: &'static str,
    cells: &'static [[f64; 4]],
) -> BuiltinTemplate {
    BuiltinTemplate {
        name,
        description,
        cells,
    }
}

const FALLBACK: BuiltinTemplate = t(
    "Standard centered",
    "Single image centered with even margins",
    &[[0.1, 0.1, 0.8, 0.8]],
);

const BUILTIN: &[(usize, &[BuiltinTemplate])] = &[
    (1, &[
        t("Standard centered", "Single image centered with even margins", &[[0.1, 0.1, 0.8, 0.8]]),
        t("Full bleed", "Image fills almost the entire canvas", &[[0.02, 0.02, 0.96, 0.96]]),
        t("Offset right", "Image positioned toward the right side", &[[0.3, 0.1, 0.6, 0.8]]),
        t("Offset left", "Image positioned toward the left side", &[[0.1, 0.1, 0.6, 0.8]]),
        t("Giant showcase", "Large image with minimal margins", &[[0.05, 0.05, 0.9, 0.9]]),
    ]),
    (2, &[
        t("Side by side", "Two images arranged horizontally", &[[0.05, 0.1, 0.45, 0.8], [0.5, 0.1, 0.45, 0.8]]),
        t("Stacked vertical", "Two images stacked vertically", &[[0.1, 0.05, 0.8, 0.45], [0.1, 0.5, 0.8, 0.45]]),
        t("Diagonal", "Images arranged in a diagonal pattern", &[[0.05, 0.05, 0.5, 0.5], [0.45, 0.45, 0.5, 0.5]]),
        t("Asymmetric split", "One large image with a smaller companion", &[[0.05, 0.1, 0.6, 0.8], [0.65, 0.2, 0.3, 0.6]]),
        t("Overlapping", "Two images with partial overlap effect", &[[0.1, 0.15, 0.55, 0.7], [0.35, 0.15, 0.55, 0.7]]),
        t("Top and bottom", "Two wide images stacked vertically", &[[0.15, 0.05, 0.7, 0.43], [0.15, 0.52, 0.7, 0.43]]),
    ]),
    (3, &[
        t("Feature with sidebar", "One large image with two smaller images on the right",
            &[[0.05, 0.1, 0.6, 0.8], [0.67, 0.1, 0.28, 0.38], [0.67, 0.52, 0.28, 0.38]]),
        t("Triangle", "Images arranged in a triangular formation",
            &[[0.1, 0.1, 0.8, 0.45], [0.1, 0.55, 0.38, 0.4], [0.52, 0.55, 0.38, 0.4]]),
        t("Row strip", "Three images in a horizontal row",
            &[[0.03, 0.25, 0.31, 0.5], [0.35, 0.25, 0.31, 0.5], [0.67, 0.25, 0.31, 0.5]]),
        t("L-shaped", "Three images arranged in an L-shape pattern",
            &[[0.05, 0.05, 0.45, 0.45], [0.05, 0.5, 0.45, 0.45], [0.5, 0.05, 0.45, 0.9]]),
        t("Stepped", "Cascading diagonal arrangement",
            &[[0.05, 0.05, 0.4, 0.4], [0.3, 0.3, 0.4, 0.4], [0.55, 0.55, 0.4, 0.4]]),
        t("Vertical column", "Three images stacked vertically in the center",
            &[[0.35, 0.03, 0.3, 0.31], [0.35, 0.35, 0.3, 0.31], [0.35, 0.67, 0.3, 0.31]]),
    ]),
    (4, &[
        t("Grid 2x2", "Classic four-image grid arrangement",
            &[[0.05, 0.05, 0.45, 0.45], [0.5, 0.05, 0.45, 0.45], [0.05, 0.5, 0.45, 0.45], [0.5, 0.5, 0.45, 0.45]]),
        t("Row strip", "Four images in a horizontal filmstrip",
            &[[0.02, 0.3, 0.23, 0.4], [0.27, 0.3, 0.23, 0.4], [0.52, 0.3, 0.23, 0.4], [0.77, 0.3, 0.23, 0.4]]),
        t("Feature with sidebar", "Large feature image with three sidebar thumbnails",
            &[[0.05, 0.05, 0.65, 0.9], [0.7, 0.05, 0.25, 0.28], [0.7, 0.35, 0.25, 0.28], [0.7, 0.65, 0.25, 0.28]]),
        t("Diamond", "Images arranged in a diamond pattern",
            &[[0.3, 0.05, 0.4, 0.4], [0.05, 0.3, 0.4, 0.4], [0.55, 0.3, 0.4, 0.4], [0.3, 0.55, 0.4, 0.4]]),
        t("T-shape", "One wide image on top with three below in T-formation",
            &[[0.05, 0.05, 0.9, 0.45], [0.05, 0.55, 0.3, 0.4], [0.35, 0.55, 0.3, 0.4], [0.65, 0.55, 0.3, 0.4]]),
        t("Mosaic", "Asymmetrical mosaic with varying image sizes",
            &[[0.05, 0.05, 0.6, 0.6], [0.65, 0.05, 0.3, 0.3], [0.65, 0.35, 0.3, 0.3], [0.05, 0.65, 0.9, 0.3]]),
    ]),
    (5, &[
        t("Quad with footer", "Large feature with four smaller images in corners",
            &[[0.05, 0.05, 0.6, 0.6], [0.67, 0.05, 0.28, 0.29], [0.67, 0.36, 0.28, 0.29],
              [0.05, 0.67, 0.29, 0.28], [0.36, 0.67, 0.29, 0.28]]),
        t("Cross", "Images arranged in a cross or plus-sign pattern",
            &[[0.35, 0.05, 0.3, 0.3], [0.05, 0.35, 0.3, 0.3], [0.35, 0.35, 0.3, 0.3],
              [0.65, 0.35, 0.3, 0.3], [0.35, 0.65, 0.3, 0.3]]),
        t("Scattered", "Random-looking scattered arrangement",
            &[[0.05, 0.05, 0.35, 0.35], [0.6, 0.1, 0.3, 0.3], [0.15, 0.45, 0.25, 0.25],
              [0.5, 0.5, 0.4, 0.4], [0.1, 0.75, 0.35, 0.2]]),
        t("Central focus", "Central image with four smaller corner images",
            &[[0.3, 0.3, 0.4, 0.4], [0.05, 0.05, 0.25, 0.25], [0.7, 0.05, 0.25, 0.25],
              [0.05, 0.7, 0.25, 0.25], [0.7, 0.7, 0.25, 0.25]]),
        t("Horizontal strips", "Three rows of horizontal strips",
            &[[0.05, 0.05, 0.9, 0.28], [0.05, 0.36, 0.43, 0.28], [0.52, 0.36, 0.43, 0.28],
              [0.05, 0.67, 0.43, 0.28], [0.52, 0.67, 0.43, 0.28]]),
        t("Magazine layout", "Editorial-style layout with mixed sizes",
            &[[0.05, 0.05, 0.43, 0.55], [0.5, 0.05, 0.45, 0.27], [0.5, 0.33, 0.45, 0.27],
              [0.05, 0.62, 0.45, 0.33], [0.5, 0.62, 0.45, 0.33]]),
    ]),
    (6, &[
        t("Split layout", "Two large images on top, smaller ones below with an overlapping accent",
            &[[0.05, 0.05, 0.45, 0.45], [0.52, 0.05, 0.43, 0.45], [0.05, 0.52, 0.28, 0.43],
              [0.35, 0.52, 0.28, 0.43], [0.65, 0.52, 0.28, 0.43], [0.52, 0.05, 0.43, 0.45]]),
        t("Grid 2x3", "Six images in a 2x3 grid pattern",
            &[[0.05, 0.05, 0.3, 0.45], [0.35, 0.05, 0.3, 0.45], [0.65, 0.05, 0.3, 0.45],
              [0.05, 0.5, 0.3, 0.45], [0.35, 0.5, 0.3, 0.45], [0.65, 0.5, 0.3, 0.45]]),
        t("Grid 3x2", "Six images in a 3x2 grid pattern",
            &[[0.05, 0.05, 0.3, 0.3], [0.35, 0.05, 0.3, 0.3], [0.65, 0.05, 0.3, 0.3],
              [0.05, 0.35, 0.3, 0.3], [0.35, 0.35, 0.3, 0.3], [0.65, 0.35, 0.3, 0.3]]),
        t("Circular", "Images arranged in a circular pattern",
            &[[0.3, 0.1, 0.4, 0.4], [0.7, 0.3, 0.25, 0.25], [0.6, 0.65, 0.25, 0.25],
              [0.3, 0.65, 0.25, 0.25], [0.05, 0.3, 0.25, 0.25], [0.3, 0.05, 0.25, 0.25]]),
        t("Feature with grid", "Tall feature image with five arranged on the right",
            &[[0.05, 0.05, 0.5, 0.9], [0.57, 0.05, 0.38, 0.29], [0.57, 0.35, 0.38, 0.29],
              [0.57, 0.65, 0.38, 0.29], [0.57, 0.05, 0.19, 0.59], [0.76, 0.05, 0.19, 0.59]]),
    ]),
    (7, &[
        t("Feature with grid", "One large image with six smaller in grid format",
            &[[0.05, 0.05, 0.5, 0.5], [0.57, 0.05, 0.38, 0.24], [0.57, 0.3, 0.38, 0.24],
              [0.05, 0.57, 0.3, 0.38], [0.37, 0.57, 0.3, 0.38], [0.69, 0.57, 0.26, 0.19],
              [0.69, 0.77, 0.26, 0.19]]),
        t("Mixed grid", "Varied sizes with one tall vertical image",
            &[[0.05, 0.05, 0.3, 0.3], [0.37, 0.05, 0.3, 0.3], [0.69, 0.05, 0.26, 0.63],
              [0.05, 0.37, 0.3, 0.3], [0.37, 0.37, 0.3, 0.3], [0.05, 0.69, 0.47, 0.26],
              [0.54, 0.69, 0.41, 0.26]]),
        t("Staggered", "Staggered grid with offset alignment",
            &[[0.05, 0.05, 0.29, 0.29], [0.36, 0.05, 0.29, 0.29], [0.67, 0.05, 0.29, 0.29],
              [0.2, 0.36, 0.29, 0.29], [0.51, 0.36, 0.29, 0.29], [0.05, 0.67, 0.29, 0.29],
              [0.36, 0.67, 0.29, 0.29]]),
    ]),
    (8, &[
        t("Grid 4x2", "Eight images in a 4x2 grid pattern",
            &[[0.05, 0.05, 0.23, 0.45], [0.29, 0.05, 0.23, 0.45], [0.53, 0.05, 0.23, 0.45],
              [0.77, 0.05, 0.18, 0.45], [0.05, 0.51, 0.23, 0.45], [0.29, 0.51, 0.23, 0.45],
              [0.53, 0.51, 0.23, 0.45], [0.77, 0.51, 0.18, 0.45]]),
        t("Grid 2x4", "Eight images in a 2x4 grid pattern",
            &[[0.05, 0.05, 0.45, 0.23], [0.05, 0.29, 0.45, 0.23], [0.05, 0.53, 0.45, 0.23],
              [0.05, 0.77, 0.45, 0.18], [0.51, 0.05, 0.45, 0.23], [0.51, 0.29, 0.45, 0.23],
              [0.51, 0.53, 0.45, 0.23], [0.51, 0.77, 0.45, 0.18]]),
        t("Feature with gallery", "One large feature with gallery of smaller images",
            &[[0.05, 0.05, 0.6, 0.6], [0.67, 0.05, 0.28, 0.29], [0.67, 0.36, 0.28, 0.29],
              [0.05, 0.67, 0.22, 0.28], [0.28, 0.67, 0.22, 0.28], [0.51, 0.67, 0.22, 0.28],
              [0.74, 0.67, 0.22, 0.28], [0.05, 0.05, 0.22, 0.22]]),
    ]),
    (9, &[
        t("Grid 3x3", "Classic 3x3 grid of equal-sized images",
            &[[0.05, 0.05, 0.3, 0.3], [0.35, 0.05, 0.3, 0.3], [0.65, 0.05, 0.3, 0.3],
              [0.05, 0.35, 0.3, 0.3], [0.35, 0.35, 0.3, 0.3], [0.65, 0.35, 0.3, 0.3],
              [0.05, 0.65, 0.3, 0.3], [0.35, 0.65, 0.3, 0.3], [0.65, 0.65, 0.3, 0.3]]),
        t("Central focus", "Central image highlighted with surrounding images",
            &[[0.35, 0.35, 0.3, 0.3], [0.05, 0.05, 0.3, 0.3], [0.35, 0.05, 0.3, 0.3],
              [0.65, 0.05, 0.3, 0.3], [0.05, 0.35, 0.3, 0.3], [0.65, 0.35, 0.3, 0.3],
              [0.05, 0.65, 0.3, 0.3], [0.35, 0.65, 0.3, 0.3], [0.65, 0.65, 0.3, 0.3]]),
        t("Mixed sizes", "Varied image sizes in an asymmetric layout",
            &[[0.05, 0.05, 0.45, 0.45], [0.52, 0.05, 0.43, 0.22], [0.52, 0.28, 0.43, 0.22],
              [0.05, 0.52, 0.21, 0.43], [0.27, 0.52, 0.22, 0.43], [0.5, 0.52, 0.22, 0.21],
              [0.73, 0.52, 0.22, 0.21], [0.5, 0.74, 0.22, 0.21], [0.73, 0.74, 0.22, 0.21]]),
    ]),
    (10, &[
        t("Grid 5x2", "Ten images in a 5x2 grid layout",
            &[[0.05, 0.05, 0.18, 0.45], [0.24, 0.05, 0.18, 0.45], [0.43, 0.05, 0.18, 0.45],
              [0.62, 0.05, 0.18, 0.45], [0.81, 0.05, 0.14, 0.45], [0.05, 0.51, 0.18, 0.45],
              [0.24, 0.51, 0.18, 0.45], [0.43, 0.51, 0.18, 0.45], [0.62, 0.51, 0.18, 0.45],
              [0.81, 0.51, 0.14, 0.45]]),
        t("Grid 2x5", "Ten images in a 2x5 grid layout",
            &[[0.05, 0.05, 0.45, 0.18], [0.05, 0.24, 0.45, 0.18], [0.05, 0.43, 0.45, 0.18],
              [0.05, 0.62, 0.45, 0.18], [0.05, 0.81, 0.45, 0.14], [0.51, 0.05, 0.45, 0.18],
              [0.51, 0.24, 0.45, 0.18], [0.51, 0.43, 0.45, 0.18], [0.51, 0.62, 0.45, 0.18],
              [0.51, 0.81, 0.45, 0.14]]),
        t("Feature with strip", "Large feature with horizontal strip and accent images",
            &[[0.05, 0.05, 0.65, 0.65], [0.71, 0.05, 0.24, 0.32], [0.71, 0.38, 0.24, 0.32],
              [0.05, 0.71, 0.19, 0.24], [0.25, 0.71, 0.19, 0.24], [0.45, 0.71, 0.19, 0.24],
              [0.65, 0.71, 0.19, 0.24], [0.85, 0.71, 0.1, 0.24], [0.05, 0.05, 0.13, 0.13],
              [0.57, 0.57, 0.13, 0.13]]),
    ]),
    (12, &[
        t("Grid 4x3", "Twelve images in a 4x3 grid layout",
            &[[0.05, 0.05, 0.23, 0.30], [0.29, 0.05, 0.23, 0.30], [0.53, 0.05, 0.23, 0.30],
              [0.77, 0.05, 0.18, 0.30], [0.05, 0.36, 0.23, 0.30], [0.29, 0.36, 0.23, 0.30],
              [0.53, 0.36, 0.23, 0.30], [0.77, 0.36, 0.18, 0.30], [0.05, 0.67, 0.23, 0.30],
              [0.29, 0.67, 0.23, 0.30], [0.53, 0.67, 0.23, 0.30], [0.77, 0.67, 0.18, 0.30]]),
        t("Mixed mosaic", "Six regular images with six smaller ones below",
            &[[0.05, 0.05, 0.30, 0.30], [0.36, 0.05, 0.30, 0.30], [0.67, 0.05, 0.28, 0.30],
              [0.05, 0.36, 0.30, 0.30], [0.36, 0.36, 0.30, 0.30], [0.67, 0.36, 0.28, 0.30],
              [0.05, 0.67, 0.15, 0.28], [0.21, 0.67, 0.15, 0.28], [0.37, 0.67, 0.15, 0.28],
              [0.53, 0.67, 0.15, 0.28], [0.69, 0.67, 0.15, 0.28], [0.85, 0.67, 0.10, 0.28]]),
    ]),
    (15, &[
        t("Grid 5x3", "Fifteen images in a 5x3 grid layout",
            &[[0.05, 0.05, 0.18, 0.30], [0.24, 0.05, 0.18, 0.30], [0.43, 0.05, 0.18, 0.30],
              [0.62, 0.05, 0.18, 0.30], [0.81, 0.05, 0.14, 0.30], [0.05, 0.36, 0.18, 0.30],
              [0.24, 0.36, 0.18, 0.30], [0.43, 0.36, 0.18, 0.30], [0.62, 0.36, 0.18, 0.30],
              [0.81, 0.36, 0.14, 0.30], [0.05, 0.67, 0.18, 0.30], [0.24, 0.67, 0.18, 0.30],
              [0.43, 0.67, 0.18, 0.30], [0.62, 0.67, 0.18, 0.30], [0.81, 0.67, 0.14, 0.30]]),
    ]),
];
