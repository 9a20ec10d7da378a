//! YAML configuration for the collage runner: directories, canvas, style,
//! seeding, batching and catalog overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use serde::Deserialize;

use crate::catalog::{LayoutCatalog, Template};
use crate::collage::{BuildOptions, CollageBuilder};
use crate::error::Result;
use crate::geometry::CanvasSize;
use crate::style::{StyleCatalog, StyleConfig};

/// Named output canvas presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Dimension {
    #[serde(rename = "16:9")]
    Widescreen,
    #[default]
    #[serde(rename = "square")]
    Square,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "ipad")]
    Ipad,
}

impl Dimension {
    pub fn size(&self) -> CanvasSize {
        match self {
            Self::Widescreen => CanvasSize::new(1920, 1080),
            Self::Square => CanvasSize::new(1200, 1200),
            Self::Tall => CanvasSize::new(1080, 1920),
            Self::Ipad => CanvasSize::new(768, 1024),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Directory scanned for source images.
    pub images_dir: PathBuf,
    /// Directory receiving rendered collages and their markup.
    pub output_dir: PathBuf,
    pub dimension: Dimension,
    /// Explicit `[width, height]`; wins over `dimension`.
    pub canvas: Option<CanvasSize>,
    pub style: String,
    /// Base seed; batch `n` uses `seed + n`.
    pub seed: Option<u64>,
    pub images_per_collage: usize,
    pub orientation_hint: bool,
    pub title: Option<String>,
    /// Maximum collages built at once.
    pub concurrency: usize,
    /// Extra or replacement styles keyed by name.
    pub styles: BTreeMap<String, StyleConfig>,
    /// Extra or replacement templates keyed by image count.
    pub layouts: BTreeMap<usize, Vec<Template>>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("collages"),
            dimension: Dimension::default(),
            canvas: None,
            style: "modern".to_string(),
            seed: None,
            images_per_collage: 6,
            orientation_hint: false,
            title: None,
            concurrency: 2,
            styles: BTreeMap::new(),
            layouts: BTreeMap::new(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas.unwrap_or_else(|| self.dimension.size())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let canvas = self.canvas_size();
        ensure!(
            canvas.width > 0 && canvas.height > 0,
            "canvas must be non-empty, got {}x{}",
            canvas.width,
            canvas.height
        );
        ensure!(
            self.images_per_collage > 0,
            "images-per-collage must be at least 1"
        );
        ensure!(self.concurrency > 0, "concurrency must be at least 1");
        let builder = self.builder()?;
        let styles = builder.styles();
        styles.resolve(&self.style).with_context(|| {
            let known: Vec<&str> = styles.names().collect();
            format!("style '{}' is not one of: {}", self.style, known.join(", "))
        })?;
        Ok(())
    }

    /// Catalogs with the configured overrides applied.
    pub fn builder(&self) -> Result<CollageBuilder> {
        let layouts = LayoutCatalog::builtin().with_overrides(self.layouts.clone())?;
        let styles = StyleCatalog::builtin().with_overrides(self.styles.clone())?;
        Ok(CollageBuilder::new(layouts, styles))
    }

    pub fn build_options(&self, batch_index: usize) -> BuildOptions {
        let mut opts = BuildOptions::new(self.canvas_size(), self.style.clone())
            .with_orientation_hint(self.orientation_hint);
        opts.seed = self.seed.map(|s| s.wrapping_add(batch_index as u64));
        opts
    }
}
