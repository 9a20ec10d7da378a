//! Output sink: persists the raster, the HTML page and a YAML layout sidecar.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use serde::Serialize;
use tracing::info;

use crate::collage::{Collage, Diagnostic};
use crate::error::Result;
use crate::markup::MarkupDescription;

pub const JPEG_QUALITY: u8 = 95;

/// Paths written for one collage.
#[derive(Debug, Clone)]
pub struct WrittenCollage {
    pub image: PathBuf,
    pub html: PathBuf,
    pub layout: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct LayoutFile<'a> {
    title: &'a str,
    summary: String,
    fallback: bool,
    markup: &'a MarkupDescription,
    diagnostics: &'a [Diagnostic],
}

/// `collage_<YYYYmmdd_HHMMSS>` with an optional batch suffix.
pub fn collage_name(at: DateTime<Local>, batch: Option<usize>) -> String {
    let stamp = at.format("%Y%m%d_%H%M%S");
    match batch {
        Some(n) => format!("collage_{stamp}_{n}"),
        None => format!("collage_{stamp}"),
    }
}

pub fn default_title(at: DateTime<Local>) -> String {
    format!("Photo Collage - {}", at.format("%B %d, %Y"))
}

/// Write `<name>.png` (alpha kept) or `<name>.jpg`, plus `<name>.html` and
/// `<name>.layout.yaml`, creating `dir` if needed.
pub fn write_collage(dir: &Path, name: &str, title: &str, collage: &Collage) -> Result<WrittenCollage> {
    fs::create_dir_all(dir)?;

    let image = if collage.image.has_alpha() {
        let path = dir.join(format!("{name}.png"));
        collage.image.image.save_with_format(&path, ImageFormat::Png)?;
        path
    } else {
        let path = dir.join(format!("{name}.jpg"));
        let writer = BufWriter::new(File::create(&path)?);
        collage
            .image
            .image
            .write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))?;
        path
    };

    let html = dir.join(format!("{name}.html"));
    let page = collage
        .markup
        .to_html_with(title, |el| html_src(dir, &el.source));
    fs::write(&html, page)?;

    let layout = dir.join(format!("{name}.layout.yaml"));
    let sidecar = LayoutFile {
        title,
        summary: collage.summary(),
        fallback: collage.fallback,
        markup: &collage.markup,
        diagnostics: &collage.diagnostics,
    };
    fs::write(&layout, serde_yaml::to_string(&sidecar)?)?;

    info!(image = %image.display(), html = %html.display(), "wrote collage");
    Ok(WrittenCollage { image, html, layout })
}

/// `reference` rewritten relative to `html_dir`, so the page resolves it
/// from its own location. References that do not exist on disk are kept.
pub fn html_src(html_dir: &Path, reference: &str) -> String {
    let (Ok(target), Ok(base)) = (fs::canonicalize(reference), fs::canonicalize(html_dir)) else {
        return reference.to_string();
    };
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = target.iter().zip(&base).take_while(|(a, b)| a == b).count();
    if common == 0 {
        return target.iter().collect::<PathBuf>().to_string_lossy().into_owned();
    }

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    rel.extend(&target[common..]);
    rel.to_string_lossy().replace('\\', "/")
}
