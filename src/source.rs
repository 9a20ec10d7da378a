//! Image source: directory scanning, decoding with EXIF orientation, and the
//! pool of not-yet-used images shared by sequential builds.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::{RgbaImage, imageops};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::collage::SourceImage;
use crate::error::Error;

/// Extensions considered when scanning (lowercase, without dot). HEIC files
/// are listed so they surface as load failures rather than vanishing.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "heic"];

/// Return `true` if `path` has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|e| *e == ext)
        })
}

/// List image files under `dir`, skipping hidden subdirectories, sorted by path.
///
/// # Errors
/// Returns [`Error::BadDir`] if `dir` is missing or not a directory.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::BadDir(dir.display().to_string()));
    }
    let mut out: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| !should_skip_dir(e))
        .flatten()
        .map(DirEntry::into_path)
        .filter(|p| p.is_file() && is_supported_image(p))
        .collect();
    out.sort();
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}

/// Decode `path`, reporting any failure as [`SourceImage::Failed`].
pub fn load(path: &Path) -> SourceImage {
    let reference = path.display().to_string();
    match decode_rgba8_apply_exif(path) {
        Ok(image) => SourceImage::loaded(reference, image),
        Err(err) => {
            debug!("failed to decode {}: {err}", path.display());
            SourceImage::failed(reference, err.to_string())
        }
    }
}

fn decode_rgba8_apply_exif(path: &Path) -> Result<RgbaImage, Error> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let orientation = read_orientation(path).unwrap_or(1);
    Ok(apply_orientation(img, orientation))
}

/// Apply an EXIF orientation tag. Unknown values leave the image untouched.
pub fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&img),
        3 => imageops::rotate180(&img),
        4 => imageops::flip_vertical(&img),
        5 => imageops::flip_horizontal(&imageops::rotate90(&img)),
        6 => imageops::rotate90(&img),
        7 => imageops::flip_horizontal(&imageops::rotate270(&img)),
        8 => imageops::rotate270(&img),
        _ => img,
    }
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)? as u16;
    debug!("exif orientation {} for {}", value, path.display());
    Some(value)
}

/// Images not yet used by a previous build, in scan order.
#[derive(Debug, Default)]
pub struct ImagePool {
    available: Vec<PathBuf>,
    used: HashSet<PathBuf>,
}

impl ImagePool {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            available: paths,
            used: HashSet::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.available
            .iter()
            .filter(|p| !self.used.contains(*p))
            .count()
    }

    /// Take up to `n` unused images and mark them used.
    pub fn next_batch(&mut self, n: usize) -> Vec<PathBuf> {
        let batch: Vec<PathBuf> = self
            .available
            .iter()
            .filter(|p| !self.used.contains(*p))
            .take(n)
            .cloned()
            .collect();
        self.used.extend(batch.iter().cloned());
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("c.heic")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("noext")));
    }

    #[test]
    fn orientation_six_rotates_clockwise() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let out = apply_orientation(img, 6);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(*out.get_pixel(1, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn pool_hands_out_each_image_once() {
        let paths: Vec<PathBuf> = (0..7).map(|i| PathBuf::from(format!("{i}.jpg"))).collect();
        let mut pool = ImagePool::new(paths);
        assert_eq!(pool.next_batch(3).len(), 3);
        assert_eq!(pool.remaining(), 4);
        let second = pool.next_batch(3);
        assert_eq!(second[0], PathBuf::from("3.jpg"));
        assert_eq!(pool.next_batch(3).len(), 1);
        assert!(pool.next_batch(3).is_empty());
    }

    #[test]
    fn missing_file_becomes_load_failure() {
        let src = load(Path::new("/definitely/not/here.png"));
        assert!(matches!(src, SourceImage::Failed { .. }));
    }
}
