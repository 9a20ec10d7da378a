//! Orchestrates many independent builds over an image directory.
//!
//! Each batch owns its own images, canvas and placements, so builds run in
//! parallel on blocking worker threads; outputs are written in batch order.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Local;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::collage::{Collage, SourceImage};
use crate::config::Configuration;
use crate::output::{self, WrittenCollage};
use crate::source::{self, ImagePool};

#[derive(Debug)]
pub struct BatchOutcome {
    pub index: usize,
    pub images: Vec<PathBuf>,
    pub result: Result<WrittenCollage>,
}

/// Split the pool into consecutive batches of at most `per_collage` images.
pub fn plan_batches(pool: &mut ImagePool, per_collage: usize) -> Vec<Vec<PathBuf>> {
    let mut batches = Vec::new();
    while pool.remaining() > 0 {
        let batch = pool.next_batch(per_collage.max(1));
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

/// Scan, build and write every collage described by `cfg`.
pub async fn run(cfg: &Configuration) -> Result<Vec<BatchOutcome>> {
    let builder = Arc::new(cfg.builder().context("building catalogs")?);
    let paths = source::scan_images(&cfg.images_dir)
        .with_context(|| format!("scanning {}", cfg.images_dir.display()))?;
    info!(count = paths.len(), dir = %cfg.images_dir.display(), "scanned images");

    let mut pool = ImagePool::new(paths);
    let batches = plan_batches(&mut pool, cfg.images_per_collage);
    if batches.is_empty() {
        bail!("no images found in {}", cfg.images_dir.display());
    }

    let started = Local::now();
    let title = cfg
        .title
        .clone()
        .unwrap_or_else(|| output::default_title(started));
    let multiple = batches.len() > 1;

    let mut tasks: JoinSet<(usize, anyhow::Result<Collage>)> = JoinSet::new();
    let mut built: BTreeMap<usize, anyhow::Result<Collage>> = BTreeMap::new();
    for (index, paths) in batches.iter().cloned().enumerate() {
        while tasks.len() >= cfg.concurrency.max(1) {
            if let Some(joined) = tasks.join_next().await {
                let (i, res) = joined.context("collage worker panicked")?;
                built.insert(i, res);
            }
        }
        let builder = Arc::clone(&builder);
        let opts = cfg.build_options(index);
        tasks.spawn_blocking(move || {
            let images: Vec<SourceImage> = paths.iter().map(|p| source::load(p)).collect();
            let res = builder
                .build(&images, &opts)
                .with_context(|| format!("building collage {index}"));
            (index, res)
        });
    }
    while let Some(joined) = tasks.join_next().await {
        let (i, res) = joined.context("collage worker panicked")?;
        built.insert(i, res);
    }

    let mut outcomes = Vec::with_capacity(batches.len());
    for (index, images) in batches.into_iter().enumerate() {
        let result = match built.remove(&index) {
            Some(Ok(collage)) => {
                info!(batch = index, "{}", collage.summary());
                let name = output::collage_name(started, multiple.then_some(index + 1));
                output::write_collage(&cfg.output_dir, &name, &title, &collage)
                    .with_context(|| format!("writing {name}"))
            }
            Some(Err(err)) => Err(err),
            None => Err(anyhow::anyhow!("collage {index} produced no result")),
        };
        if let Err(err) = &result {
            error!(batch = index, "collage failed: {err:#}");
        }
        outcomes.push(BatchOutcome {
            index,
            images,
            result,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_cover_every_image_once() {
        let paths: Vec<PathBuf> = (0..13).map(|i| PathBuf::from(format!("{i:02}.png"))).collect();
        let mut pool = ImagePool::new(paths.clone());
        let batches = plan_batches(&mut pool, 6);
        assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), [6, 6, 1]);
        let flat: Vec<PathBuf> = batches.into_iter().flatten().collect();
        assert_eq!(flat, paths);
    }
}
