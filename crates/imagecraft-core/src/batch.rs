//! Batch resizing of many images into one archive.
//!
//! Items are processed strictly in order, one decoded surface at a time:
//! decode, resize, encode, add to the archive, report progress. The progress
//! callback is also the cancellation point; returning
//! [`ControlFlow::Break`] stops the batch before the next item starts.
//!
//! # Examples
//!
//! ```ignore
//! use imagecraft_core::batch::{resize_to_zip, BatchItem};
//! use imagecraft_core::resize::ResizeSettings;
//!
//! let mut items = vec![BatchItem::new(bytes, "cat.png")];
//! let zip = resize_to_zip(&mut items, &ResizeSettings::percentage(50.0), |p| {
//!     println!("{}%", p.percent());
//!     ControlFlow::Continue(())
//! })?;
//! ```

use std::ops::ControlFlow;

use serde::Serialize;

use crate::decode::{decode_image, probe_image};
use crate::encode::{Archive, ImageFormat, ZipBuilder};
use crate::error::{PipelineError, Result};
use crate::resize::{resize_surface, ErrorPolicy, ResizeSettings};
use crate::surface::Surface;

/// Suggested download name for the archive.
pub const DEFAULT_ARCHIVE_NAME: &str = "resized_images.zip";

/// One input of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub bytes: Vec<u8>,
    pub name: String,
    /// Natural size, known once the item has been probed or decoded.
    pub dimensions: Option<(u32, u32)>,
}

impl BatchItem {
    pub fn new(bytes: Vec<u8>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            name: name.into(),
            dimensions: None,
        }
    }

    /// Read the oriented dimensions from the header and remember them.
    pub fn measure(&mut self) -> Result<(u32, u32)> {
        let dimensions = probe_image(&self.bytes)?.oriented_dimensions();
        self.dimensions = Some(dimensions);
        Ok(dimensions)
    }

    /// Archive entry name: `resized_<stem>.<ext>`.
    pub fn output_name(&self, format: ImageFormat) -> String {
        let file = self.name.rsplit(['/', '\\']).next().unwrap_or(&self.name);
        let stem = match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file,
        };
        format!("resized_{}.{}", stem, format.extension())
    }
}

/// Progress after an item has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// Completion in whole percent.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total) as u32
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Outcome of a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Names the outputs were stored under, in input order.
    pub stored: Vec<String>,
    /// Input names left out under [`ErrorPolicy::SkipFailed`].
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.stored.len()
    }
}

/// Resize every item into `archive`.
///
/// # Arguments
///
/// * `items` - Inputs in processing order; their `dimensions` are filled in
/// * `settings` - Sizing, output format and error policy
/// * `archive` - Receives one entry per successful item
/// * `on_progress` - Called after each item; `Break` cancels the rest
///
/// # Errors
///
/// - `PipelineError::EmptyBatch` if `items` is empty
/// - `PipelineError::BatchAborted` when an item fails under [`ErrorPolicy::Abort`]
/// - `PipelineError::Cancelled` when the callback stops the batch early
pub fn run_batch<A, F>(
    items: &mut [BatchItem],
    settings: &ResizeSettings,
    archive: &mut A,
    mut on_progress: F,
) -> Result<BatchReport>
where
    A: Archive,
    F: FnMut(&BatchProgress) -> ControlFlow<()>,
{
    if items.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let total = items.len();
    let mut report = BatchReport::default();

    for (index, item) in items.iter_mut().enumerate() {
        match process_item(item, settings, archive) {
            Ok(stored) => report.stored.push(stored),
            Err(e) => match settings.on_error {
                ErrorPolicy::Abort => {
                    return Err(PipelineError::BatchAborted {
                        index,
                        name: item.name.clone(),
                        source: Box::new(e),
                    });
                }
                ErrorPolicy::SkipFailed => {
                    log::warn!("Skipping {} ({}): {}", item.name, index, e);
                    report.skipped.push(item.name.clone());
                }
            },
        }

        let progress = BatchProgress {
            completed: index + 1,
            total,
        };
        if on_progress(&progress).is_break() && !progress.is_done() {
            log::info!("Batch cancelled after {} of {} items", progress.completed, total);
            return Err(PipelineError::Cancelled {
                completed: progress.completed,
                total,
            });
        }
    }

    log::info!(
        "Batch resized {} of {} items ({} skipped)",
        report.processed(),
        total,
        report.skipped.len()
    );
    Ok(report)
}

/// Resize every item and return the finished ZIP archive bytes.
///
/// Entries are stored under `resized_images/`.
pub fn resize_to_zip<F>(items: &mut [BatchItem], settings: &ResizeSettings, on_progress: F) -> Result<Vec<u8>>
where
    F: FnMut(&BatchProgress) -> ControlFlow<()>,
{
    let mut zip = ZipBuilder::default();
    run_batch(items, settings, &mut zip, on_progress)?;
    Ok(zip.finish()?)
}

fn process_item<A: Archive>(item: &mut BatchItem, settings: &ResizeSettings, archive: &mut A) -> Result<String> {
    let surface = decode_image(&item.bytes)?;
    item.dimensions = Some(surface.dimensions());

    let resized = resize_surface(&surface, settings)?;
    drop(surface);

    let bytes = resized.encode(&settings.encode_options())?;
    let name = item.output_name(settings.format);
    Ok(archive.add_file(&name, &bytes)?)
}
