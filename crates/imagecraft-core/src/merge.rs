//! Merging images and document pages into one output.
//!
//! When every input is an image the result is a single PNG with the images
//! scaled to a common width and stacked top to bottom. As soon as one input
//! is a document the result is a PDF instead, one page per image or rendered
//! document page, each page sized to its pixels.
//!
//! # Stack Layout
//!
//! ```text
//! width  = max(w_i)
//! h'_i   = round(h_i * width / w_i)
//! height = sum(h'_i) + spacing * (n - 1)
//! ```

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::batch::BatchProgress;
use crate::decode::{decode_image, is_pdf, probe_image, FilterType, PageRasterizer};
use crate::encode::{encode_png, PdfWriter};
use crate::error::{PipelineError, Result};
use crate::geometry::{NaturalRect, PixelRect};
use crate::surface::{Color, RasterSurface, Surface};

/// Spacing choices offered to the user, in pixels.
pub const SPACING_PRESETS: [u32; 4] = [0, 10, 20, 40];

/// Pixels per PDF point when rendering document pages.
pub const DOCUMENT_RENDER_SCALE: f32 = 2.0;

/// JPEG quality for PDF pages.
pub const DEFAULT_MERGE_QUALITY: f32 = 0.95;

pub const MERGED_IMAGE_NAME: &str = "merged.png";
pub const MERGED_DOCUMENT_NAME: &str = "merged.pdf";

/// What kind of input an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Image,
    Document,
}

impl SourceKind {
    /// Classify by MIME type. Unknown types are `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(SourceKind::Document)
        } else if mime.starts_with("image/") {
            Some(SourceKind::Image)
        } else {
            None
        }
    }

    /// Classify by content.
    pub fn detect(bytes: &[u8]) -> Self {
        if is_pdf(bytes) {
            SourceKind::Document
        } else {
            SourceKind::Image
        }
    }
}

/// One input of a merge.
#[derive(Debug, Clone)]
pub struct MergeItem {
    pub bytes: Vec<u8>,
    pub kind: SourceKind,
    /// Sort key for stacking, lowest first.
    pub order: usize,
}

impl MergeItem {
    pub fn new(bytes: Vec<u8>, kind: SourceKind, order: usize) -> Self {
        Self { bytes, kind, order }
    }

    /// Build an item, classifying it from its content.
    pub fn detect(bytes: Vec<u8>, order: usize) -> Self {
        let kind = SourceKind::detect(&bytes);
        Self { bytes, kind, order }
    }
}

/// Output kind of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeKind {
    /// One tall PNG.
    Image,
    /// Multi-page PDF.
    Document,
}

impl MergeKind {
    /// Image output only when every item is an image.
    pub fn for_items(items: &[MergeItem]) -> Self {
        if items.iter().all(|item| item.kind == SourceKind::Image) {
            MergeKind::Image
        } else {
            MergeKind::Document
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            MergeKind::Image => MERGED_IMAGE_NAME,
            MergeKind::Document => MERGED_DOCUMENT_NAME,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            MergeKind::Image => "image/png",
            MergeKind::Document => "application/pdf",
        }
    }
}

/// Merge configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeSettings {
    /// Gap between stacked images in pixels. Unused for document output.
    pub spacing: u32,
    /// JPEG quality of document pages, 0.0 to 1.0.
    pub quality: f32,
    /// Resampling filter for stacked images.
    pub filter: FilterType,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            spacing: 0,
            quality: DEFAULT_MERGE_QUALITY,
            filter: FilterType::Bilinear,
        }
    }
}

/// Encoded merge result.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub bytes: Vec<u8>,
    pub kind: MergeKind,
    /// Pixel size of the stacked image, `None` for documents.
    pub dimensions: Option<(u32, u32)>,
    /// Page count for documents, `None` for images.
    pub pages: Option<usize>,
}

impl MergeOutput {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }
}

/// Placement of each image in a vertical stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLayout {
    pub width: u32,
    pub height: u32,
    /// Destination rectangle of each image, in input order.
    pub slots: Vec<PixelRect>,
}

impl StackLayout {
    /// Lay out images of the given sizes at a common width.
    ///
    /// Zero-sized entries get an empty slot and take no height.
    pub fn new(sizes: &[(u32, u32)], spacing: u32) -> Self {
        let width = sizes.iter().map(|&(w, _)| w).max().unwrap_or(0);

        let mut slots = Vec::with_capacity(sizes.len());
        let mut y: i64 = 0;
        for (i, &(w, h)) in sizes.iter().enumerate() {
            if i > 0 {
                y += spacing as i64;
            }
            let scaled_h = if w == 0 || h == 0 {
                0
            } else {
                ((h as f64 * width as f64 / w as f64).round() as u32).max(1)
            };
            slots.push(PixelRect::new(0, y, width, scaled_h));
            y += scaled_h as i64;
        }

        Self {
            width,
            height: y.max(0) as u32,
            slots,
        }
    }
}

/// Stack already decoded images into one surface.
///
/// # Errors
///
/// Returns `PipelineError::EmptyBatch` if `images` is empty and
/// `PipelineError::EmptySource` if every image is empty.
pub fn stack_images<S: Surface>(images: &[S], settings: &MergeSettings) -> Result<RasterSurface> {
    if images.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let sizes: Vec<_> = images.iter().map(|img| img.dimensions()).collect();
    let layout = StackLayout::new(&sizes, settings.spacing);
    let mut canvas = blank_canvas(&layout, settings.spacing)?;

    for (image, slot) in images.iter().zip(&layout.slots) {
        canvas.draw_scaled(image, *slot, settings.filter);
    }
    Ok(canvas)
}

fn blank_canvas(layout: &StackLayout, spacing: u32) -> Result<RasterSurface> {
    if layout.width == 0 || layout.height == 0 {
        return Err(PipelineError::EmptySource);
    }

    let mut canvas = RasterSurface::blank(layout.width, layout.height);
    if spacing > 0 {
        canvas.fill_rect(&NaturalRect::full(layout.width, layout.height), Color::WHITE);
    }
    Ok(canvas)
}

/// Merge `items` into one image or document.
///
/// Items are sorted by `order` first. Images are probed for their size up
/// front, then decoded and drawn one at a time.
///
/// # Arguments
///
/// * `items` - Inputs in any order
/// * `settings` - Spacing and page quality
/// * `rasterizer` - Renders document pages; only used for document items
/// * `on_progress` - Called after each item; `Break` cancels the rest
///
/// # Errors
///
/// - `PipelineError::EmptyBatch` if `items` is empty
/// - `PipelineError::DecodeFailure` if any item cannot be decoded or rendered
/// - `PipelineError::Cancelled` when the callback stops the merge early
pub fn merge<F>(
    items: &[MergeItem],
    settings: &MergeSettings,
    rasterizer: &dyn PageRasterizer,
    mut on_progress: F,
) -> Result<MergeOutput>
where
    F: FnMut(&BatchProgress) -> ControlFlow<()>,
{
    if items.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let mut ordered: Vec<&MergeItem> = items.iter().collect();
    ordered.sort_by_key(|item| item.order);

    let kind = MergeKind::for_items(items);
    let total = ordered.len();
    let mut report = |completed: usize| -> Result<()> {
        let progress = BatchProgress { completed, total };
        if on_progress(&progress).is_break() && !progress.is_done() {
            log::info!("Merge cancelled after {} of {} items", completed, total);
            return Err(PipelineError::Cancelled { completed, total });
        }
        Ok(())
    };

    let output = match kind {
        MergeKind::Image => {
            let sizes = ordered
                .iter()
                .map(|item| Ok(probe_image(&item.bytes)?.oriented_dimensions()))
                .collect::<Result<Vec<_>>>()?;
            let layout = StackLayout::new(&sizes, settings.spacing);
            let mut canvas = blank_canvas(&layout, settings.spacing)?;

            for (index, (item, slot)) in ordered.iter().zip(&layout.slots).enumerate() {
                let image = decode_image(&item.bytes)?;
                canvas.draw_scaled(&image, *slot, settings.filter);
                report(index + 1)?;
            }

            let bytes = encode_png(&canvas.pixels, canvas.width, canvas.height)?;
            MergeOutput {
                bytes,
                kind,
                dimensions: Some(canvas.dimensions()),
                pages: None,
            }
        }
        MergeKind::Document => {
            let mut writer = PdfWriter::new(settings.quality);
            for (index, item) in ordered.iter().enumerate() {
                match item.kind {
                    SourceKind::Image => writer.add_page(&decode_image(&item.bytes)?)?,
                    SourceKind::Document => {
                        for page in rasterizer.rasterize(&item.bytes, DOCUMENT_RENDER_SCALE)? {
                            writer.add_page(&page)?;
                        }
                    }
                }
                report(index + 1)?;
            }

            let pages = writer.page_count();
            MergeOutput {
                bytes: writer.finish()?,
                kind,
                dimensions: None,
                pages: Some(pages),
            }
        }
    };

    log::info!(
        "Merged {} items into {} ({} bytes)",
        total,
        output.file_name(),
        output.bytes.len()
    );
    Ok(output)
}

/// User-ordered list of merge inputs.
///
/// Keeps `order` dense (`0..len`) and equal to each item's position.
#[derive(Debug, Clone, Default)]
pub struct MergeQueue {
    items: Vec<MergeItem>,
}

impl MergeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the end, classifying it from its content.
    pub fn push(&mut self, bytes: Vec<u8>) -> usize {
        let order = self.items.len();
        self.items.push(MergeItem::detect(bytes, order));
        order
    }

    /// Append an item with an explicit kind.
    pub fn push_kind(&mut self, bytes: Vec<u8>, kind: SourceKind) -> usize {
        let order = self.items.len();
        self.items.push(MergeItem::new(bytes, kind, order));
        order
    }

    /// Swap the item at `index` with the one before it.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            return false;
        }
        self.items.swap(index, index - 1);
        self.renumber();
        true
    }

    /// Swap the item at `index` with the one after it.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            return false;
        }
        self.items.swap(index, index + 1);
        self.renumber();
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<MergeItem> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.renumber();
        Some(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[MergeItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn kind(&self) -> MergeKind {
        MergeKind::for_items(&self.items)
    }

    fn renumber(&mut self) {
        for (order, item) in self.items.iter_mut().enumerate() {
            item.order = order;
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sizes_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
        prop::collection::vec((1u32..=2000, 1u32..=2000), 1..8)
    }

    proptest! {
        /// Property: stacked height is the sum of scaled heights plus the gaps.
        #[test]
        fn prop_stack_height(
            sizes in sizes_strategy(),
            spacing in prop::sample::select(SPACING_PRESETS.to_vec()),
        ) {
            let layout = StackLayout::new(&sizes, spacing);
            let max_w = sizes.iter().map(|s| s.0).max().unwrap();
            let scaled: u32 = sizes
                .iter()
                .map(|&(w, h)| ((h as f64 * max_w as f64 / w as f64).round() as u32).max(1))
                .sum();

            prop_assert_eq!(layout.width, max_w);
            prop_assert_eq!(layout.height, scaled + spacing * (sizes.len() as u32 - 1));
        }

        /// Property: slots never overlap and keep input order.
        #[test]
        fn prop_slots_are_ordered(sizes in sizes_strategy(), spacing in 0u32..=50) {
            let layout = StackLayout::new(&sizes, spacing);
            for pair in layout.slots.windows(2) {
                prop_assert_eq!(pair[1].y, pair[0].y + pair[0].height as i64 + spacing as i64);
            }
        }
    }
}
