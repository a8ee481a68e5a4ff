//! Single-image editing session.
//!
//! An [`EditSession`] owns the image being edited, the current
//! [`FilterState`] and the pending selection. Filters and selection are
//! non-destructive until one of [`crop`](EditSession::crop),
//! [`fill`](EditSession::fill) or [`border`](EditSession::border) bakes them
//! into a new source image.
//!
//! Every operation validates and renders before it touches session state, so
//! a failing call leaves the session exactly as it was.

use crate::decode::decode_image;
use crate::encode::{EncodeOptions, PdfWriter};
use crate::error::{PipelineError, Result};
use crate::geometry::{to_frame, DisplaySize, NaturalRect, SelectionRect};
use crate::selection;
use crate::source::ImageSource;
use crate::surface::{Color, RasterSurface, Surface};
use crate::transform::TransformPipeline;
use crate::FilterState;

/// Editing state for one image.
#[derive(Debug, Clone)]
pub struct EditSession {
    source: ImageSource,
    filters: FilterState,
    selection: Option<SelectionRect>,
}

impl EditSession {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            filters: FilterState::default(),
            selection: None,
        }
    }

    /// Decode `bytes` and start a session on the result.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::DecodeFailure` if the bytes are not a supported
    /// image, `PipelineError::EmptySource` if it has no pixels.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bitmap = decode_image(bytes)?;
        if bitmap.is_empty() {
            return Err(PipelineError::EmptySource);
        }
        Ok(Self::new(ImageSource::new(bitmap)))
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// Record the on-screen size of the image.
    pub fn set_display(&mut self, display: Option<DisplaySize>) {
        self.source.set_display(display);
    }

    pub fn rotate_by(&mut self, degrees: f64) {
        self.filters.rotate_by(degrees);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.filters.zoom_by(delta);
    }

    pub fn toggle_flip_horizontal(&mut self) {
        self.filters.toggle_flip_horizontal();
    }

    pub fn toggle_flip_vertical(&mut self) {
        self.filters.toggle_flip_vertical();
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
    }

    /// Set the selection in display units. An empty rectangle clears it.
    pub fn set_selection(&mut self, rect: SelectionRect) {
        self.selection = rect.is_active().then_some(rect);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Render the current state for on-screen preview.
    pub fn render(&self) -> Result<RasterSurface> {
        TransformPipeline::preview().apply(self.source.bitmap(), &self.filters)
    }

    /// Render at export quality, cropped to the selection when one is active.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NotReady` if a selection is active but the
    /// display size is unknown.
    pub fn render_for_export(&self) -> Result<RasterSurface> {
        let frame = self.bake()?;
        match self.frame_selection(frame.dimensions())? {
            Some(rect) => selection::crop(&frame, &rect),
            None => Ok(frame),
        }
    }

    /// Encode [`render_for_export`](Self::render_for_export) as an image file.
    pub fn export(&self, options: &EncodeOptions) -> Result<Vec<u8>> {
        let surface = self.render_for_export()?;
        let bytes = surface.encode(options)?;
        log::info!(
            "Exported {}x{} {} ({} bytes)",
            surface.width(),
            surface.height(),
            options.format.extension(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Encode [`render_for_export`](Self::render_for_export) as a one-page PDF.
    pub fn export_pdf(&self, quality: f32) -> Result<Vec<u8>> {
        let surface = self.render_for_export()?;
        let mut writer = PdfWriter::new(quality);
        writer.add_page(&surface)?;
        Ok(writer.finish()?)
    }

    /// Replace the image with the selected region of the current render.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NoSelection` without an active selection and
    /// `PipelineError::NotReady` if the display size is unknown.
    pub fn crop(&mut self) -> Result<()> {
        if self.selection.is_none() {
            return Err(PipelineError::NoSelection);
        }

        let frame = self.bake()?;
        let rect = self
            .frame_selection(frame.dimensions())?
            .ok_or(PipelineError::NoSelection)?;
        let cropped = selection::crop(&frame, &rect)?;
        self.commit(cropped);
        Ok(())
    }

    /// Fill the selection (or the whole image) with `color` and bake the result.
    pub fn fill(&mut self, color: Color) -> Result<()> {
        let mut frame = self.bake()?;
        let rect = self.frame_selection(frame.dimensions())?;
        selection::fill(&mut frame, rect.as_ref(), color);
        self.commit(frame);
        Ok(())
    }

    /// Draw a border inside the selection (or the whole image) and bake the result.
    pub fn border(&mut self, color: Color, line_width: f64) -> Result<()> {
        let mut frame = self.bake()?;
        let rect = self.frame_selection(frame.dimensions())?;
        selection::border(&mut frame, rect.as_ref(), color, line_width);
        self.commit(frame);
        Ok(())
    }

    fn bake(&self) -> Result<RasterSurface> {
        TransformPipeline::export().apply(self.source.bitmap(), &self.filters)
    }

    /// Map the active selection onto a rendered frame of size `frame`.
    fn frame_selection(&self, frame: (u32, u32)) -> Result<Option<NaturalRect>> {
        self.selection
            .map(|rect| to_frame(&rect, &self.source, frame))
            .transpose()
    }

    fn commit(&mut self, surface: RasterSurface) {
        log::debug!(
            "Baked edit into new {}x{} source",
            surface.width(),
            surface.height()
        );
        self.source = ImageSource::new(surface);
        self.filters.reset();
        self.selection = None;
    }
}
