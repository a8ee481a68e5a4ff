//! Top-level error type for pipeline operations.
//!
//! Geometry and selection errors are preconditions: an operation that fails
//! with one of them has not touched any pixels. Decode and encode failures
//! are wrapped so a caller only has to report a single error.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Errors produced by the transform, selection, batch and merge operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Geometry was requested before the displayed image size is known.
    #[error("Image display size is not known yet")]
    NotReady,

    /// A crop was requested without a non-degenerate selection.
    #[error("No active selection")]
    NoSelection,

    /// The source image has zero width or height.
    #[error("Source image has zero dimensions")]
    EmptySource,

    /// A batch or merge was started with no items.
    #[error("Nothing to process")]
    EmptyBatch,

    /// Input bytes could not be decoded into an image.
    #[error("Failed to decode input: {0}")]
    DecodeFailure(#[from] DecodeError),

    /// Output bytes could not be produced.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] EncodeError),

    /// One item of a batch failed and the whole batch was stopped.
    #[error("Batch aborted at item {index} ({name}): {source}")]
    BatchAborted {
        index: usize,
        name: String,
        source: Box<PipelineError>,
    },

    /// The progress callback asked to stop between two items.
    #[error("Cancelled after {completed} of {total} items")]
    Cancelled { completed: usize, total: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(PipelineError::NotReady.to_string(), "Image display size is not known yet");
        assert_eq!(PipelineError::NoSelection.to_string(), "No active selection");

        let err = PipelineError::Cancelled {
            completed: 2,
            total: 5,
        };
        assert_eq!(err.to_string(), "Cancelled after 2 of 5 items");
    }

    #[test]
    fn test_batch_aborted_keeps_source() {
        let err = PipelineError::BatchAborted {
            index: 3,
            name: "cat.png".to_string(),
            source: Box::new(PipelineError::DecodeFailure(DecodeError::InvalidFormat)),
        };

        assert!(err.to_string().starts_with("Batch aborted at item 3 (cat.png)"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_error_converts() {
        let err: PipelineError = DecodeError::InvalidFormat.into();
        assert!(matches!(err, PipelineError::DecodeFailure(_)));
    }
}
