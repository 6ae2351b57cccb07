/// Convenience result type used across fourcut.
pub type FourcutResult<T> = Result<T, FourcutError>;

/// Top-level error taxonomy for the compositing pipeline.
///
/// Every variant aborts the whole render call; there is no partial output.
#[derive(thiserror::Error, Debug)]
pub enum FourcutError {
    /// The caller supplied a number of grid images other than the required count.
    #[error("invalid image count: expected {expected}, got {actual}")]
    InvalidImageCount {
        /// Required number of images.
        expected: usize,
        /// Number of images supplied.
        actual: usize,
    },

    /// A source reference could not be parsed into a locator.
    #[error("invalid image reference #{index} '{reference}': {reason}")]
    InvalidReference {
        /// Position of the reference in the request.
        index: usize,
        /// The raw reference text.
        reference: String,
        /// Why the reference was rejected.
        reason: String,
    },

    /// The fetch phase did not produce one decoded bitmap per requested source.
    #[error("incomplete fetch: expected {expected} bitmaps, got {fetched}: {detail}")]
    IncompleteFetch {
        /// Number of bitmaps requested.
        expected: usize,
        /// Number of bitmaps successfully fetched before the phase stopped.
        fetched: usize,
        /// First failure observed.
        detail: String,
    },

    /// The output buffer could not be allocated.
    #[error("out of memory: cannot allocate a {width}x{height} output buffer")]
    OutOfMemory {
        /// Requested output width in pixels.
        width: u32,
        /// Requested output height in pixels.
        height: u32,
    },

    /// Invalid caller-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FourcutError {
    /// Build a [`FourcutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FourcutError::InvalidReference`] value.
    pub fn invalid_reference(
        index: usize,
        reference: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidReference {
            index,
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`FourcutError::IncompleteFetch`] value.
    pub fn incomplete_fetch(expected: usize, fetched: usize, detail: impl Into<String>) -> Self {
        Self::IncompleteFetch {
            expected,
            fetched,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
