//! Error types for the analyzer.

use thiserror::Error;

/// Errors reported by [`Analyzer`](crate::Analyzer) operations.
///
/// Degenerate numeric conditions (zero magnitude sums, zero variance) are
/// not errors; each statistic has a documented fallback value instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    /// A working buffer could not be allocated during reconfiguration.
    ///
    /// The instance is left not-ready; feature operations return
    /// [`AnalyzerError::NotReady`] until a later `configure` succeeds.
    #[error("failed to allocate {buffer} buffer ({len} elements)")]
    Allocation {
        /// Name of the buffer that could not be acquired.
        buffer: &'static str,
        /// Requested element count.
        len: usize,
    },

    /// The instance has no valid buffers (initial configuration failed).
    #[error("analyzer is not configured")]
    NotReady,

    /// The requested feature is switched off by the current configuration.
    ///
    /// Zero sensitivity disables SPL, an empty band-edge list disables the
    /// fingerprint, a zero fuzz factor disables hashing, and a zero
    /// coefficient count disables MFCC.
    #[error("feature '{feature}' is disabled by configuration")]
    Disabled {
        /// Name of the disabled feature.
        feature: &'static str,
    },

    /// An input frame did not match the configured frame length.
    #[error("frame length mismatch: expected {expected}, got {got}")]
    FrameLength {
        /// Configured frame length.
        expected: usize,
        /// Length of the slice that was passed in.
        got: usize,
    },
}
