//! Error Types for Range Convergence
//!
//! ## Design Philosophy
//!
//! The error surface is deliberately tiny and embedded-friendly:
//!
//! 1. **Small and Copy**: every variant is a few machine words, no heap,
//!    no `String` — errors travel through hot polling loops.
//!
//! 2. **One fatal condition**: the only caller-facing failure is a sample
//!    whose shape does not match the engine's channel count. That is a
//!    programming error at the call site; engine state is left untouched so
//!    the caller can fix the sample and retry.
//!
//! 3. **Everything else is not an error**: "not yet converged" is a normal
//!    steady-state result (`Ok(None)` from ingest), and overflow risk is an
//!    advisory side channel ([`crate::engine::OverflowAdvisory`]), never a
//!    failure. Neither belongs in this enum.
//!
//! Source-level failures (transport, malformed report lines, exhausted
//! replay) live in [`crate::source::SourceError`], mirroring where the data
//! actually went wrong.

use thiserror_no_std::Error;

/// Result type for engine operations
pub type RangingResult<T> = Result<T, RangingError>;

/// Errors the convergence engine can return to its caller
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangingError {
    /// Sample vector length does not match the engine's channel count.
    ///
    /// The offending ingest has no effect on any window.
    #[error("Sample has {actual} channels, engine expects {expected}")]
    ChannelMismatch {
        /// Channel count the engine was constructed with
        expected: usize,
        /// Length of the sample the caller provided
        actual: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for RangingError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ChannelMismatch { expected, actual } => {
                defmt::write!(fmt, "Sample has {} channels, expected {}", actual, expected)
            }
        }
    }
}
