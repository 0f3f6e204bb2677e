//! Range convergence engine for SnowScape
//!
//! Decides, per UWB anchor, when a stream of noisy distance readings has
//! settled enough to be trusted, and emits one converged distance vector
//! for downstream position computation.
//!
//! Key constraints:
//! - Runs next to the radio on an ESP32-class MCU
//! - No heap allocation, no blocking anywhere in the engine path
//! - Window sizes are single-digit; simplicity beats cleverness
//!
//! ```rust
//! use ranging_core::{ConvergenceEngine, MemorySource, converge_with};
//!
//! let samples = [[371, 120], [373, 121], [374, 120], [375, 122], [376, 121]];
//! let mut source = MemorySource::new(&samples);
//! let mut engine = ConvergenceEngine::<2, 5>::new(5);
//!
//! let converged = converge_with(&mut engine, &mut source).unwrap();
//! assert_eq!(converged, [373, 120]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod engine;
pub mod errors;
pub mod queue;
pub mod report;
pub mod source;
pub mod window;

// Public API
pub use engine::{ConvergenceEngine, EngineState, OverflowAdvisory};
pub use errors::{RangingError, RangingResult};
pub use source::{converge_with, ConvergeError, MemorySource, SampleSource, SourceError};
pub use window::{ChannelWindow, WindowStats};

/// Crate version, for telemetry banners
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
