//! Multi-Channel Range Convergence Engine
//!
//! ## Overview
//!
//! The engine decides, per anchor, when a stream of noisy distance readings
//! has settled enough to be trusted, and emits a single converged distance
//! vector once *every* channel is stable in the same evaluation round. The
//! converged vector is what downstream position computation consumes; this
//! crate stops at producing it.
//!
//! ## How a Reading Becomes a Converged Distance
//!
//! ```text
//! RawSample ──→ push into all C windows ──→ primed? ──→ every spread ≤ T?
//!   [i32; C]        (oldest evicted)          │ no            │ yes
//!                                             ▼               ▼
//!                                          Ok(None)      Ok(Some(means))
//! ```
//!
//! Channels are evaluated in increasing index order and the first unstable
//! channel short-circuits the round. That is purely a performance choice:
//! no partial result is ever emitted, so the cutoff is not observable.
//!
//! ## State Machine
//!
//! ```text
//! EMPTY ──ingest──→ FILLING ──primed──→ EVALUATING ──all stable──→ CONVERGED
//!   ▲                                       │  ▲                       │
//!   │                                       └──┘ (re-entered           │
//!   └────────────────── reset() ◄──────────────── every ingest) ◄──────┘
//! ```
//!
//! CONVERGED is terminal for the cycle: further ingests are ignored until
//! the caller calls [`reset`](ConvergenceEngine::reset), which guarantees
//! the vector is emitted at most once per convergence event.
//!
//! ## Ownership
//!
//! One engine owns its windows exclusively. Earlier firmware builds kept the
//! window state in globals shared by two near-identical loops; here each
//! rig gets its own engine value, so several can run side by side and tests
//! are deterministic. There is no internal concurrency and no blocking:
//! waiting for data is the caller re-invoking `ingest` on its own schedule.
//!
//! ## Usage Example
//!
//! ```rust
//! use ranging_core::engine::ConvergenceEngine;
//!
//! // One channel, window of 5, spread tolerance of 5 cm
//! let mut engine = ConvergenceEngine::<1, 5>::new(5);
//!
//! for reading in [371, 373, 374, 375] {
//!     assert_eq!(engine.ingest(&[reading]).unwrap(), None);
//! }
//!
//! // Fifth reading fills the window; spread 376-371 = 5 is within bound
//! let converged = engine.ingest(&[376]).unwrap();
//! assert_eq!(converged, Some([373])); // (371+373+374+375+376)/5, truncating
//! ```

use crate::{
    constants::DEFAULT_STABILITY_THRESHOLD_CM,
    errors::{RangingError, RangingResult},
    window::ChannelWindow,
};

/// Lifecycle of one convergence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineState {
    /// No samples ingested since construction or the last reset
    Empty,
    /// Windows are filling; fewer than `W` samples seen
    Filling,
    /// Windows primed; every ingest re-evaluates stability
    Evaluating,
    /// A converged vector was emitted; terminal until reset
    Converged,
}

/// Advisory raised when a channel's window sum saturated its bound.
///
/// Non-fatal: the engine keeps running and the saturating semantics of the
/// accumulator apply. Meant for a logging/telemetry consumer, never for the
/// positioning caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverflowAdvisory {
    /// Channel whose window sum ran out of headroom
    pub channel: usize,
}

#[cfg(feature = "defmt")]
impl defmt::Format for OverflowAdvisory {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Sum headroom exhausted on channel {}", self.channel)
    }
}

/// Sliding-window stability detector over `C` anchor channels.
///
/// ## Type Parameters
///
/// - `C`: number of independently tracked anchors, fixed for the lifetime
///   of the instance (the stock deployment uses 8)
/// - `W`: samples per stability window (the stock deployment uses 5)
///
/// ## Configuration
///
/// - `threshold`: inclusive bound on `max - min` within a window for that
///   channel to count as stable
/// - `sum_limit`: headroom bound for the window accumulator, defaulting to
///   the full `i64` range — see [`ChannelWindow::stats`]
pub struct ConvergenceEngine<const C: usize, const W: usize> {
    windows: [ChannelWindow<W>; C],
    threshold: i32,
    sum_limit: i64,
    state: EngineState,
    advisory: Option<OverflowAdvisory>,
}

impl<const C: usize, const W: usize> ConvergenceEngine<C, W> {
    /// Creates an engine with the given stability threshold.
    ///
    /// Negative thresholds are clamped to 0 (a window can never have
    /// negative spread, so a negative bound would simply never converge).
    pub fn new(threshold: i32) -> Self {
        Self {
            windows: [ChannelWindow::new(); C],
            threshold: threshold.max(0),
            sum_limit: i64::MAX,
            state: EngineState::Empty,
            advisory: None,
        }
    }

    /// Overrides the accumulator headroom bound.
    ///
    /// Useful when the deployment wants the advisory to fire at the real
    /// headroom of a narrower downstream representation instead of the
    /// unreachable `i64` limit.
    pub fn with_sum_limit(mut self, limit: i64) -> Self {
        self.sum_limit = limit.max(1);
        self
    }

    /// Current position in the cycle lifecycle.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Stability threshold the engine was configured with.
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Takes the latched overflow advisory, if one fired since the last call.
    ///
    /// Consumed by logging/telemetry; reading it clears the latch.
    pub fn take_advisory(&mut self) -> Option<OverflowAdvisory> {
        self.advisory.take()
    }

    /// Feeds one atomic reading event into all channel windows and
    /// re-evaluates the convergence gate.
    ///
    /// Returns:
    /// - `Ok(Some(vector))` — every channel's spread is within the threshold
    ///   in this round; `vector[i]` is the truncating mean `sum / W` of
    ///   channel `i`'s window. Emitted at most once per cycle.
    /// - `Ok(None)` — keep sampling: windows still filling, at least one
    ///   channel unstable, or the cycle already converged.
    /// - `Err(ChannelMismatch)` — sample length differs from `C`; no window
    ///   was touched.
    pub fn ingest(&mut self, sample: &[i32]) -> RangingResult<Option<[i32; C]>> {
        if sample.len() != C {
            return Err(RangingError::ChannelMismatch {
                expected: C,
                actual: sample.len(),
            });
        }

        // Terminal for this cycle; the emitted vector stays the only one
        if self.state == EngineState::Converged {
            return Ok(None);
        }

        for (window, &value) in self.windows.iter_mut().zip(sample) {
            window.push(value);
        }

        // All windows fill in lockstep, but priming is tracked per channel
        if !self.windows.iter().all(ChannelWindow::is_primed) {
            self.state = EngineState::Filling;
            return Ok(None);
        }
        self.state = EngineState::Evaluating;

        let mut converged = [0i32; C];
        for (i, window) in self.windows.iter().enumerate() {
            let stats = window.stats(self.sum_limit);

            if stats.saturated {
                self.advisory = Some(OverflowAdvisory { channel: i });
                #[cfg(feature = "log")]
                log::warn!(
                    "range sum on channel {} saturated at {} (limit {})",
                    i,
                    stats.sum,
                    self.sum_limit
                );
            }

            // First unstable channel disqualifies the whole round
            if stats.spread() > self.threshold as i64 {
                return Ok(None);
            }

            // i64 division truncates toward zero, keeping the bias direction consistent
            converged[i] = (stats.sum / W as i64) as i32;
        }

        self.state = EngineState::Converged;
        Ok(Some(converged))
    }

    /// Clears all windows and primed flags, starting a new convergence
    /// cycle from `EMPTY`.
    ///
    /// Valid from any state; a reset engine behaves identically to a fresh
    /// one fed the same sequence.
    pub fn reset(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
        self.state = EngineState::Empty;
        self.advisory = None;
    }
}

impl<const C: usize, const W: usize> Default for ConvergenceEngine<C, W> {
    /// Engine with the stock deployment threshold (5 cm).
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_THRESHOLD_CM)
    }
}
