//! Sample Sources and the Convergence Driving Loop
//!
//! ## Overview
//!
//! The engine is fed by pull-based sources: anything that can produce the
//! next raw per-anchor sample or say "nothing yet" without blocking. The
//! firmware originally carried two near-identical convergence loops, one over
//! synthetic test data and one over live readings parsed off the serial
//! port; both collapse here into [`converge_with`] over the [`SampleSource`]
//! seam, selected by the caller.
//!
//! ```text
//! MemorySource ─┐
//! ReportSource ─┼─→ SampleSource ─→ converge_with ─→ [i32; C]
//! QueueSource  ─┘     (poll)           (drain)        converged vector
//! ```
//!
//! ## Non-Blocking Contract
//!
//! Sources follow the `nb` crate pattern:
//! - `Ok(sample)`: a reading is available
//! - `Err(nb::Error::WouldBlock)`: no data this tick — the engine is simply
//!   not invoked, window contents are untouched, no placeholder is pushed
//! - `Err(nb::Error::Other(e))`: a real source failure
//!
//! This works equally well under an interrupt-driven sampler, a polling
//! event loop, or a timer callback; the engine itself never waits.

use nb;

use crate::{
    engine::ConvergenceEngine,
    errors::RangingError,
};

/// Source error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError<E> {
    /// Underlying transport error
    Transport(E),
    /// Data could not be parsed into a sample
    Format(&'static str),
    /// Source exhausted (replay finished, serial link closed)
    EndOfStream,
}

/// Pull-based supplier of raw per-anchor distance samples.
///
/// `C` is the channel count; one poll yields one atomic reading event of
/// `C` distances, never a partial vector.
pub trait SampleSource<const C: usize> {
    /// Transport-specific error type (`Infallible` for in-memory sources)
    type Error;

    /// Poll for the next sample (non-blocking).
    ///
    /// `WouldBlock` means "no new data yet, try again later" and must be
    /// cheap to return; it is the normal idle answer for live sources.
    fn poll_sample(&mut self) -> nb::Result<[i32; C], SourceError<Self::Error>>;

    /// Hint about remaining samples, for progress tracking
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None) // Unknown by default
    }
}

/// Memory-backed source for tests and replay
///
/// ## Use Cases
///
/// 1. **Unit Testing**: feed known reading sequences deterministically
/// 2. **Replay**: re-run a recorded ranging session
/// 3. **Simulation**: the firmware's old synthetic-data loop, without the
///    global sample index it used to keep
///
/// ## Example
///
/// ```rust
/// use ranging_core::source::{SampleSource, MemorySource};
///
/// let samples = [[309, 120], [308, 121]];
/// let mut source = MemorySource::new(&samples);
///
/// assert_eq!(source.poll_sample().unwrap(), [309, 120]);
/// assert_eq!(source.poll_sample().unwrap(), [308, 121]);
/// assert!(source.poll_sample().is_err()); // EndOfStream
/// ```
pub struct MemorySource<'a, const C: usize> {
    /// Slice of samples to replay
    samples: &'a [[i32; C]],
    /// Current position
    position: usize,
}

impl<'a, const C: usize> MemorySource<'a, C> {
    /// Create new memory source over a slice of samples
    pub fn new(samples: &'a [[i32; C]]) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Rewind to the beginning
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl<'a, const C: usize> SampleSource<C> for MemorySource<'a, C> {
    type Error = core::convert::Infallible;

    fn poll_sample(&mut self) -> nb::Result<[i32; C], SourceError<Self::Error>> {
        if self.position >= self.samples.len() {
            return Err(nb::Error::Other(SourceError::EndOfStream));
        }

        let sample = self.samples[self.position];
        self.position += 1;
        Ok(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len() - self.position;
        (remaining, Some(remaining))
    }
}

/// Failures of a [`converge_with`] run, from either side of the seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergeError<E> {
    /// The source failed or ran out of data before convergence
    Source(SourceError<E>),
    /// The engine rejected a sample
    Engine(RangingError),
}

/// Drains a source into an engine until the ranges converge.
///
/// Returns:
/// - `Ok(vector)` — all channels stabilized; `vector` is the converged
///   per-anchor distance vector
/// - `Err(WouldBlock)` — the source has momentarily run dry before
///   convergence; window contents are preserved, call again later
/// - `Err(Other(e))` — the source failed (including `EndOfStream`) or the
///   engine rejected a sample
///
/// Convergence is not guaranteed for noisy input; the caller owns any
/// overall timeout or retry policy, typically by bounding how often it
/// re-invokes this after `WouldBlock`.
///
/// ## Example
///
/// ```rust
/// use ranging_core::engine::ConvergenceEngine;
/// use ranging_core::source::{converge_with, MemorySource};
///
/// let samples = [[371], [373], [374], [375], [376]];
/// let mut source = MemorySource::new(&samples);
/// let mut engine = ConvergenceEngine::<1, 5>::new(5);
///
/// let converged = converge_with(&mut engine, &mut source).unwrap();
/// assert_eq!(converged, [373]);
/// ```
pub fn converge_with<const C: usize, const W: usize, S>(
    engine: &mut ConvergenceEngine<C, W>,
    source: &mut S,
) -> nb::Result<[i32; C], ConvergeError<S::Error>>
where
    S: SampleSource<C>,
{
    loop {
        let sample = match source.poll_sample() {
            Ok(sample) => sample,
            Err(nb::Error::WouldBlock) => return Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(e)) => {
                return Err(nb::Error::Other(ConvergeError::Source(e)))
            }
        };

        match engine.ingest(&sample) {
            Ok(Some(converged)) => return Ok(converged),
            Ok(None) => continue,
            Err(e) => return Err(nb::Error::Other(ConvergeError::Engine(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_replays_in_order() {
        let samples = [[1, 2], [3, 4], [5, 6]];
        let mut source = MemorySource::new(&samples);

        assert_eq!(source.size_hint(), (3, Some(3)));
        assert_eq!(source.poll_sample().unwrap(), [1, 2]);
        assert_eq!(source.size_hint(), (2, Some(2)));
    }

    #[test]
    fn memory_source_signals_end_of_stream() {
        let samples = [[9]];
        let mut source = MemorySource::new(&samples);

        source.poll_sample().unwrap();
        assert_eq!(
            source.poll_sample(),
            Err(nb::Error::Other(SourceError::EndOfStream))
        );
    }

    #[test]
    fn rewind_restarts_replay() {
        let samples = [[7], [8]];
        let mut source = MemorySource::new(&samples);

        source.poll_sample().unwrap();
        source.rewind();
        assert_eq!(source.poll_sample().unwrap(), [7]);
    }

    #[test]
    fn converge_with_stops_at_first_convergence() {
        // Stable by sample 3; trailing samples must remain unread
        let samples = [[10], [10], [10], [99], [99]];
        let mut source = MemorySource::new(&samples);
        let mut engine = ConvergenceEngine::<1, 3>::new(0);

        let converged = converge_with(&mut engine, &mut source).unwrap();
        assert_eq!(converged, [10]);
        assert_eq!(source.size_hint(), (2, Some(2)));
    }

    #[test]
    fn converge_with_surfaces_exhaustion() {
        let samples = [[10], [20]];
        let mut source = MemorySource::new(&samples);
        let mut engine = ConvergenceEngine::<1, 5>::new(5);

        let result = converge_with(&mut engine, &mut source);
        assert_eq!(
            result,
            Err(nb::Error::Other(ConvergeError::Source(
                SourceError::EndOfStream
            )))
        );
    }
}
