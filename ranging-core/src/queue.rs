//! SPSC Handoff Between Sampler and Convergence Loop
//!
//! ## Overview
//!
//! The engine assumes a single caller and never blocks, so when sampling and
//! convergence run on different schedules — say a serial-RX interrupt
//! producing readings and a main-loop consumer polling for convergence —
//! the boundary needs a single-producer single-consumer discipline. This
//! module provides that boundary as a fixed-capacity `heapless::spsc` queue
//! of raw samples whose consumer half is itself a [`SampleSource`].
//!
//! ```text
//! ISR / sampler task                 main loop
//!        │                                │
//!   producer.push(sample) ─→ ring ─→ QueueSource::poll_sample
//!        │                                │
//!   full? count the drop            empty? WouldBlock
//! ```
//!
//! ## Drop Policy
//!
//! When the queue is full the producer drops the new sample and counts it.
//! For range convergence, losing a reading is harmless — absence of data is
//! simply not an ingest call — while blocking an interrupt handler is not.
//! The drop counter is the producer-side health signal for telemetry.
//!
//! ## Capacity
//!
//! `heapless::spsc::Queue<T, N>` holds up to `N - 1` items, so size `N` one
//! larger than the burst you need to absorb.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::source::{SampleSource, SourceError};

/// Fixed-capacity SPSC queue of raw per-anchor samples.
///
/// Split it once into a producer and a consumer half and hand them to the
/// two sides of the boundary:
///
/// ```rust
/// use ranging_core::queue::SampleQueue;
/// use ranging_core::source::SampleSource;
///
/// let mut queue: SampleQueue<2, 8> = SampleQueue::new();
/// let (mut producer, mut source) = queue.split();
///
/// assert!(producer.push([120, 90]));
/// assert_eq!(source.poll_sample().unwrap(), [120, 90]);
/// assert!(source.poll_sample().is_err()); // WouldBlock: queue drained
/// ```
pub struct SampleQueue<const C: usize, const N: usize> {
    inner: Queue<[i32; C], N>,
}

impl<const C: usize, const N: usize> SampleQueue<C, N> {
    /// Creates an empty queue.
    ///
    /// Const so the queue can live in a static shared between an interrupt
    /// handler and the main loop.
    pub const fn new() -> Self {
        Self {
            inner: Queue::new(),
        }
    }

    /// Splits into the producer half and the `SampleSource` consumer half.
    pub fn split(&mut self) -> (SampleProducer<'_, C, N>, QueueSource<'_, C, N>) {
        let (producer, consumer) = self.inner.split();
        (
            SampleProducer {
                inner: producer,
                dropped: 0,
            },
            QueueSource { inner: consumer },
        )
    }
}

impl<const C: usize, const N: usize> Default for SampleQueue<C, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half: owned by the sampling side of the boundary.
pub struct SampleProducer<'a, const C: usize, const N: usize> {
    inner: Producer<'a, [i32; C], N>,
    dropped: u32,
}

impl<'a, const C: usize, const N: usize> SampleProducer<'a, C, N> {
    /// Enqueues a sample; on a full queue the sample is dropped and counted.
    ///
    /// Returns whether the sample was accepted. Never blocks.
    pub fn push(&mut self, sample: [i32; C]) -> bool {
        match self.inner.enqueue(sample) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }

    /// Samples dropped because the consumer fell behind.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Consumer half: a [`SampleSource`] that drains the queue.
pub struct QueueSource<'a, const C: usize, const N: usize> {
    inner: Consumer<'a, [i32; C], N>,
}

impl<'a, const C: usize, const N: usize> SampleSource<C> for QueueSource<'a, C, N> {
    type Error = core::convert::Infallible;

    fn poll_sample(&mut self) -> nb::Result<[i32; C], SourceError<Self::Error>> {
        // Empty queue is "no data this tick", never an error
        self.inner.dequeue().ok_or(nb::Error::WouldBlock)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = self.inner.len();
        (pending, Some(pending))
    }
}
