//! Fixed-Size Ring Buffer for Per-Anchor Range History
//!
//! ## Overview
//!
//! This module provides the sliding window that backs the convergence decision
//! for one anchor channel. The window holds the last `W` raw distance readings
//! in a ring buffer with a fixed, compile-time capacity, so it runs on
//! memory-constrained targets (the deployed rig is an ESP32 next to
//! the UWB module) without any heap allocation.
//!
//! ## Design Rationale
//!
//! ### Why a Ring Buffer?
//!
//! Stability detection only ever cares about the most recent `W` readings:
//! - New readings overwrite the oldest slot in place
//! - No shifting, no allocation, O(1) insertion
//! - The window is "primed" exactly when every slot has been written once
//!
//! ### Why Full Rescan Instead of Running Aggregates?
//!
//! `stats()` recomputes min/max/sum by scanning all `W` slots on every call.
//! This is deliberate: an incremental running min/max cannot be decremented
//! when the extreme value is the one being evicted from the ring, short of
//! carrying an auxiliary ordered structure (monotonic deque). At single-digit
//! `W` the rescan costs a handful of loads per evaluation, so the simpler
//! implementation wins.
//!
//! ### Overflow-Safe Summation
//!
//! The sum accumulates in `i64` and is checked against a configurable bound
//! before every addition. When the next addend would cross the bound, the sum
//! saturates there and the scan reports it, so a caller can surface an
//! advisory instead of consuming a silently wrapped mean. Earlier
//! firmware revisions hard-coded guard constants that plausible distances can
//! never reach; here the bound is a parameter so narrow deployments can set
//! it to their actual headroom.
//!
//! ### Memory Layout
//!
//! ```text
//! ChannelWindow<5> layout:
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  ← slots: [i32; 5]
//! └─────┴─────┴─────┴─────┴─────┘
//!    ↑
//!    └── write_pos wraps to 0 after 5 pushes, setting `primed`
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use ranging_core::window::ChannelWindow;
//!
//! let mut window: ChannelWindow<5> = ChannelWindow::new();
//!
//! for reading in [309, 308, 307, 305, 302] {
//!     window.push(reading);
//! }
//!
//! assert!(window.is_primed());
//! let stats = window.stats(i64::MAX);
//! assert_eq!((stats.min, stats.max, stats.sum), (302, 309, 1531));
//! ```

/// Aggregate view of one window, produced by a full rescan.
///
/// `saturated` is set when the running sum hit the caller-supplied bound and
/// stopped accumulating; the engine turns this into an overflow advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    /// Smallest reading currently in the window
    pub min: i32,
    /// Largest reading currently in the window
    pub max: i32,
    /// Sum of all readings, saturated at the requested bound
    pub sum: i64,
    /// Whether the sum saturated instead of accumulating exactly
    pub saturated: bool,
}

impl WindowStats {
    /// Spread of the window, `max - min`, widened so extreme readings
    /// spanning the full `i32` range cannot overflow the subtraction.
    pub fn spread(&self) -> i64 {
        self.max as i64 - self.min as i64
    }
}

/// Sliding window of the last `W` raw distance readings for one anchor.
///
/// ## Type Parameter
///
/// - `W`: number of most-recent readings retained. The stock deployment
///   uses 5. `W >= 1` is required structurally; `W >= 2` for the spread to
///   say anything about stability.
///
/// ## Internal Invariants
///
/// - `write_pos < W` (next write position is always valid)
/// - `primed` is true iff `write_pos` has wrapped to 0 at least once
/// - Slots beyond the write position hold stale data until primed, which is
///   why [`stats`](Self::stats) must not be trusted before [`is_primed`](Self::is_primed)
///
/// ## Thread Safety
///
/// Not thread-safe. The engine owns its windows exclusively; cross-schedule
/// producers go through the SPSC queue in [`crate::queue`] instead.
#[derive(Debug, Clone, Copy)]
pub struct ChannelWindow<const W: usize> {
    /// Ring storage; zeroed at construction, stale until primed
    slots: [i32; W],

    /// Index where the next push lands, wraps modulo `W`
    write_pos: usize,

    /// Set the first time `write_pos` wraps back to 0
    primed: bool,
}

impl<const W: usize> ChannelWindow<W> {
    /// Creates an empty, unprimed window.
    ///
    /// Const so windows can live in statics on embedded targets.
    pub const fn new() -> Self {
        Self {
            slots: [0; W],
            write_pos: 0,
            primed: false,
        }
    }

    /// Inserts a reading into the next ring slot, evicting the oldest once
    /// the window is full.
    ///
    /// The window becomes primed the first time the write index wraps back
    /// to slot 0, i.e. after exactly `W` pushes.
    pub fn push(&mut self, value: i32) {
        self.slots[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % W;

        if self.write_pos == 0 {
            self.primed = true;
        }
    }

    /// Whether every slot has been written at least once since the last clear.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Empties the window and resets the primed flag.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.primed = false;
    }

    /// Recomputes `(min, max, sum)` by scanning all `W` slots.
    ///
    /// `limit` bounds the absolute value of the running sum: before each
    /// addition the addend is compared against the remaining headroom, and
    /// on a would-be crossing the sum pins to `±limit` and the result is
    /// flagged `saturated`. Pass `i64::MAX` when the accumulator width is
    /// trusted (`W` additions of plausible i32 distances cannot reach it).
    ///
    /// Only meaningful once the window [`is_primed`](Self::is_primed);
    /// before that, unwritten slots contribute their zeroed contents.
    pub fn stats(&self, limit: i64) -> WindowStats {
        debug_assert!(limit > 0);

        let mut min = self.slots[0];
        let mut max = self.slots[0];
        let mut sum: i64 = 0;
        let mut saturated = false;

        for &value in &self.slots {
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }

            let addend = value as i64;
            if addend > 0 && sum > limit - addend {
                sum = limit;
                saturated = true;
            } else if addend < 0 && sum < -limit - addend {
                sum = -limit;
                saturated = true;
            } else {
                sum += addend;
            }
        }

        WindowStats {
            min,
            max,
            sum,
            saturated,
        }
    }
}

impl<const W: usize> Default for ChannelWindow<W> {
    fn default() -> Self {
        Self::new()
    }
}
