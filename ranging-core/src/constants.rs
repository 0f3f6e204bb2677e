//! Deployment defaults from the SnowScape field rig
//!
//! These are the values the SnowScape firmware shipped with; engines take
//! their real configuration at construction, so these only seed `Default`
//! impls and tests.

/// Anchors tracked by the stock deployment (the module reports 8 slots)
pub const DEFAULT_ANCHOR_COUNT: usize = 8;

/// Samples per stability window
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Maximum tolerated `max - min` within a window, in centimeters.
///
/// The module reports distances in cm; 5 cm of spread over 5 readings was
/// tight enough for room-scale trilateration downstream.
pub const DEFAULT_STABILITY_THRESHOLD_CM: i32 = 5;
