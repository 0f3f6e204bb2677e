//! Range Report Line Parsing
//!
//! ## Overview
//!
//! The UWB module, once automatic reporting is enabled, interleaves range
//! reports with ordinary AT responses on its serial link. A report carries
//! the per-anchor distances as a parenthesized list:
//!
//! ```text
//! AT+RANGE=tid:0,mask:0x07,seq:41,range:(120,90,210,0,0,0,0,0),rssi:(-78.2,...)
//! ```
//!
//! This module extracts the `range:(...)` group from one line and turns it
//! into a raw sample for the engine. It parses text it is handed; reading
//! the serial port and managing the AT session stay with the firmware
//! collaborator that owns the link.
//!
//! ## Line Discipline
//!
//! - Lines without a `range:(` group are other module traffic and are
//!   skipped silently — they are not malformed, just not samples.
//! - Lines with the group but the wrong shape (unterminated list, junk
//!   tokens, wrong anchor count) are format errors: the sample they carry
//!   cannot be trusted even partially.

use crate::source::{SampleSource, SourceError};

/// Marker introducing the distance list in a report line.
pub const RANGE_GROUP_KEY: &str = "range:(";

/// Parses one line of module output.
///
/// Returns:
/// - `Ok(Some(sample))` — the line carried a well-formed report with
///   exactly `C` distances
/// - `Ok(None)` — the line is unrelated module traffic
/// - `Err(reason)` — the line claims to be a report but is malformed
///
/// ## Example
///
/// ```rust
/// use ranging_core::report::parse_range_report;
///
/// let line = "AT+RANGE=tid:0,mask:0x03,seq:7,range:(120,90),rssi:(-78.2,-80.1)";
/// assert_eq!(parse_range_report::<2>(line).unwrap(), Some([120, 90]));
///
/// assert_eq!(parse_range_report::<2>("AT+SETRPT=1").unwrap(), None);
/// ```
pub fn parse_range_report<const C: usize>(
    line: &str,
) -> Result<Option<[i32; C]>, &'static str> {
    let Some(start) = line.find(RANGE_GROUP_KEY) else {
        return Ok(None);
    };
    let body = &line[start + RANGE_GROUP_KEY.len()..];

    let Some(end) = body.find(')') else {
        return Err("unterminated range group");
    };
    let body = &body[..end];

    let mut sample = [0i32; C];
    let mut count = 0;

    for token in body.split(',') {
        if count >= C {
            return Err("more distances than channels");
        }
        sample[count] = token
            .trim()
            .parse()
            .map_err(|_| "distance is not an integer")?;
        count += 1;
    }

    if count != C {
        return Err("fewer distances than channels");
    }

    Ok(Some(sample))
}

/// [`SampleSource`] over an iterator of report lines.
///
/// Skips unrelated traffic, yields each parsed report in order, and signals
/// `EndOfStream` once the iterator is exhausted. The iterator seam keeps
/// the source agnostic of where lines come from: a recorded session slice
/// in tests, or a firmware-side line reader on the device.
pub struct ReportSource<I> {
    lines: I,
}

impl<I> ReportSource<I> {
    /// Create a source over a line iterator
    pub fn new(lines: I) -> Self {
        Self { lines }
    }
}

impl<'a, const C: usize, I> SampleSource<C> for ReportSource<I>
where
    I: Iterator<Item = &'a str>,
{
    type Error = core::convert::Infallible;

    fn poll_sample(&mut self) -> nb::Result<[i32; C], SourceError<Self::Error>> {
        loop {
            let Some(line) = self.lines.next() else {
                return Err(nb::Error::Other(SourceError::EndOfStream));
            };

            match parse_range_report::<C>(line) {
                Ok(Some(sample)) => return Ok(sample),
                Ok(None) => continue,
                Err(reason) => return Err(nb::Error::Other(SourceError::Format(reason))),
            }
        }
    }
}
