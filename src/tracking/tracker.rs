use std::collections::VecDeque;
use std::io::BufRead;

use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::tracking::report::TrackingReport;
use crate::tracking::wire::{ReportLine, decode_line};

/// Source of raw per-frame measurements.
///
/// `Ok(None)` means no face was found this frame, which is a normal outcome. Errors are reserved
/// for a broken collaborator (dead process, exhausted stream, undecodable output).
pub trait Tracker {
    /// Produce the next raw report.
    fn next_report(&mut self) -> LayertuberResult<Option<TrackingReport>>;
}

impl<T: Tracker + ?Sized> Tracker for Box<T> {
    fn next_report(&mut self) -> LayertuberResult<Option<TrackingReport>> {
        (**self).next_report()
    }
}

/// Replays a JSON Lines report stream (see [`crate::tracking::wire`]).
///
/// Control lines are skipped; the end of the stream is a tracker error.
#[derive(Debug)]
pub struct ReplayTracker<R> {
    reader: R,
    line: String,
    line_no: u64,
}

impl<R: BufRead> ReplayTracker<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Tracker for ReplayTracker<R> {
    fn next_report(&mut self) -> LayertuberResult<Option<TrackingReport>> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| LayertuberError::tracker(format!("read report stream: {e}")))?;
            if n == 0 {
                return Err(LayertuberError::tracker("report stream ended"));
            }
            self.line_no += 1;
            if self.line.trim().is_empty() {
                continue;
            }
            match decode_line(&self.line) {
                Ok(ReportLine::Report(r)) => return Ok(r),
                Ok(ReportLine::Calibrate) => {
                    tracing::debug!(line = self.line_no, "skipping control line in replay");
                }
                Err(e) => {
                    return Err(LayertuberError::tracker(format!(
                        "line {}: {e}",
                        self.line_no
                    )));
                }
            }
        }
    }
}

/// Plays back a fixed list of frames, then reports the stream as ended.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTracker {
    frames: VecDeque<Option<TrackingReport>>,
}

impl ScriptedTracker {
    /// Create a tracker that yields `frames` in order.
    pub fn new(frames: impl IntoIterator<Item = Option<TrackingReport>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Number of frames not yet consumed.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Tracker for ScriptedTracker {
    fn next_report(&mut self) -> LayertuberResult<Option<TrackingReport>> {
        self.frames
            .pop_front()
            .ok_or_else(|| LayertuberError::tracker("scripted frames exhausted"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/tracker.rs"]
mod tests;
