use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::foundation::math::{relative, subtract};
use crate::tracking::report::TrackingReport;
use crate::tracking::tracker::Tracker;

/// Holds the neutral baseline and turns raw reports into baseline-relative ones.
///
/// Exactly one task should own a `Calibration`; it is not shared between the tracking side and
/// the render side.
#[derive(Clone, Debug, Default)]
pub struct Calibration {
    neutral: Option<TrackingReport>,
    captures: u64,
}

impl Calibration {
    /// Create an uncalibrated instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a baseline has been captured.
    pub fn is_calibrated(&self) -> bool {
        self.neutral.is_some()
    }

    /// Current baseline, if any.
    pub fn neutral(&self) -> Option<&TrackingReport> {
        self.neutral.as_ref()
    }

    /// How many baselines have been captured so far.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// Replace the baseline wholesale.
    pub fn set_neutral(&mut self, neutral: TrackingReport) {
        self.neutral = Some(neutral);
        self.captures += 1;
    }

    /// Pull reports from `tracker` until one is present and store it as the new baseline.
    ///
    /// Frames without a face are skipped, so this blocks for as long as the tracker keeps
    /// returning `None`. Tracker errors are returned and leave the previous baseline in place.
    #[tracing::instrument(skip_all, fields(previous = self.captures))]
    pub fn calibrate<T: Tracker + ?Sized>(&mut self, tracker: &mut T) -> LayertuberResult<()> {
        let mut skipped = 0u64;
        let neutral = loop {
            match tracker.next_report()? {
                Some(raw) => break raw,
                None => skipped += 1,
            }
        };
        tracing::debug!(skipped, "captured neutral baseline");
        self.set_neutral(neutral);
        Ok(())
    }

    /// Express `raw` relative to the baseline.
    ///
    /// Offsets are subtracted, rotations are composed with the inverse of the baseline rotation,
    /// and scalar features are copied unchanged.
    pub fn normalize(&self, raw: &TrackingReport) -> LayertuberResult<TrackingReport> {
        let neutral = self.neutral.as_ref().ok_or(LayertuberError::NotCalibrated)?;
        let mut out = raw.clone();
        for (field, v) in raw.vec2s() {
            out.set_vec2(field, subtract(v, neutral.vec2(field)));
        }
        for (field, r) in raw.rotations() {
            out.set_rotation(field, relative(r, neutral.rotation(field)));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/calibration.rs"]
mod tests;
