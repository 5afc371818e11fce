use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::tracking::calibration::Calibration;
use crate::tracking::report::TrackingReport;
use crate::tracking::tracker::Tracker;

/// Requests accepted by a running [`TrackerSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    /// Produce the next normalized report.
    NextFrame,
    /// Capture a new neutral baseline before serving further frames.
    Calibrate,
}

/// Options for [`TrackerSession::spawn`].
#[derive(Clone, Debug)]
pub struct TrackerSessionOpts {
    /// Capacity of the bounded report channel (clamped to at least 1).
    pub report_capacity: usize,
}

impl Default for TrackerSessionOpts {
    fn default() -> Self {
        Self { report_capacity: 1 }
    }
}

type ReportMsg = LayertuberResult<Option<TrackingReport>>;

/// A tracker and its calibration state running on a dedicated thread.
///
/// The thread calibrates once on startup and then answers one [`ControlMessage::NextFrame`] with
/// exactly one message on the report channel. A report of `Ok(None)` means no face was found for
/// that frame. After the first error the thread stops.
pub struct TrackerSession {
    control: Sender<ControlMessage>,
    reports: Receiver<ReportMsg>,
    worker: JoinHandle<()>,
}

impl TrackerSession {
    /// Move `tracker` onto a new thread and start calibrating.
    pub fn spawn<T>(tracker: T, opts: TrackerSessionOpts) -> LayertuberResult<Self>
    where
        T: Tracker + Send + 'static,
    {
        let (control_tx, control_rx) = mpsc::channel::<ControlMessage>();
        let (report_tx, report_rx) = mpsc::sync_channel::<ReportMsg>(opts.report_capacity.max(1));

        let worker = std::thread::Builder::new()
            .name("layertuber-tracker".to_string())
            .spawn(move || run_tracker(tracker, control_rx, report_tx))
            .context("spawn tracker thread")?;

        Ok(Self {
            control: control_tx,
            reports: report_rx,
            worker,
        })
    }

    /// Ask the tracker thread for one more report.
    pub fn request_frame(&self) -> LayertuberResult<()> {
        self.send(ControlMessage::NextFrame)
    }

    /// Ask the tracker thread to recapture its baseline.
    ///
    /// Reports already produced are unaffected; the new baseline applies from the next requested
    /// frame on.
    pub fn recalibrate(&self) -> LayertuberResult<()> {
        self.send(ControlMessage::Calibrate)
    }

    /// Block until the next report arrives.
    pub fn next_report(&self) -> LayertuberResult<Option<TrackingReport>> {
        self.reports
            .recv()
            .map_err(|_| LayertuberError::tracker("tracker thread has stopped"))?
    }

    /// Non-blocking variant of [`Self::next_report`]; `None` when nothing is ready yet.
    pub fn try_next_report(&self) -> LayertuberResult<Option<Option<TrackingReport>>> {
        match self.reports.try_recv() {
            Ok(msg) => msg.map(Some),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(LayertuberError::tracker("tracker thread has stopped"))
            }
        }
    }

    /// Request and wait for one report.
    pub fn next_frame(&self) -> LayertuberResult<Option<TrackingReport>> {
        self.request_frame()?;
        self.next_report()
    }

    /// Stop the loop and wait for the thread to exit.
    ///
    /// A tracker blocked inside calibration keeps the thread alive until it yields a report or
    /// fails.
    pub fn shutdown(self) -> LayertuberResult<()> {
        let Self {
            control,
            reports,
            worker,
        } = self;
        drop(control);
        drop(reports);
        worker
            .join()
            .map_err(|_| LayertuberError::tracker("tracker thread panicked"))
    }

    fn send(&self, msg: ControlMessage) -> LayertuberResult<()> {
        self.control
            .send(msg)
            .map_err(|_| LayertuberError::tracker("tracker thread has stopped"))
    }
}

impl std::fmt::Debug for TrackerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerSession")
            .field("running", &!self.worker.is_finished())
            .finish()
    }
}

fn run_tracker<T: Tracker>(
    mut tracker: T,
    control: Receiver<ControlMessage>,
    reports: SyncSender<ReportMsg>,
) {
    let mut calibration = Calibration::new();
    if let Err(e) = calibration.calibrate(&mut tracker) {
        let _ = reports.send(Err(e));
        return;
    }

    for msg in control {
        let out = match msg {
            ControlMessage::Calibrate => match calibration.calibrate(&mut tracker) {
                Ok(()) => continue,
                Err(e) => Err(e),
            },
            ControlMessage::NextFrame => match tracker.next_report() {
                Ok(Some(raw)) => calibration.normalize(&raw).map(Some),
                Ok(None) => {
                    tracing::trace!("no face this frame");
                    Ok(None)
                }
                Err(e) => Err(e),
            },
        };
        let failed = out.is_err();
        if reports.send(out).is_err() || failed {
            break;
        }
    }
    tracing::debug!(captures = calibration.captures(), "tracker loop finished");
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/session.rs"]
mod tests;
