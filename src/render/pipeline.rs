use std::sync::mpsc;

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::render::compositor::{FrameBuffer, render_frame};
use crate::rig::tree::Rig;
use crate::tracking::report::TrackingReport;

/// Threading for batch rendering.
#[derive(Clone, Debug)]
pub struct RenderThreading {
    /// Render chunks of frames on a rayon pool.
    pub parallel: bool,
    /// Frames handed to the pool at a time (`0` is treated as `1`).
    pub chunk_size: usize,
    /// Pool size; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Frames buffered between the renderer and the sink thread.
    pub channel_capacity: usize,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
        }
    }
}

/// Counters from a batch render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Reports consumed.
    pub frames_total: u64,
    /// Frames rendered and delivered.
    pub frames_rendered: u64,
    /// Reports without a face; nothing was rendered for them.
    pub frames_skipped: u64,
}

/// Render every report in order. Absent reports yield `None` in the same position.
///
/// With `threading.parallel` the frames are rendered on a rayon pool; the output is identical to
/// the sequential result.
pub fn render_frames(
    rig: &Rig,
    reports: &[Option<TrackingReport>],
    threading: &RenderThreading,
) -> LayertuberResult<(Vec<Option<FrameBuffer>>, RenderStats)> {
    let render = |r: &Option<TrackingReport>| r.as_ref().map(|r| render_frame(rig, r));
    let frames: Vec<Option<FrameBuffer>> = if threading.parallel {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| reports.par_iter().map(render).collect())
    } else {
        reports.iter().map(render).collect()
    };

    let rendered = frames.iter().filter(|f| f.is_some()).count() as u64;
    let stats = RenderStats {
        frames_total: frames.len() as u64,
        frames_rendered: rendered,
        frames_skipped: frames.len() as u64 - rendered,
    };
    Ok((frames, stats))
}

/// Stream reports through the compositor into `sink` using default threading.
pub fn render_reports<I>(
    rig: &Rig,
    reports: I,
    sink: &mut dyn FrameSink,
) -> LayertuberResult<RenderStats>
where
    I: IntoIterator<Item = LayertuberResult<Option<TrackingReport>>>,
{
    render_reports_with(rig, reports, sink, &RenderThreading::default())
}

/// Stream reports through the compositor into `sink`.
///
/// Frames reach the sink on a dedicated thread, tagged with the index of their report and in
/// report order. The first report error stops the render and is returned after the sink has been
/// closed.
#[tracing::instrument(skip_all, fields(parallel = threading.parallel))]
pub fn render_reports_with<I>(
    rig: &Rig,
    reports: I,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
) -> LayertuberResult<RenderStats>
where
    I: IntoIterator<Item = LayertuberResult<Option<TrackingReport>>>,
{
    let size = rig.target_size();
    let cfg = SinkConfig {
        width: size.width,
        height: size.height,
    };
    let chunk_size = threading.chunk_size.max(1);
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    std::thread::scope(|scope| -> LayertuberResult<RenderStats> {
        let (tx, rx) = mpsc::sync_channel::<(u64, FrameBuffer)>(threading.channel_capacity.max(1));

        let enc = scope.spawn(move || -> LayertuberResult<()> {
            sink.begin(cfg)?;
            for (idx, frame) in rx {
                sink.push_frame(idx, &frame)?;
            }
            sink.end()
        });

        let mut stats = RenderStats::default();
        let produce = (|| -> LayertuberResult<()> {
            let mut reports = reports.into_iter();
            let mut next_idx = 0u64;
            loop {
                let mut chunk = Vec::with_capacity(chunk_size);
                // Reports read before a failing one are still delivered.
                let mut failed = None;
                for item in reports.by_ref().take(chunk_size) {
                    match item {
                        Ok(report) => {
                            chunk.push((next_idx, report));
                            next_idx += 1;
                        }
                        Err(e) => {
                            failed = Some(e);
                            break;
                        }
                    }
                }
                if chunk.is_empty() {
                    return failed.map_or(Ok(()), Err);
                }
                stats.frames_total += chunk.len() as u64;

                let present: Vec<(u64, &TrackingReport)> = chunk
                    .iter()
                    .filter_map(|(i, r)| r.as_ref().map(|r| (*i, r)))
                    .collect();
                stats.frames_skipped += (chunk.len() - present.len()) as u64;

                let frames: Vec<(u64, FrameBuffer)> = match pool.as_ref() {
                    Some(pool) => pool.install(|| {
                        present
                            .par_iter()
                            .map(|(i, r)| (*i, render_frame(rig, r)))
                            .collect()
                    }),
                    None => present
                        .iter()
                        .map(|(i, r)| (*i, render_frame(rig, r)))
                        .collect(),
                };
                for msg in frames {
                    tx.send(msg).map_err(|_| {
                        LayertuberError::Other(anyhow::anyhow!(
                            "sink thread is not accepting frames"
                        ))
                    })?;
                    stats.frames_rendered += 1;
                }
                if let Some(e) = failed {
                    return Err(e);
                }
            }
        })();
        drop(tx);

        let enc_res = enc
            .join()
            .map_err(|_| LayertuberError::Other(anyhow::anyhow!("sink thread panicked")))?;
        // A sink failure is the root cause of a failed send, so report it first.
        enc_res?;
        produce?;
        tracing::debug!(
            total = stats.frames_total,
            rendered = stats.frames_rendered,
            skipped = stats.frames_skipped,
            "render finished"
        );
        Ok(stats)
    })
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> LayertuberResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LayertuberError::invalid_config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        LayertuberError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
