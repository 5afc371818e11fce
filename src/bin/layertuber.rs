use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layertuber::{
    Calibration, Canvas, GroupTransforms, LayertuberResult, PngSequenceSink, RenderThreading,
    ReportLine, Rgba8Premul, RigOptions, TrackingReport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layertuber", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a report stream into a PNG sequence.
    Render(RenderArgs),
    /// Calibrate a raw report stream and write it back normalized.
    Normalize(NormalizeArgs),
    /// Assemble a rig, report diagnostics and print its node tree.
    Check(RigArgs),
}

#[derive(Parser, Debug)]
struct RigArgs {
    /// Asset manifest JSON.
    #[arg(long)]
    asset: PathBuf,

    /// Rig configuration, YAML (`.yaml`/`.yml`) or JSON. Defaults to `<asset>.layertuber.yaml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum output width.
    #[arg(long, default_value_t = 1024)]
    max_width: u32,

    /// Maximum output height.
    #[arg(long, default_value_t = 1024)]
    max_height: u32,

    /// Frame background as `#rrggbb` or `#rrggbbaa`.
    #[arg(long, default_value = "#00ff00")]
    background: Rgba8Premul,

    /// Apply group follow/rotate rules to the composited group image.
    #[arg(long)]
    group_transforms: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    rig: RigArgs,

    /// JSON Lines report stream, or `-` for stdin.
    #[arg(long)]
    reports: PathBuf,

    /// The stream is already normalized; skip calibration.
    #[arg(long)]
    normalized: bool,

    /// Output directory for `frame_NNNNNN.png` files.
    #[arg(long)]
    out: PathBuf,

    /// Render frames on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Thread pool size (implies `--parallel`).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Raw JSON Lines report stream, or `-` for stdin.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Normalize(args) => cmd_normalize(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let f = File::open(path).with_context(|| format!("open report stream '{}'", path.display()))?;
    Ok(Box::new(BufReader::new(f)))
}

fn load(args: &RigArgs) -> anyhow::Result<layertuber::Rig> {
    let opts = RigOptions {
        max_size: Canvas::new(args.max_width, args.max_height),
        background: args.background,
        group_transforms: if args.group_transforms {
            GroupTransforms::ApplyToComposite
        } else {
            GroupTransforms::Ignore
        },
    };
    let (rig, diags) = layertuber::load_rig(&args.asset, args.config.as_deref(), &opts)
        .with_context(|| format!("load rig '{}'", args.asset.display()))?;
    for d in &diags {
        match d {
            layertuber::Diagnostic::Unconfigured { .. } => tracing::debug!("{d}"),
            _ => tracing::warn!("{d}"),
        }
    }
    let size = rig.target_size();
    tracing::info!(
        width = size.width,
        height = size.height,
        nodes = rig.node_count(),
        "rig assembled"
    );
    Ok(rig)
}

/// Decodes a report stream line by line, optionally calibrating it.
///
/// The first present report captures the baseline, as does the first present report after each
/// `"calibrate"` control line. Blank lines are skipped.
struct ReportStream {
    lines: std::io::Lines<Box<dyn BufRead>>,
    line_no: usize,
    calibration: Option<Calibration>,
    pending_calibration: bool,
}

impl ReportStream {
    fn new(input: Box<dyn BufRead>, calibrate: bool) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
            calibration: calibrate.then(Calibration::new),
            pending_calibration: calibrate,
        }
    }

    fn process(&mut self, line: &str) -> LayertuberResult<Option<Option<TrackingReport>>> {
        let raw = match layertuber::decode_line(line)? {
            ReportLine::Calibrate => {
                self.pending_calibration = self.calibration.is_some();
                return Ok(None);
            }
            ReportLine::Report(raw) => raw,
        };
        let Some(raw) = raw else {
            return Ok(Some(None));
        };
        let Some(cal) = self.calibration.as_mut() else {
            return Ok(Some(Some(raw)));
        };
        if self.pending_calibration {
            cal.set_neutral(raw.clone());
            self.pending_calibration = false;
            tracing::info!(line = self.line_no, "captured neutral baseline");
        }
        cal.normalize(&raw).map(|r| Some(Some(r)))
    }
}

impl Iterator for ReportStream {
    type Item = LayertuberResult<Option<TrackingReport>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(layertuber::LayertuberError::tracker(format!(
                        "read report stream: {e}"
                    ))));
                }
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match self.process(&line) {
                Ok(None) => continue,
                Ok(Some(report)) => return Some(Ok(report)),
                Err(e) => {
                    return Some(Err(layertuber::LayertuberError::tracker(format!(
                        "line {}: {e}",
                        self.line_no
                    ))));
                }
            }
        }
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let rig = load(&args.rig)?;
    let stream = ReportStream::new(open_input(&args.reports)?, !args.normalized);
    let threading = RenderThreading {
        parallel: args.parallel || args.threads.is_some(),
        threads: args.threads,
        ..RenderThreading::default()
    };

    let mut sink = PngSequenceSink::new(&args.out);
    let stats = layertuber::render_reports_with(&rig, stream, &mut sink, &threading)?;

    eprintln!(
        "wrote {} frames to {} ({} without a face)",
        stats.frames_rendered,
        args.out.display(),
        stats.frames_skipped
    );
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let stream = ReportStream::new(open_input(&args.in_path)?, true);
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for report in stream {
        layertuber::write_line(&mut out, report?.as_ref())?;
    }
    out.flush().context("flush stdout")?;
    Ok(())
}

fn cmd_check(args: RigArgs) -> anyhow::Result<()> {
    let rig = load(&args)?;
    let size = rig.target_size();
    println!("{}x{} ({} nodes)", size.width, size.height, rig.node_count());
    print!("{}", rig.outline());
    Ok(())
}
