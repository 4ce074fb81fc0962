use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use plant_monitor::{
    check_cameras, Archiver, CameraConfig, ControlLoop, MetricsHub, MonitorConfig, SystemClock,
};
use plant_vision::{FrameSource, Rect, SilhouetteParams};
use plc_link::{JsonFileStore, PlcVariable, Value, VariableStore};

#[derive(Parser, Debug)]
#[command(
    name = "pv",
    version,
    about = "Plant verticality checker",
    disable_help_subcommand = true
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where frames come from.
#[derive(clap::Args, Debug)]
struct CameraArgs {
    /// Serve `<dir>/<camera_id>.png` instead of real cameras
    #[arg(long)]
    frames_dir: Option<PathBuf>,
    /// Grab from devices through OpenCV (camera id is the device spec)
    #[arg(long, action = ArgAction::SetTrue)]
    opencv: bool,
    /// Synthetic cameras showing an upright post
    #[arg(long, action = ArgAction::SetTrue)]
    synthetic: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the session-gated control loop until the controller says exit
    Run {
        /// YAML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Simulate a controller that runs N sessions and then exits
        #[arg(long)]
        mock: Option<u32>,
        /// JSON file standing in for the controller's variables
        #[arg(long)]
        store_file: Option<PathBuf>,
        #[command(flatten)]
        cameras: CameraArgs,
    },
    /// Grab one frame from every configured camera
    CheckCameras {
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        cameras: CameraArgs,
    },
    /// Run the single-frame pipeline on an image file
    Analyze {
        #[arg(long)]
        image: PathBuf,
        /// Crop window as x,y,w,h
        #[arg(long)]
        crop: Rect,
        /// Region of interest inside the crop as x,y,w,h
        #[arg(long)]
        roi: Rect,
        #[arg(long)]
        threshold: Option<u8>,
        #[arg(long)]
        kernel: Option<u32>,
        #[arg(long)]
        iterations: Option<u32>,
        /// Write the annotated mask here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a starting configuration
    ConfigTemplate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli.log_level);

    match cli.command {
        Commands::Run {
            config,
            mock,
            store_file,
            cameras,
        } => run(config.as_deref(), mock, store_file.as_deref(), &cameras),
        Commands::CheckCameras { config, cameras } => camera_check(config.as_deref(), &cameras),
        Commands::Analyze {
            image,
            crop,
            roi,
            threshold,
            kernel,
            iterations,
            out,
        } => {
            let defaults = SilhouetteParams::default();
            let params = SilhouetteParams {
                threshold: threshold.unwrap_or(defaults.threshold),
                kernel_size: kernel.unwrap_or(defaults.kernel_size),
                iterations: iterations.unwrap_or(defaults.iterations),
            };
            analyze(&image, &crop, &roi, &params, out.as_deref())
        }
        Commands::ConfigTemplate => {
            print!("{}", serde_yaml::to_string(&MonitorConfig::example())?);
            Ok(())
        }
    }
}

fn setup_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Two synthetic cameras framed around the mock post.
fn mock_config() -> MonitorConfig {
    let camera = |id: &str| CameraConfig {
        id: id.to_string(),
        crop: Rect::new(100, 0, 120, 240),
        roi: Rect::new(50, 60, 20, 120),
    };
    MonitorConfig {
        cameras: vec![camera("mock-1"), camera("mock-2")],
        cycle_delay_ms: 200,
        ..MonitorConfig::default()
    }
}

fn load_config(path: Option<&Path>, mock: bool) -> Result<MonitorConfig> {
    match path {
        Some(p) => MonitorConfig::load(p),
        None if mock => Ok(mock_config()),
        None => anyhow::bail!("--config is required"),
    }
}

fn frame_source(args: &CameraArgs, config: &MonitorConfig) -> Result<Box<dyn FrameSource>> {
    if let Some(dir) = &args.frames_dir {
        info!("Reading frames from {}", dir.display());
        return Ok(Box::new(plant_vision::DirectorySource::new(dir.clone())));
    }
    if args.opencv {
        #[cfg(feature = "opencv")]
        {
            let devices = config
                .cameras
                .iter()
                .map(|c| (c.id.clone(), c.id.clone()))
                .collect();
            return Ok(Box::new(plant_vision::OpenCvSource::new(devices)));
        }
        #[cfg(not(feature = "opencv"))]
        {
            anyhow::bail!(
                "OpenCV backend not enabled at compile time; rebuild with --features opencv"
            );
        }
    }
    if args.synthetic {
        let scene = plant_vision::SyntheticScene::upright_post();
        let cams = config
            .cameras
            .iter()
            .fold(plant_vision::MockCamera::new(), |cams, c| {
                cams.with_scene(&c.id, scene)
            });
        return Ok(Box::new(cams));
    }
    anyhow::bail!("no camera backend selected: use --frames-dir, --opencv or --synthetic")
}

/// A controller that walks through `sessions` sessions, then raises exit.
fn mock_controller(config: &MonitorConfig, sessions: u32) -> plc_link::MockStore {
    let map = config.plc.resolve();
    let wrap = config.session.max_session + 1;
    let mut store = plc_link::MockStore::new();
    store.insert(map.path(PlcVariable::Run), Value::Bool(true));
    store.insert(map.path(PlcVariable::Exit), Value::Bool(true));
    store.script_reads(
        map.path(PlcVariable::Exit),
        (0..sessions).map(|_| Some(Value::Bool(false))),
    );
    let sequence: Vec<i64> = (0..=i64::from(sessions)).map(|i| i % wrap).collect();
    store.insert(
        map.path(PlcVariable::Session),
        Value::Int(sequence.last().copied().unwrap_or(0)),
    );
    store.script_reads(
        map.path(PlcVariable::Session),
        sequence.into_iter().map(|s| Some(Value::Int(s))),
    );
    store
}

fn run(
    config_path: Option<&Path>,
    mock: Option<u32>,
    store_file: Option<&Path>,
    camera_args: &CameraArgs,
) -> Result<()> {
    let config = load_config(config_path, mock.is_some())?;
    config.validate()?;

    let store: Box<dyn VariableStore> = match (mock, store_file) {
        (Some(n), _) => Box::new(mock_controller(&config, n)),
        (None, Some(path)) => Box::new(
            JsonFileStore::open(path)
                .with_context(|| format!("opening store file {}", path.display()))?,
        ),
        (None, None) => anyhow::bail!("no controller backend: use --store-file or --mock"),
    };

    let mut frames = if mock.is_some() && camera_args.frames_dir.is_none() && !camera_args.opencv
    {
        frame_source(
            &CameraArgs {
                frames_dir: None,
                opencv: false,
                synthetic: true,
            },
            &config,
        )?
    } else {
        frame_source(camera_args, &config)?
    };

    let probe = check_cameras(&mut frames, &config.cameras, config.acquisition_timeout());
    let failed = probe.iter().filter(|c| !c.ok()).count();
    if failed > 0 {
        warn!("{} of {} cameras failed the startup check", failed, probe.len());
    }

    let metrics = MetricsHub::new().map_err(|e| anyhow::anyhow!(e))?;
    let archive = config.archive.clone();
    let mut control = ControlLoop::start(config, frames, store, SystemClock)
        .context("starting control loop")?
        .with_metrics(metrics.clone());
    if archive.enabled {
        info!("Archiving images to {}", archive.local_dir.display());
        control = control.with_observer(Archiver::new(archive));
    }

    let summary = control.run();
    println!(
        "cycles={} vertical={} non_vertical={} last_session={}",
        summary.cycles, summary.vertical, summary.non_vertical, summary.last_processed_session
    );
    print!("{}", metrics.encode_text());
    Ok(())
}

fn camera_check(config_path: Option<&Path>, camera_args: &CameraArgs) -> Result<()> {
    let config = load_config(config_path, camera_args.synthetic)?;
    let mut frames = frame_source(camera_args, &config)?;
    let report = check_cameras(&mut frames, &config.cameras, config.acquisition_timeout());
    for check in &report {
        match (&check.resolution, &check.error) {
            (Some((w, h)), _) => println!("{}\tok\t{}x{}", check.camera_id, w, h),
            (None, Some(e)) => println!("{}\tFAILED\t{}", check.camera_id, e),
            (None, None) => println!("{}\tFAILED", check.camera_id),
        }
    }
    let failed = report.iter().filter(|c| !c.ok()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} cameras failed", report.len());
    }
    Ok(())
}

fn analyze(
    image: &Path,
    crop: &Rect,
    roi: &Rect,
    params: &SilhouetteParams,
    out: Option<&Path>,
) -> Result<()> {
    let frame = plant_vision::io::read_gray(image, "analyze")
        .with_context(|| format!("reading {}", image.display()))?;
    let detection = plant_vision::detect(&frame, crop, roi, params)
        .with_context(|| format!("processing {}", image.display()))?;
    println!(
        "image={} size={}x{} crop={} roi={}",
        image.display(),
        frame.width,
        frame.height,
        crop,
        roi
    );
    println!(
        "foreground={} centroid={} verdict={}",
        detection.mask.foreground_count(),
        detection.centroid,
        if detection.in_roi {
            "vertical"
        } else {
            "not vertical"
        }
    );
    if let Some(path) = out {
        plant_vision::io::write_annotated_png(path, &detection.mask, &detection.centroid, roi)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
