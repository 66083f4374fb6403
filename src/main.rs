//! Rodent Tracker CLI
//!
//! Tracks the largest moving object in a raw video stream, a live camera,
//! or the built-in synthetic arena, and optionally writes the trajectory
//! as CSV.

use clap::Parser;
use rodent_tracker::{
    analysis::{TrackingMonitor, Trajectory},
    background::BackgroundAlgorithm,
    capture::{Camera, CameraError, FileConfig, MockCamera, RawSource, RawVideoCamera},
    extraction::Extractor,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Consecutive transient capture failures tolerated before giving up.
const MAX_CAPTURE_FAILURES: u32 = 30;

#[derive(Debug, Parser)]
#[command(name = "rodent-tracker", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw 8-bit video file, or `-` for stdin (default: synthetic arena)
    #[arg(long)]
    input: Option<String>,

    /// Use the live camera instead of the synthetic arena
    #[cfg(feature = "camera")]
    #[arg(long, conflicts_with = "input")]
    camera: bool,

    /// Frame width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Channels per pixel (1 or 3)
    #[arg(long)]
    channels: Option<u8>,

    /// Frames to process; 0 runs until end of stream or Ctrl-C
    #[arg(long)]
    frames: Option<u64>,

    /// Background model: mog2 or knn
    #[arg(long)]
    algorithm: Option<BackgroundAlgorithm>,

    /// Median filter kernel size (odd)
    #[arg(long)]
    kernel_size: Option<u32>,

    /// Minimum blob area in pixels (exclusive)
    #[arg(long)]
    area_threshold: Option<u32>,

    /// Write the trajectory to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Serve Prometheus metrics on this port (0 disables)
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl Args {
    /// Loads the file configuration and applies command-line overrides.
    fn resolve(&self) -> Result<FileConfig, rodent_tracker::capture::ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        if let Some(width) = self.width {
            config.capture.width = width;
        }
        if let Some(height) = self.height {
            config.capture.height = height;
        }
        if let Some(channels) = self.channels {
            config.capture.channels = channels;
        }
        if let Some(frames) = self.frames {
            config.output.frame_count = frames;
        }
        if let Some(algorithm) = self.algorithm {
            config.tracker.background.algorithm = algorithm;
        }
        if let Some(kernel_size) = self.kernel_size {
            config.tracker.filter_kernel_size = kernel_size;
        }
        if let Some(area_threshold) = self.area_threshold {
            config.tracker.blob_area_threshold = area_threshold;
        }
        if let Some(csv) = &self.csv {
            config.output.csv_path = Some(csv.clone());
        }
        #[cfg(feature = "metrics")]
        if let Some(port) = self.metrics_port {
            config.output.metrics_port = port;
        }

        config.capture.validate()?;
        config.tracker.validate()?;
        Ok(config)
    }

    fn camera(&self) -> Box<dyn Camera> {
        if let Some(input) = &self.input {
            return Box::new(RawVideoCamera::new(RawSource::parse(input)));
        }
        #[cfg(feature = "camera")]
        if self.camera {
            return Box::new(rodent_tracker::capture::NokhwaCamera::new());
        }
        Box::new(MockCamera::new())
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Rodent Tracker v{}", rodent_tracker::VERSION);

    let config = match args.resolve() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut camera = args.camera();
    if let Err(e) = camera.open(&config.capture) {
        eprintln!("Failed to open frame source: {}", e);
        std::process::exit(1);
    }

    let mut extractor = match Extractor::new(config.tracker.clone()) {
        Ok(x) => x,
        Err(e) => {
            eprintln!("Failed to create extractor: {}", e);
            std::process::exit(1);
        }
    };
    let mut monitor = TrackingMonitor::new(&config.monitor);
    let mut trajectory = Trajectory::new();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    #[cfg(feature = "metrics")]
    let (_runtime, metrics_state) = match start_metrics(config.output.metrics_port) {
        Ok(started) => started,
        Err(e) => {
            eprintln!("Failed to start metrics server: {}", e);
            std::process::exit(1);
        }
    };

    let frame_limit = config.output.frame_count;
    if frame_limit == 0 {
        info!("Processing frames until end of stream (Ctrl-C to stop)...");
    } else {
        info!("Processing {} frames...", frame_limit);
    }

    let mut exit_code = 0;
    let mut capture_failures = 0;
    while running.load(Ordering::SeqCst)
        && (frame_limit == 0 || extractor.frames_processed() < frame_limit)
    {
        let frame = match camera.capture() {
            Ok(f) => {
                capture_failures = 0;
                f
            }
            Err(CameraError::EndOfStream) => {
                info!("End of stream");
                break;
            }
            Err(e) if e.is_transient() && capture_failures < MAX_CAPTURE_FAILURES => {
                capture_failures += 1;
                warn!("Frame capture failed: {}", e);
                continue;
            }
            Err(e) => {
                eprintln!("Frame source failed: {}", e);
                exit_code = 1;
                break;
            }
        };

        let report = match extractor.get_position(&frame) {
            Ok(r) => r,
            Err(e) => {
                warn!("Frame {} skipped: {}", frame.sequence(), e);
                continue;
            }
        };

        monitor.observe(&report);
        trajectory.record(&frame, &report);

        #[cfg(feature = "metrics")]
        if let Some(state) = &metrics_state {
            let snapshot = rodent_tracker::metrics::MetricsSnapshot::from_components(
                monitor.metrics(),
                &report,
            );
            state.blocking_write().update(&snapshot);
        }
    }

    camera.close();

    let m = monitor.metrics();
    info!(
        "Processed {} frames: {} detections, {} fallbacks, longest miss streak {}",
        m.total_frames, m.detections, m.fallbacks, m.longest_miss_streak
    );
    let rect = extractor.bounding_box();
    println!(
        "frames={} detection_ratio={:.3} path_length_px={:.1} final_box={},{},{},{} state={}",
        m.total_frames,
        m.detection_ratio(),
        trajectory.path_length(),
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        monitor.state()
    );

    if let Some(path) = &config.output.csv_path {
        if let Err(e) = trajectory.save_csv(path) {
            eprintln!("Failed to write {}: {}", path.display(), e);
            exit_code = 1;
        }
    }

    std::process::exit(exit_code);
}

/// Starts the exporter on a background runtime when `port` is non-zero.
#[cfg(feature = "metrics")]
fn start_metrics(
    port: u16,
) -> Result<
    (
        Option<tokio::runtime::Runtime>,
        Option<rodent_tracker::metrics::SharedMetricsState>,
    ),
    Box<dyn std::error::Error>,
> {
    use rodent_tracker::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    if port == 0 {
        return Ok((None, None));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), MetricsRegistry::new()?);
    let state = server.state();

    runtime.spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!("Metrics server stopped: {}", e);
        }
    });

    Ok((Some(runtime), Some(state)))
}
