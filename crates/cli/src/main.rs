use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use liveface_core::detection::domain::detector_config::{DetectionMode, DetectorConfig};
use liveface_core::detection::domain::face::DetectionResult;
use liveface_core::detection::domain::face_detector::DetectionError;
use liveface_core::detection::infrastructure::model_resolver;
use liveface_core::detection::infrastructure::rustface_detector::RustfaceDetector;
use liveface_core::scheduling::camera_session::CameraSession;
use liveface_core::scheduling::detection_delegate::FaceDetectionDelegate;
use liveface_core::shared::constants::{SEETAFACE_MODEL_NAME, SEETAFACE_MODEL_URL};
use liveface_core::shared::frame::{Frame, Orientation, PixelFormat};

/// Live face detection demo: replays an image as a camera feed and
/// prints detection events as the scheduler delivers them.
#[derive(Parser)]
#[command(name = "liveface")]
struct Cli {
    /// Input image to replay as camera frames.
    input: PathBuf,

    /// Simulated camera frame rate.
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Number of frames to pump before stopping.
    #[arg(long, default_value = "90")]
    frames: u32,

    /// Detection mode: fast or accurate.
    #[arg(long, default_value = "fast")]
    mode: String,

    /// Smallest face to report, in pixels.
    #[arg(long, default_value = "40")]
    min_face_size: u32,

    /// Path to a SeetaFace model file (downloaded to cache when omitted).
    #[arg(long)]
    model: Option<PathBuf>,
}

/// Logs every delivered outcome and keeps counts for the exit summary.
struct PrintDelegate {
    results: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
}

impl FaceDetectionDelegate for PrintDelegate {
    fn on_faces_detected(&mut self, result: &DetectionResult) {
        self.results.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "frame {}ms: {} face(s)",
            result.timestamp_ms,
            result.faces.len()
        );
        for face in &result.faces {
            log::info!(
                "  bounds ({:.0},{:.0}) {:.0}x{:.0}  confidence {:.2}",
                face.bounds.x,
                face.bounds.y,
                face.bounds.width,
                face.bounds.height,
                face.confidence
            );
        }
    }

    fn on_detection_error(&mut self, error: &DetectionError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        log::warn!("detection failed: {error}");
    }

    fn on_detection_task_completed(&mut self) {}
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mode = parse_mode(&cli.mode)?;

    let model_path = model_resolver::resolve(
        SEETAFACE_MODEL_NAME,
        SEETAFACE_MODEL_URL,
        cli.model.as_deref(),
    )?;
    let config = DetectorConfig {
        mode,
        min_face_size: cli.min_face_size,
        ..Default::default()
    };
    let detector = RustfaceDetector::from_file(&model_path, config)?;
    let template = load_frame(&cli.input)?;
    log::info!(
        "replaying {} as a {}x{} feed at {} fps",
        cli.input.display(),
        template.width(),
        template.height(),
        cli.fps
    );

    let results = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    let delegate = PrintDelegate {
        results: Arc::clone(&results),
        errors: Arc::clone(&errors),
    };

    let session = CameraSession::new(Box::new(detector), Box::new(delegate));
    let interval = Duration::from_secs_f64(1.0 / cli.fps.max(1) as f64);
    let start = Instant::now();
    let mut admitted = 0u32;
    let mut dropped = 0u32;

    for _ in 0..cli.frames {
        let frame = template.with_timestamp(start.elapsed().as_millis() as u64);
        if session.on_preview_frame(frame) {
            admitted += 1;
        } else {
            dropped += 1;
        }
        thread::sleep(interval);
    }

    // Let a final in-flight pass deliver before teardown discards it.
    thread::sleep(Duration::from_millis(500));
    session.tear_down();

    log::info!(
        "pumped {} frames: {admitted} admitted, {dropped} dropped under load",
        cli.frames
    );
    log::info!(
        "{} result(s) and {} error(s) delivered",
        results.load(Ordering::Relaxed),
        errors.load(Ordering::Relaxed)
    );
    Ok(())
}

fn parse_mode(value: &str) -> Result<DetectionMode, String> {
    match value {
        "fast" => Ok(DetectionMode::Fast),
        "accurate" => Ok(DetectionMode::Accurate),
        other => Err(format!("--mode must be 'fast' or 'accurate', got '{other}'")),
    }
}

fn load_frame(path: &PathBuf) -> Result<Frame, Box<dyn std::error::Error>> {
    let rgb = image::open(path)?.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(
        rgb.into_raw(),
        width,
        height,
        PixelFormat::Rgb8,
        Orientation::Deg0,
        0,
    ))
}
