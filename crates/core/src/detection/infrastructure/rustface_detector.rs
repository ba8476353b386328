use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::detector_config::{DetectionMode, DetectorConfig};
use crate::detection::domain::face::{Face, FaceBounds};
use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::frame::Frame;

const SCORE_THRESHOLD: f64 = 2.0;

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// Holds the parsed model and builds a detector object per pass:
/// rustface's detector carries internal scan state and is not `Send`,
/// while the model is plain data that clones cheaply. SeetaFace
/// reports bounds and a score only, so landmark and classification
/// fields of [`Face`] stay unset regardless of configuration.
pub struct RustfaceDetector {
    model: rustface::Model,
    config: DetectorConfig,
}

impl RustfaceDetector {
    pub fn from_file(path: &Path, config: DetectorConfig) -> Result<Self, DetectionError> {
        let file = File::open(path).map_err(|e| {
            DetectionError::Detector(format!("cannot open model {}: {e}", path.display()))
        })?;
        let model = rustface::read_model(BufReader::new(file)).map_err(|e| {
            DetectionError::Detector(format!("cannot parse model {}: {e}", path.display()))
        })?;
        Ok(Self { model, config })
    }
}

/// Pyramid scale factor and sliding-window step for a detection mode.
/// A scale closer to 1.0 and a smaller step scan more densely.
fn scan_tuning(mode: DetectionMode) -> (f32, u32) {
    match mode {
        DetectionMode::Fast => (0.8, 4),
        DetectionMode::Accurate => (0.9, 2),
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, DetectionError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(DetectionError::MalformedFrame(format!(
                "empty frame: {}x{}",
                frame.width(),
                frame.height()
            )));
        }

        let gray = frame.to_luma();
        let (scale, step) = scan_tuning(self.config.mode);

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(SCORE_THRESHOLD);
        detector.set_pyramid_scale_factor(scale);
        detector.set_slide_window_step(step, step);

        let image = rustface::ImageData::new(&gray, frame.width(), frame.height());
        let found = detector.detect(&image);

        Ok(found
            .iter()
            .map(|info| {
                let bbox = info.bbox();
                Face::from_bounds(
                    FaceBounds {
                        x: bbox.x() as f64,
                        y: bbox.y() as f64,
                        width: bbox.width() as f64,
                        height: bbox.height() as f64,
                    },
                    info.score(),
                )
            })
            .collect())
    }
}
