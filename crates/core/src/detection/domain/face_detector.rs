use thiserror::Error;

use crate::detection::domain::face::Face;
use crate::shared::frame::{Frame, PixelFormat};

/// Why a detection pass could not produce a result.
///
/// Backend faults are caught at this boundary and never propagate as
/// panics out of the worker thread; a frame gets exactly one attempt.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("unsupported pixel format: {0:?}")]
    UnsupportedFormat(PixelFormat),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("detector failure: {0}")]
    Detector(String),
}

/// Domain interface for face detection.
///
/// Implementations may be stateful (e.g., tracking across frames),
/// hence `&mut self`. The call is synchronous and may block for the
/// duration of the analysis; the scheduler confines it to a dedicated
/// worker thread.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Face>, DetectionError>;
}
