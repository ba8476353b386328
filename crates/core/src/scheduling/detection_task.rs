use crate::detection::domain::face::DetectionResult;
use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::frame::Frame;

/// Lifecycle of a detection task. Terminal states are reached exactly
/// once; a task is discarded afterwards, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

/// Terminal outcome of one detection task.
///
/// `Cancelled` is produced by the scheduler when a run finishes after
/// shutdown: the work completed but its result is discarded undelivered.
#[derive(Debug)]
pub enum TaskOutcome {
    Completed(DetectionResult),
    Failed(DetectionError),
    Cancelled,
}

impl TaskOutcome {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Completed(_) => TaskStatus::Completed,
            TaskOutcome::Failed(_) => TaskStatus::Failed,
            TaskOutcome::Cancelled => TaskStatus::Cancelled,
        }
    }
}

/// One analysis pass over one frame.
///
/// `run` consumes the task, so it reaches a terminal state exactly
/// once and can never be re-dispatched. The frame is held by shared
/// reference (`Frame` clones share pixel data) and stays valid for the
/// duration of the pass.
pub struct DetectionTask {
    frame: Frame,
    status: TaskStatus,
}

impl DetectionTask {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            status: TaskStatus::Pending,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Runs one detection pass against `detector`.
    ///
    /// Detector errors become `Failed`; they are not retried. If a
    /// consumer wants another attempt it submits a later frame through
    /// the normal camera flow.
    pub fn run(mut self, detector: &mut dyn FaceDetector) -> TaskOutcome {
        self.status = TaskStatus::Running;
        let timestamp_ms = self.frame.timestamp_ms();
        match detector.detect(&self.frame) {
            Ok(faces) => TaskOutcome::Completed(DetectionResult {
                faces,
                timestamp_ms,
            }),
            Err(error) => TaskOutcome::Failed(error),
        }
    }
}
