use crate::detection::domain::face::DetectionResult;
use crate::detection::domain::face_detector::DetectionError;

/// Consumer-facing callback contract for detection outcomes.
///
/// For every delivered task the scheduler calls at most one of
/// `on_faces_detected` / `on_detection_error`, then always
/// `on_detection_task_completed`, in that order. The calls arrive on
/// the detection worker thread, serialized across tasks in submission
/// order. A task cancelled by shutdown produces no calls at all, so a
/// consumer must not assume every camera frame yields a notification.
pub trait FaceDetectionDelegate: Send {
    /// A detection pass succeeded. Called before the completion
    /// notification, never after it.
    fn on_faces_detected(&mut self, result: &DetectionResult);

    /// A detection pass failed. Mutually exclusive with
    /// `on_faces_detected` for the same task.
    fn on_detection_error(&mut self, error: &DetectionError);

    /// Always the final notification for a task. Once this returns the
    /// consumer may expect a new task to start.
    fn on_detection_task_completed(&mut self);
}
