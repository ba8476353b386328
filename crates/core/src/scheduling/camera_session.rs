use std::sync::atomic::{AtomicBool, Ordering};

use crate::detection::domain::face_detector::FaceDetector;
use crate::scheduling::detection_delegate::FaceDetectionDelegate;
use crate::scheduling::detection_scheduler::{DetectionScheduler, SchedulerState};
use crate::shared::frame::Frame;

/// Thin adapter between a host camera view and the detection core.
///
/// Owns the scheduler, mirrors the host's "face detector enabled"
/// switch, and maps view teardown to scheduler shutdown. This is the
/// entire surface a bridge layer needs; no host-framework types appear
/// below it.
pub struct CameraSession {
    scheduler: DetectionScheduler,
    enabled: AtomicBool,
}

impl CameraSession {
    pub fn new(detector: Box<dyn FaceDetector>, delegate: Box<dyn FaceDetectionDelegate>) -> Self {
        Self {
            scheduler: DetectionScheduler::new(detector, delegate),
            enabled: AtomicBool::new(true),
        }
    }

    /// Toggles face detection without tearing the session down. While
    /// disabled, preview frames are ignored; a task already in flight
    /// still delivers normally.
    pub fn set_face_detection_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn face_detection_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Called once per preview frame by the camera layer, on the
    /// producer thread. Never blocks. Returns whether the frame was
    /// handed to the scheduler.
    pub fn on_preview_frame(&self, frame: Frame) -> bool {
        if !self.face_detection_enabled() {
            return false;
        }
        self.scheduler.submit_frame(frame)
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// The host view is going away. After this returns no delegate
    /// notification will ever be delivered again.
    pub fn tear_down(&self) {
        self.scheduler.shutdown();
    }
}
