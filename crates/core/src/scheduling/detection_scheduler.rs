use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::face_detector::FaceDetector;
use crate::scheduling::detection_delegate::FaceDetectionDelegate;
use crate::scheduling::detection_task::{DetectionTask, TaskOutcome};
use crate::shared::frame::Frame;

/// Whether a detection task is currently in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Busy,
}

/// Gates frame admission so detection work never overlaps with itself.
///
/// At most one task is in flight at any time; a frame arriving while
/// busy is dropped, not queued. Dropping bounds memory and latency and
/// keeps results close to real time: the analysis is the slowest stage
/// of the pipeline, so a queue would only accumulate staleness.
///
/// Admitted tasks run on a dedicated worker thread that also delivers
/// delegate notifications, so notifications are globally ordered by
/// submission order.
pub struct DetectionScheduler {
    shared: Arc<Shared>,
    task_tx: Option<Sender<DetectionTask>>,
    worker: Option<thread::JoinHandle<()>>,
}

struct Shared {
    /// Set by the idle→busy admission CAS, cleared by the worker before
    /// it delivers the outcome. The single atomic transition is what
    /// prevents two tasks slipping in between a separate check and set.
    busy: AtomicBool,
    /// Fast-path admission check; the authoritative shutdown flag lives
    /// in `delivery`.
    accepting: AtomicBool,
    delivery: Mutex<DeliveryGate>,
}

struct DeliveryGate {
    active: bool,
}

impl DetectionScheduler {
    /// Spawns the worker thread owning `detector` and `delegate`.
    pub fn new(
        detector: Box<dyn FaceDetector>,
        delegate: Box<dyn FaceDetectionDelegate>,
    ) -> Self {
        // Capacity 1 is an upper bound, not a queue: admission is gated
        // by `busy`, so the channel never holds more than one task.
        let (task_tx, task_rx) = crossbeam_channel::bounded::<DetectionTask>(1);
        let shared = Arc::new(Shared {
            busy: AtomicBool::new(false),
            accepting: AtomicBool::new(true),
            delivery: Mutex::new(DeliveryGate { active: true }),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || worker_loop(task_rx, detector, delegate, worker_shared));

        Self {
            shared,
            task_tx: Some(task_tx),
            worker: Some(worker),
        }
    }

    /// Offers a frame for analysis. Called once per camera frame, on
    /// the producer thread; never blocks regardless of worker state.
    ///
    /// Returns whether the frame was admitted. A `false` return is the
    /// normal drop-under-load path (or a shut-down scheduler), not an
    /// error, and produces no delegate notification.
    pub fn submit_frame(&self, frame: Frame) -> bool {
        if !self.shared.accepting.load(Ordering::Acquire) {
            return false;
        }
        if self
            .shared
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::trace!(
                "frame at {}ms dropped: detection in flight",
                frame.timestamp_ms()
            );
            return false;
        }

        let task = DetectionTask::new(frame);
        let sent = self
            .task_tx
            .as_ref()
            .is_some_and(|tx| tx.send(task).is_ok());
        if !sent {
            // Worker gone (panicked delegate or detector); undo the
            // admission so the flag doesn't stay stuck on busy.
            self.shared.busy.store(false, Ordering::Release);
            log::warn!("detection worker unavailable, frame dropped");
        }
        sent
    }

    pub fn state(&self) -> SchedulerState {
        if self.shared.busy.load(Ordering::Acquire) {
            SchedulerState::Busy
        } else {
            SchedulerState::Idle
        }
    }

    /// Stops admissions and closes the delivery gate. Idempotent.
    ///
    /// An in-flight task is allowed to finish naturally (the detector
    /// offers no interruption point) but its outcome is discarded. Once
    /// this returns, no delegate call is in progress and none will ever
    /// start: the gate lock is held by the worker across deliveries, so
    /// taking it here waits out any delivery already underway.
    pub fn shutdown(&self) {
        self.shared.accepting.store(false, Ordering::Release);
        let mut gate = lock_gate(&self.shared.delivery);
        if gate.active {
            gate.active = false;
            log::debug!("detection scheduler shut down");
        }
    }
}

impl Drop for DetectionScheduler {
    fn drop(&mut self) {
        self.shutdown();
        // Closing the channel ends the worker loop once any in-flight
        // task has been discarded.
        drop(self.task_tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    task_rx: Receiver<DetectionTask>,
    mut detector: Box<dyn FaceDetector>,
    mut delegate: Box<dyn FaceDetectionDelegate>,
    shared: Arc<Shared>,
) {
    for task in task_rx {
        let outcome = task.run(detector.as_mut());
        // Back to idle before delivery: a frame submitted while the
        // delegate callbacks run must be admitted, not dropped.
        shared.busy.store(false, Ordering::Release);
        deliver(&shared, delegate.as_mut(), outcome);
    }
}

fn deliver(shared: &Shared, delegate: &mut dyn FaceDetectionDelegate, outcome: TaskOutcome) {
    // Held across the callbacks so shutdown() cannot return while a
    // delivery is underway.
    let gate = lock_gate(&shared.delivery);
    let outcome = if gate.active {
        outcome
    } else {
        log::debug!("detection outcome discarded after shutdown");
        TaskOutcome::Cancelled
    };

    match outcome {
        TaskOutcome::Completed(result) => {
            delegate.on_faces_detected(&result);
            delegate.on_detection_task_completed();
        }
        TaskOutcome::Failed(error) => {
            delegate.on_detection_error(&error);
            delegate.on_detection_task_completed();
        }
        TaskOutcome::Cancelled => {}
    }
}

fn lock_gate(delivery: &Mutex<DeliveryGate>) -> std::sync::MutexGuard<'_, DeliveryGate> {
    // A delegate that panicked must not wedge shutdown; the gate's
    // boolean stays coherent either way.
    delivery.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    use crate::detection::domain::face::{Face, FaceBounds};
    use crate::detection::domain::face_detector::DetectionError;
    use crate::shared::frame::{Orientation, PixelFormat};

    const WAIT: Duration = Duration::from_secs(2);

    #[derive(Clone, Debug, PartialEq)]
    enum Event {
        Faces(usize),
        Error(String),
        Completed,
    }

    /// Delegate forwarding every notification into a channel.
    struct ChannelDelegate {
        tx: Sender<Event>,
    }

    impl FaceDetectionDelegate for ChannelDelegate {
        fn on_faces_detected(&mut self, result: &crate::detection::domain::face::DetectionResult) {
            let _ = self.tx.send(Event::Faces(result.faces.len()));
        }

        fn on_detection_error(&mut self, error: &DetectionError) {
            let _ = self.tx.send(Event::Error(error.to_string()));
        }

        fn on_detection_task_completed(&mut self) {
            let _ = self.tx.send(Event::Completed);
        }
    }

    /// Detector that blocks inside `detect` until the test releases it.
    struct GatedDetector {
        release_rx: Receiver<Result<usize, String>>,
    }

    impl FaceDetector for GatedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Face>, DetectionError> {
            match self.release_rx.recv() {
                Ok(Ok(count)) => Ok(faces(count)),
                Ok(Err(reason)) => Err(DetectionError::Detector(reason)),
                Err(_) => Ok(vec![]),
            }
        }
    }

    /// Detector that records how many passes overlap in time.
    struct ConcurrencyProbe {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl FaceDetector for ConcurrencyProbe {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Face>, DetectionError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    fn faces(count: usize) -> Vec<Face> {
        vec![
            Face::from_bounds(
                FaceBounds {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 10.0,
                },
                0.9,
            );
            count
        ]
    }

    fn frame(timestamp_ms: u64) -> Frame {
        Frame::new(
            vec![0u8; 16],
            4,
            4,
            PixelFormat::Luma8,
            Orientation::Deg0,
            timestamp_ms,
        )
    }

    fn gated_scheduler() -> (
        DetectionScheduler,
        Sender<Result<usize, String>>,
        Receiver<Event>,
    ) {
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let scheduler = DetectionScheduler::new(
            Box::new(GatedDetector { release_rx }),
            Box::new(ChannelDelegate { tx: event_tx }),
        );
        (scheduler, release_tx, event_rx)
    }

    #[test]
    fn test_frames_while_busy_are_dropped() {
        let (scheduler, release_tx, event_rx) = gated_scheduler();

        assert!(scheduler.submit_frame(frame(1))); // F1 admitted
        assert!(!scheduler.submit_frame(frame(2))); // F2 dropped
        assert!(!scheduler.submit_frame(frame(3))); // F3 dropped

        release_tx.send(Ok(2)).unwrap();
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Faces(2));
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);

        // Exactly one task ran: nothing else is delivered.
        drop(scheduler);
        assert!(event_rx.recv().is_err());
    }

    #[test]
    fn test_scheduler_returns_to_idle_and_admits_again() {
        let (scheduler, release_tx, event_rx) = gated_scheduler();

        assert!(scheduler.submit_frame(frame(1)));
        assert_eq!(scheduler.state(), SchedulerState::Busy);

        release_tx.send(Ok(0)).unwrap();
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Faces(0));
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.submit_frame(frame(2)));
        release_tx.send(Ok(1)).unwrap();
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Faces(1));
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);
    }

    #[test]
    fn test_detector_failure_delivers_error_then_completion() {
        let (scheduler, release_tx, event_rx) = gated_scheduler();

        assert!(scheduler.submit_frame(frame(1)));
        release_tx.send(Err("low light".to_string())).unwrap();

        match event_rx.recv_timeout(WAIT).unwrap() {
            Event::Error(reason) => assert!(reason.contains("low light")),
            other => panic!("expected error event, got {other:?}"),
        }
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);

        // Failure leaves the scheduler idle for the next frame.
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        drop(scheduler);
        assert!(event_rx.recv().is_err());
    }

    #[test]
    fn test_no_notifications_after_shutdown() {
        let (scheduler, release_tx, event_rx) = gated_scheduler();

        assert!(scheduler.submit_frame(frame(1)));
        scheduler.shutdown();
        release_tx.send(Ok(3)).unwrap(); // task finishes after shutdown

        // Dropping joins the worker, so any delivery would have landed.
        drop(scheduler);
        assert!(event_rx.recv().is_err(), "no delegate calls expected");
    }

    #[test]
    fn test_no_admission_after_shutdown() {
        let (scheduler, _release_tx, _event_rx) = gated_scheduler();
        scheduler.shutdown();
        assert!(!scheduler.submit_frame(frame(1)));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (scheduler, _release_tx, _event_rx) = gated_scheduler();
        scheduler.shutdown();
        scheduler.shutdown();
        assert!(!scheduler.submit_frame(frame(1)));
    }

    #[test]
    fn test_submit_does_not_wait_for_running_task() {
        let (scheduler, release_tx, _event_rx) = gated_scheduler();

        assert!(scheduler.submit_frame(frame(1)));
        let start = Instant::now();
        for ts in 2..100 {
            assert!(!scheduler.submit_frame(frame(ts)));
        }
        // 98 drops while the detector is parked; admission is O(1).
        assert!(start.elapsed() < Duration::from_millis(500));

        release_tx.send(Ok(0)).unwrap();
    }

    #[test]
    fn test_at_most_one_pass_in_flight_under_concurrent_submission() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let scheduler = Arc::new(DetectionScheduler::new(
            Box::new(ConcurrencyProbe {
                current: Arc::clone(&current),
                peak: Arc::clone(&peak),
            }),
            Box::new(ChannelDelegate { tx: event_tx }),
        ));

        let mut producers = Vec::new();
        for p in 0..4 {
            let scheduler = Arc::clone(&scheduler);
            producers.push(thread::spawn(move || {
                let mut admitted = 0usize;
                for i in 0..50 {
                    if scheduler.submit_frame(frame((p * 1000 + i) as u64)) {
                        admitted += 1;
                    }
                    thread::sleep(Duration::from_millis(1));
                }
                admitted
            }));
        }

        let admitted: usize = producers.into_iter().map(|h| h.join().unwrap()).sum();
        assert!(admitted >= 1);

        // Every admitted task produces exactly one faces+completed pair;
        // collect them all before tearing the scheduler down.
        let mut events = Vec::with_capacity(admitted * 2);
        for _ in 0..admitted * 2 {
            events.push(event_rx.recv_timeout(WAIT).unwrap());
        }
        drop(scheduler);
        assert!(event_rx.recv().is_err(), "more events than admitted tasks");

        assert_eq!(peak.load(Ordering::SeqCst), 1, "detection passes overlapped");
        let completions = events.iter().filter(|e| **e == Event::Completed).count();
        assert_eq!(completions, admitted);
    }

    #[test]
    fn test_notifications_follow_submission_order() {
        let (scheduler, release_tx, event_rx) = gated_scheduler();

        for expected in [1usize, 2, 3] {
            assert!(scheduler.submit_frame(frame(expected as u64)));
            release_tx.send(Ok(expected)).unwrap();
            assert_eq!(
                event_rx.recv_timeout(WAIT).unwrap(),
                Event::Faces(expected)
            );
            assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);
        }
    }

    #[test]
    fn test_frame_admitted_during_delivery_is_not_dropped() {
        // The worker returns to idle before it runs the delegate, so a
        // frame arriving mid-delivery must be admitted.
        struct ResubmitProbe {
            tx: Sender<Event>,
            resubmit: Sender<()>,
            wait_admitted: Receiver<bool>,
            probed: bool,
        }

        impl FaceDetectionDelegate for ResubmitProbe {
            fn on_faces_detected(
                &mut self,
                result: &crate::detection::domain::face::DetectionResult,
            ) {
                let _ = self.tx.send(Event::Faces(result.faces.len()));
                if self.probed {
                    return;
                }
                self.probed = true;
                // Ask the main thread to submit while we're mid-delivery.
                if self.resubmit.send(()).is_ok() {
                    if let Ok(admitted) = self.wait_admitted.recv_timeout(WAIT) {
                        assert!(admitted, "frame during delivery was dropped");
                    }
                }
            }

            fn on_detection_error(&mut self, _error: &DetectionError) {}

            fn on_detection_task_completed(&mut self) {
                let _ = self.tx.send(Event::Completed);
            }
        }

        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let (resubmit_tx, resubmit_rx) = crossbeam_channel::unbounded();
        let (admitted_tx, admitted_rx) = crossbeam_channel::unbounded();

        let scheduler = DetectionScheduler::new(
            Box::new(GatedDetector { release_rx }),
            Box::new(ResubmitProbe {
                tx: event_tx,
                resubmit: resubmit_tx,
                wait_admitted: admitted_rx,
                probed: false,
            }),
        );

        assert!(scheduler.submit_frame(frame(1)));
        release_tx.send(Ok(1)).unwrap();

        // Delegate signals from inside on_faces_detected; submit now.
        resubmit_rx.recv_timeout(WAIT).unwrap();
        let admitted = scheduler.submit_frame(frame(2));
        admitted_tx.send(admitted).unwrap();

        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Faces(1));
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);

        release_tx.send(Ok(2)).unwrap();
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Faces(2));
        assert_eq!(event_rx.recv_timeout(WAIT).unwrap(), Event::Completed);
    }
}
