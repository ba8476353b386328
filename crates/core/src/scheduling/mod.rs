pub mod camera_session;
pub mod detection_delegate;
pub mod detection_scheduler;
pub mod detection_task;
