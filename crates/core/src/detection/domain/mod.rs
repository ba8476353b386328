pub mod detector_config;
pub mod face;
pub mod face_detector;
