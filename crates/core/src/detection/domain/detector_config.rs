use crate::shared::constants::DEFAULT_MIN_FACE_SIZE;

/// Detector effort level: `Fast` favors frame rate, `Accurate` scans
/// more densely at the cost of per-pass latency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DetectionMode {
    #[default]
    Fast,
    Accurate,
}

/// Whether the backend should compute facial landmark positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LandmarkMode {
    #[default]
    None,
    All,
}

/// Whether the backend should compute expression classifications
/// (smiling, eyes open).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClassificationMode {
    #[default]
    None,
    All,
}

/// Backend-independent detector settings. Backends ignore the parts
/// they cannot honor and leave the corresponding `Face` fields unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectorConfig {
    pub mode: DetectionMode,
    pub landmarks: LandmarkMode,
    pub classifications: ClassificationMode,
    /// Smallest face to report, in pixels along the shorter side.
    pub min_face_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            mode: DetectionMode::Fast,
            landmarks: LandmarkMode::None,
            classifications: ClassificationMode::None,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}
