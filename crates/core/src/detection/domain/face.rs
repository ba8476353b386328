/// A point in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned bounding box of a detected face, in frame pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBounds {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn intersects(&self, other: &FaceBounds) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Facial landmark positions. Every field is optional: which ones are
/// populated depends on the detector backend and its configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    pub left_eye: Option<Point>,
    pub right_eye: Option<Point>,
    pub left_ear: Option<Point>,
    pub right_ear: Option<Point>,
    pub left_cheek: Option<Point>,
    pub right_cheek: Option<Point>,
    pub nose_base: Option<Point>,
    pub mouth: Option<Point>,
    pub left_mouth: Option<Point>,
    pub right_mouth: Option<Point>,
    pub bottom_mouth: Option<Point>,
}

/// One detected face: bounding geometry plus whatever optional
/// landmark, classification, and pose data the backend produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub bounds: FaceBounds,
    pub confidence: f64,
    pub landmarks: Option<FaceLandmarks>,
    pub smiling_probability: Option<f64>,
    pub left_eye_open_probability: Option<f64>,
    pub right_eye_open_probability: Option<f64>,
    /// Head rotation around the vertical axis, degrees.
    pub yaw_angle: Option<f64>,
    /// Head rotation around the camera axis, degrees.
    pub roll_angle: Option<f64>,
    /// Backend-assigned identity, stable across frames when the backend
    /// tracks faces.
    pub face_id: Option<u32>,
}

impl Face {
    /// A face with bounds and confidence only, all optional data unset.
    pub fn from_bounds(bounds: FaceBounds, confidence: f64) -> Self {
        Self {
            bounds,
            confidence,
            landmarks: None,
            smiling_probability: None,
            left_eye_open_probability: None,
            right_eye_open_probability: None,
            yaw_angle: None,
            roll_angle: None,
            face_id: None,
        }
    }
}

/// Outcome of one successful detection pass: the faces found, ordered
/// as the backend reported them, plus the source frame's timestamp so
/// consumers can correlate results with frames.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    pub faces: Vec<Face>,
    pub timestamp_ms: u64,
}
