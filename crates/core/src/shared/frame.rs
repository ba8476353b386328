use std::sync::Arc;

/// Pixel layout of a camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single-channel grayscale, one byte per pixel.
    Luma8,
    /// Interleaved RGB, three bytes per pixel.
    Rgb8,
    /// Interleaved RGBA, four bytes per pixel.
    Rgba8,
    /// Android camera preview format: a full-resolution Y plane followed
    /// by interleaved half-resolution VU samples.
    Nv21,
}

impl PixelFormat {
    /// Expected buffer length for a `width` x `height` frame.
    pub fn buffer_len(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::Luma8 => pixels,
            PixelFormat::Rgb8 => pixels * 3,
            PixelFormat::Rgba8 => pixels * 4,
            PixelFormat::Nv21 => pixels + pixels / 2,
        }
    }
}

/// Clockwise rotation of the sensor image relative to the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// An immutable snapshot of one camera frame.
///
/// Pixel data lives behind an `Arc`, so cloning a frame shares bytes
/// instead of copying them: the producer keeps its copy while an
/// in-flight detection task holds another, and the data stays valid
/// until the last holder drops it. Nothing in this crate mutates a
/// frame after construction.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    orientation: Orientation,
    timestamp_ms: u64,
}

impl Frame {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        orientation: Orientation,
        timestamp_ms: u64,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            pixel_format.buffer_len(width, height),
            "data length must match pixel format dimensions"
        );
        Self {
            data: data.into(),
            width,
            height,
            pixel_format,
            orientation,
            timestamp_ms,
        }
    }

    /// A new frame sharing this frame's pixel data with a different
    /// timestamp. Used by sources that replay a buffer as a feed.
    pub fn with_timestamp(&self, timestamp_ms: u64) -> Self {
        Self {
            data: Arc::clone(&self.data),
            timestamp_ms,
            ..*self
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Row-major grayscale projection of the frame.
    ///
    /// RGB and RGBA use BT.601 luma weights; NV21 takes the Y plane
    /// directly, which is what makes it the cheapest format to analyze.
    pub fn to_luma(&self) -> Vec<u8> {
        let pixels = self.width as usize * self.height as usize;
        match self.pixel_format {
            PixelFormat::Luma8 => self.data.to_vec(),
            PixelFormat::Nv21 => self.data[..pixels].to_vec(),
            PixelFormat::Rgb8 => self
                .data
                .chunks_exact(3)
                .map(|px| luma_601(px[0], px[1], px[2]))
                .collect(),
            PixelFormat::Rgba8 => self
                .data
                .chunks_exact(4)
                .map(|px| luma_601(px[0], px[1], px[2]))
                .collect(),
        }
    }
}

fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}
