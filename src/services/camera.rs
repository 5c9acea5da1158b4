//! Frame acquisition: the `FrameSource` seam and the built-in synthetic
//! source used when no real camera integration is wired in.

use std::time::Duration;

use rand::Rng;

/// One captured frame, RGB8 row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// `pixels` must hold exactly `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Grayscale copy (BT.601 weights), one byte per pixel. Landmark
    /// detectors typically consume this instead of the color planes.
    pub fn luma8(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(3)
            .map(|rgb| {
                let weighted =
                    299 * u32::from(rgb[0]) + 587 * u32::from(rgb[1]) + 114 * u32::from(rgb[2]);
                (weighted / 1000) as u8
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("frame grab failed: {0}")]
    Grab(String),
}

/// Blocking producer of video frames.
///
/// Implementations own their device handle and are driven from a dedicated
/// blocking thread. `next_frame` paces itself; returning `Ok(None)` is the
/// source's own quit signal (end of stream, user closed the preview) and
/// stops the frame loop without touching the rest of the pipeline.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<(), CameraError>;

    fn next_frame(&mut self) -> Result<Option<Frame>, CameraError>;
}

const SYNTHETIC_WIDTH: u32 = 64;
const SYNTHETIC_HEIGHT: u32 = 48;

/// Camera stand-in producing paced noise frames.
///
/// Pixel content is irrelevant to the pipeline (landmarks come from the
/// detector, not the image), so flat gray plus a little noise is enough to
/// keep every downstream stage honest about sizes and timing.
#[derive(Debug)]
pub struct SyntheticFrameSource {
    frame_interval: Duration,
    remaining: Option<u64>,
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticFrameSource {
    /// Unbounded source at roughly 30 fps.
    pub fn new() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            remaining: None,
        }
    }

    /// Source that ends after `limit` frames, then signals local quit.
    pub fn with_frame_limit(limit: u64) -> Self {
        Self {
            remaining: Some(limit),
            ..Self::new()
        }
    }

    pub fn interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }
}

impl FrameSource for SyntheticFrameSource {
    fn open(&mut self) -> Result<(), CameraError> {
        tracing::info!(
            width = SYNTHETIC_WIDTH,
            height = SYNTHETIC_HEIGHT,
            "Synthetic frame source ready"
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }

        std::thread::sleep(self.frame_interval);

        let mut rng = rand::thread_rng();
        let pixels = (0..(SYNTHETIC_WIDTH * SYNTHETIC_HEIGHT * 3))
            .map(|_| 120u8.saturating_add(rng.gen_range(0..16)))
            .collect();
        Ok(Some(Frame::new(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT, pixels)))
    }
}
