//! Eye Aspect Ratio (EAR) computation over 6-point eye landmarks.
//!
//! 标准6点公式: EAR = (|p1-p5| + |p2-p4|) / (2 * |p0-p3|)
//!
//! Point order follows the usual landmark convention: `p0` and `p3` are the
//! horizontal eye corners, `p1`/`p2` lie on the upper lid and `p5`/`p4` are
//! their lower-lid counterparts. An open eye yields roughly 0.25-0.35, a
//! closed eye drops well below 0.2.

/// 2D landmark coordinate in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Six landmarks outlining one eye, in the order described at module level.
pub type EyePoints = [Point; 6];

/// Compute the aspect ratio of a single eye.
///
/// Callers guarantee a real eye contour. A degenerate one with coincident
/// corner points divides by zero and surfaces as a non-finite ratio, which
/// every threshold comparison downstream treats as open.
pub fn ear(eye: &EyePoints) -> f64 {
    let vertical1 = eye[1].distance(&eye[5]);
    let vertical2 = eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);
    (vertical1 + vertical2) / (2.0 * horizontal)
}
