//! Numeric primitives and small geometric helpers shared by every module.
//!
//! Coordinates are plain `glam::DVec2` values in a y-up plane. The helpers
//! here are the only place that knows how to rotate, mirror or project a
//! single point; shapes call them vertex by vertex.

use std::fmt;

use glam::DVec2;

/// A position or a displacement in the construction plane.
pub type Pt = DVec2;

/// Tolerance used for geometric "is this on that" predicates.
pub const EPSILON: f64 = 1e-9;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value lies outside the accepted interval
    OutOfRange,
    /// A sequence that must be ascending is not
    Unsorted,
    /// A sequence that needs at least two entries has fewer
    Empty,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::OutOfRange => write!(f, "value is out of range"),
            NumericError::Unsorted => write!(f, "values are not in ascending order"),
            NumericError::Empty => write!(f, "at least two values are required"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
#[inline]
pub fn finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Progress through an animation, always within `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Ratio(f64);

impl Ratio {
    pub const ZERO: Ratio = Ratio(0.0);
    pub const ONE: Ratio = Ratio(1.0);

    /// Create a Ratio with validation (rejects NaN and values outside [0, 1])
    pub fn try_new(val: f64) -> Result<Ratio, NumericError> {
        let val = finite(val)?;
        if !(0.0..=1.0).contains(&val) {
            return Err(NumericError::OutOfRange);
        }
        Ok(Ratio(val))
    }

    /// Clamp any finite value into [0, 1]; NaN becomes 0.
    pub fn clamped(val: f64) -> Ratio {
        if val.is_nan() {
            Ratio(0.0)
        } else {
            Ratio(val.clamp(0.0, 1.0))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// True once the animation has reached its end state.
    #[inline]
    pub fn is_complete(self) -> bool {
        self.0 >= 1.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presentation color attached to a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    Named(String),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse `#rrggbb`, `#rgb` or fall back to a named color.
    pub fn parse(s: &str) -> Color {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let expand = |c: u8| c * 16 + c;
            let digits: Option<Vec<u8>> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect();
            match digits.as_deref() {
                Some([r1, r0, g1, g0, b1, b0]) => {
                    return Color::Rgb(r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0);
                }
                Some([r, g, b]) => return Color::Rgb(expand(*r), expand(*g), expand(*b)),
                _ => {}
            }
        }
        Color::Named(s.to_string())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::Named("black".to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(s) => write!(f, "{}", s),
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
        }
    }
}

// ============================================================================
// Point helpers
// ============================================================================

/// Interpolate from `a` to `b`. The end points are returned exactly so that
/// ratio 0 is an identity and ratio 1 reproduces `b` bit for bit.
#[inline]
pub fn mix(a: Pt, b: Pt, ratio: f64) -> Pt {
    if ratio <= 0.0 {
        a
    } else if ratio >= 1.0 {
        b
    } else {
        a + (b - a) * ratio
    }
}

/// Scalar counterpart of [`mix`].
#[inline]
pub fn mix_f64(a: f64, b: f64, ratio: f64) -> f64 {
    if ratio <= 0.0 {
        a
    } else if ratio >= 1.0 {
        b
    } else {
        a + (b - a) * ratio
    }
}

/// Rotate `p` counter-clockwise by `degrees` around `about`.
pub fn rotate_about(p: Pt, degrees: f64, about: Pt) -> Pt {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let d = p - about;
    about + DVec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Foot of the perpendicular from `p` onto the carrier of `a -> b`.
/// `None` when `a` and `b` coincide.
pub fn foot(p: Pt, a: Pt, b: Pt) -> Option<Pt> {
    let dir = b - a;
    let len2 = dir.length_squared();
    if len2 <= EPSILON * EPSILON {
        return None;
    }
    let t = (p - a).dot(dir) / len2;
    Some(a + dir * t)
}

/// Mirror image of `p` across the carrier of `a -> b`.
pub fn mirror(p: Pt, a: Pt, b: Pt) -> Option<Pt> {
    foot(p, a, b).map(|f| f * 2.0 - p)
}

/// Direction of `a -> b` in degrees, measured counter-clockwise from +x.
pub fn heading(a: Pt, b: Pt) -> f64 {
    let d = b - a;
    d.y.atan2(d.x).to_degrees()
}

/// Point on the unit circle scaled by `radius` at `degrees` around `center`.
pub fn polar(center: Pt, radius: f64, degrees: f64) -> Pt {
    let (sin, cos) = degrees.to_radians().sin_cos();
    center + DVec2::new(cos, sin) * radius
}

/// True when `p` lies on the closed segment `a -> b` within `eps`.
pub fn on_segment(p: Pt, a: Pt, b: Pt, eps: f64) -> bool {
    let ab = b - a;
    let len = ab.length();
    if len <= eps {
        return p.distance(a) <= eps;
    }
    let cross = ab.perp_dot(p - a) / len;
    if cross.abs() > eps {
        return false;
    }
    let t = (p - a).dot(ab) / (len * len);
    (-eps / len..=1.0 + eps / len).contains(&t)
}

/// Signed area of a ring (positive when counter-clockwise, y-up).
pub fn signed_area(ring: &[Pt]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in ring.iter().enumerate() {
        let q = ring[(i + 1) % ring.len()];
        sum += p.perp_dot(q);
    }
    sum * 0.5
}

/// Total length of a polyline, optionally closing it.
pub fn path_length(points: &[Pt], closed: bool) -> f64 {
    let mut total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if closed && points.len() > 2 {
        total += points[points.len() - 1].distance(points[0]);
    }
    total
}
