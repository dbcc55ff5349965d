//! Default sampling densities, clipping range and timing settings

/// Samples per edge when a polygon boundary is cut by progress ratios.
pub const PART_SAMPLES_PER_EDGE: usize = 100;

/// Chord segments used when an arc is turned into a ring for clipping.
pub const ARC_SEGMENTS: usize = 64;

/// Catmull-Rom samples between two consecutive spline control points.
pub const SPLINE_SAMPLES_PER_SPAN: usize = 16;

/// Steps taken when tracing the locus of a transform from ratio 0 to 1.
pub const TRACE_SAMPLES: usize = 48;

/// Largest copy count `repeat` accepts.
pub const MAX_REPEAT: usize = 10_000;

/// Fixed-point scale applied to coordinates entering the clipper.
pub const CLIP_SCALE: f64 = 1e6;

/// Largest absolute coordinate (in drawing units) the clipper accepts.
pub const CLIP_RANGE: f64 = 1e9;

/// Seconds a command takes to draw at speed 1.
pub const BASE_DURATION: f64 = 1.0;

pub const DEFAULT_SPEED: f64 = 1.0;

/// Opacity applied by `fade(name)` without an explicit value.
pub const FADE_OPACITY: f64 = 0.3;
