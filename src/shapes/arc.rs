//! Circular arcs and full circles

use super::{Geometry, ShapeKind, Transformable};
use crate::types::{Pt, foot, heading, mirror, mix, mix_f64, polar, rotate_about};

/// An arc of a circle. Angles are in degrees, counter-clockwise from +x;
/// a negative sweep runs clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcShape {
    pub center: Pt,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl ArcShape {
    pub fn new(center: Pt, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    pub fn circle(center: Pt, radius: f64) -> Self {
        Self::new(center, radius, 0.0, 360.0)
    }

    pub fn is_circle(&self) -> bool {
        self.sweep.abs() >= 360.0 - 1e-9
    }

    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    /// Point at fraction `t` of the sweep.
    pub fn sample(&self, t: f64) -> Pt {
        polar(self.center, self.radius, self.start_angle + self.sweep * t)
    }

    /// `segments + 1` points along the arc, end points included.
    pub fn polyline(&self, segments: usize) -> Vec<Pt> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.sample(i as f64 / segments as f64))
            .collect()
    }

    /// Closed ring approximating the arc's region. A full circle drops the
    /// duplicated seam point; a partial arc is closed through its chord.
    pub fn ring(&self, segments: usize) -> Vec<Pt> {
        let mut points = self.polyline(segments);
        if self.is_circle() {
            points.pop();
        }
        points
    }
}

impl Geometry for ArcShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Arc
    }

    fn start_value(&self) -> Pt {
        self.sample(0.0)
    }

    fn end_value(&self) -> Pt {
        self.sample(1.0)
    }

    fn position_index(&self, i: usize) -> Option<Pt> {
        match i {
            0 => Some(self.start_value()),
            1 => Some(self.end_value()),
            2 => Some(self.center),
            _ => None,
        }
    }

    fn control_points(&self) -> Vec<Pt> {
        vec![self.center, self.start_value(), self.end_value()]
    }

    fn path_length(&self) -> f64 {
        self.radius * self.sweep.to_radians().abs()
    }
}

impl Transformable for ArcShape {
    /// Moves the center only; radius and angles are kept.
    fn map_points(&self, f: &dyn Fn(Pt) -> Pt) -> Self {
        Self {
            center: f(self.center),
            ..self.clone()
        }
    }

    fn reverse(&self) -> Self {
        Self {
            start_angle: self.end_angle(),
            sweep: -self.sweep,
            ..self.clone()
        }
    }

    fn part(&self, from: f64, to: f64) -> Self {
        Self {
            start_angle: self.start_angle + self.sweep * from,
            sweep: self.sweep * (to - from),
            ..self.clone()
        }
    }

    fn rotate(&self, degrees: f64, about: Pt) -> Self {
        Self {
            center: rotate_about(self.center, degrees, about),
            start_angle: self.start_angle + degrees,
            ..self.clone()
        }
    }

    fn dilate(&self, scale: f64, about: Pt) -> Self {
        let start_angle = if scale < 0.0 {
            self.start_angle + 180.0
        } else {
            self.start_angle
        };
        Self {
            center: about + (self.center - about) * scale,
            radius: self.radius * scale.abs(),
            start_angle,
            sweep: self.sweep,
        }
    }

    /// The mirrored arc has its center mirrored, start angle `2φ - start`
    /// and negated sweep, where φ is the heading of the mirror line.
    /// Intermediate ratios blend center and angles linearly.
    fn reflect(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        let Some(center) = mirror(self.center, p1, p2) else {
            return self.clone();
        };
        let phi = heading(p1, p2);
        Self {
            center: mix(self.center, center, ratio),
            radius: self.radius,
            start_angle: mix_f64(self.start_angle, 2.0 * phi - self.start_angle, ratio),
            sweep: mix_f64(self.sweep, -self.sweep, ratio),
        }
    }

    /// Collapses toward the center's foot on the line; the radius shrinks
    /// to zero at ratio 1.
    fn project(&self, p1: Pt, p2: Pt, ratio: f64) -> Self {
        let Some(target) = foot(self.center, p1, p2) else {
            return self.clone();
        };
        Self {
            center: mix(self.center, target, ratio),
            radius: mix_f64(self.radius, 0.0, ratio),
            ..self.clone()
        }
    }
}
