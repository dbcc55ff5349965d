//! The renderer surface commands draw through
//!
//! The core only ever creates, updates, restyles and removes primitives;
//! cameras, scene graphs and input belong to the embedding application.

use std::collections::BTreeMap;

use crate::types::{Color, Pt};

/// Opaque id of a live primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

/// A drawable primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Point {
        at: Pt,
    },
    Line {
        from: Pt,
        to: Pt,
    },
    /// Angles in degrees, counter-clockwise
    Arc {
        center: Pt,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
    Polygon {
        points: Vec<Pt>,
        closed: bool,
    },
    /// A filled area with holes
    Region {
        outer: Vec<Pt>,
        holes: Vec<Vec<Pt>>,
    },
    Text {
        at: Pt,
        text: String,
    },
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Point { .. } => "point",
            Primitive::Line { .. } => "line",
            Primitive::Arc { .. } => "arc",
            Primitive::Polygon { .. } => "polygon",
            Primitive::Region { .. } => "region",
            Primitive::Text { .. } => "text",
        }
    }
}

/// Backend that owns the actual graphics objects.
pub trait Renderer {
    fn create(&mut self, primitive: &Primitive) -> Handle;

    /// Replace the geometry of a live primitive.
    fn update(&mut self, handle: Handle, primitive: &Primitive);

    fn set_position(&mut self, handle: Handle, at: Pt);

    fn set_color(&mut self, handle: Handle, color: &Color);

    fn set_opacity(&mut self, handle: Handle, opacity: f64);

    fn remove(&mut self, handle: Handle);
}

/// State of one live primitive in a [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub primitive: Primitive,
    pub color: Option<Color>,
    pub opacity: f64,
}

/// One call made against a [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Handle, &'static str),
    Update(Handle),
    SetPosition(Handle),
    SetColor(Handle),
    SetOpacity(Handle, f64),
    Remove(Handle),
}

/// Headless renderer that keeps every live primitive and a call log.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next: u64,
    live: BTreeMap<Handle, Recorded>,
    calls: Vec<Call>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> impl Iterator<Item = (&Handle, &Recorded)> {
        self.live.iter()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, handle: Handle) -> Option<&Recorded> {
        self.live.get(&handle)
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of `create` calls made so far.
    pub fn created(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Create(..))).count()
    }

    fn with_live(&mut self, handle: Handle, f: impl FnOnce(&mut Recorded)) {
        match self.live.get_mut(&handle) {
            Some(item) => f(item),
            None => {
                crate::log::warn!(?handle, "call on a removed primitive");
            }
        }
    }
}

impl Renderer for RecordingRenderer {
    fn create(&mut self, primitive: &Primitive) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        self.live.insert(
            handle,
            Recorded {
                primitive: primitive.clone(),
                color: None,
                opacity: 1.0,
            },
        );
        self.calls.push(Call::Create(handle, primitive.name()));
        handle
    }

    fn update(&mut self, handle: Handle, primitive: &Primitive) {
        self.calls.push(Call::Update(handle));
        self.with_live(handle, |item| item.primitive = primitive.clone());
    }

    fn set_position(&mut self, handle: Handle, at: Pt) {
        self.calls.push(Call::SetPosition(handle));
        self.with_live(handle, |item| {
            if let Primitive::Text { at: pos, .. } | Primitive::Point { at: pos } = &mut item.primitive {
                *pos = at;
            }
        });
    }

    fn set_color(&mut self, handle: Handle, color: &Color) {
        self.calls.push(Call::SetColor(handle));
        self.with_live(handle, |item| item.color = Some(color.clone()));
    }

    fn set_opacity(&mut self, handle: Handle, opacity: f64) {
        self.calls.push(Call::SetOpacity(handle, opacity));
        self.with_live(handle, |item| item.opacity = opacity);
    }

    fn remove(&mut self, handle: Handle) {
        self.calls.push(Call::Remove(handle));
        self.live.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_live_primitives() {
        let mut r = RecordingRenderer::new();
        let h = r.create(&Primitive::Point { at: Pt::ZERO });
        r.set_color(h, &Color::parse("#f00"));
        r.set_opacity(h, 0.5);
        r.set_position(h, Pt::ONE);
        let item = r.get(h).unwrap();
        assert_eq!(item.primitive, Primitive::Point { at: Pt::ONE });
        assert_eq!(item.color, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(item.opacity, 0.5);

        r.remove(h);
        assert_eq!(r.live_count(), 0);
        assert_eq!(r.created(), 1);
        assert_eq!(r.calls().last(), Some(&Call::Remove(h)));
    }

    #[test]
    fn calls_on_a_removed_handle_are_recorded_and_ignored() {
        let mut r = RecordingRenderer::new();
        let h = r.create(&Primitive::Point { at: Pt::ZERO });
        r.remove(h);
        r.set_color(h, &Color::parse("#00f"));
        r.update(h, &Primitive::Point { at: Pt::ONE });
        assert!(r.get(h).is_none());
        assert_eq!(r.live_count(), 0);
        assert_eq!(r.calls().last(), Some(&Call::Update(h)));
    }
}
