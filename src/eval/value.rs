//! Resolved values

use crate::ast::EffectKind;
use crate::shapes::{Geometry, PointShape, Shape};
use crate::types::Pt;

/// A presentation change aimed at another statement's output
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    /// Variable naming the affected statement
    pub target: String,
    /// Opacity the target ends at
    pub opacity: f64,
}

/// What a statement resolves to. Compared structurally for dirty tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Shape(Shape),
    Effect(Effect),
}

impl Value {
    pub fn point(at: Pt) -> Value {
        Value::Shape(PointShape::new(at).into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Shape(s) => s.kind().name(),
            Value::Effect(_) => "effect",
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Value::Shape(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Shape> for Value {
    fn from(shape: Shape) -> Self {
        Value::Shape(shape)
    }
}
