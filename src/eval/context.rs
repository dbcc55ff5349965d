//! Resolution context - bindings made during one batch pass

use std::collections::HashMap;

use crate::shapes::{Shape, TransformOp};
use crate::types::Pt;

use super::Value;

/// How the two numbers of `point(a, b)` are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// `(x, y)`
    #[default]
    Cartesian,
    /// `(radius, degrees)` around the origin
    Polar,
}

/// The transform a name was bound to, kept so that `repeat` and `trace`
/// can replay it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformBinding {
    pub source: Shape,
    pub op: TransformOp,
}

impl TransformBinding {
    pub fn result(&self) -> Shape {
        self.op.apply(&self.source, 1.0)
    }
}

/// Name -> value bindings plus the active coordinate system
#[derive(Debug, Clone)]
pub struct ExpressionContext {
    coordinates: CoordinateSystem,
    values: HashMap<String, Value>,
    transforms: HashMap<String, TransformBinding>,
}

impl Default for ExpressionContext {
    fn default() -> Self {
        Self::new(CoordinateSystem::default())
    }
}

impl ExpressionContext {
    pub fn new(coordinates: CoordinateSystem) -> Self {
        let mut ctx = Self {
            coordinates,
            values: HashMap::new(),
            transforms: HashMap::new(),
        };
        ctx.init_builtin_variables();
        ctx
    }

    fn init_builtin_variables(&mut self) {
        macro_rules! builtin_vars {
            ($($name:ident => $value:expr),* $(,)?) => {
                $(
                    self.values.insert(stringify!($name).to_string(), $value);
                )*
            };
        }

        builtin_vars! {
            pi     => Value::Number(std::f64::consts::PI),
            e      => Value::Number(std::f64::consts::E),
            origin => Value::point(Pt::ZERO),
        }
    }

    pub fn coordinates(&self) -> CoordinateSystem {
        self.coordinates
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn transform(&self, name: &str) -> Option<&TransformBinding> {
        self.transforms.get(name)
    }

    /// Record (or forget) the transform behind `name`.
    pub fn set_transform(&mut self, name: &str, binding: Option<TransformBinding>) {
        match binding {
            Some(b) => {
                self.transforms.insert(name.to_string(), b);
            }
            None => {
                self.transforms.remove(name);
            }
        }
    }
}
