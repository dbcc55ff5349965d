//! Expression resolution
//!
//! [`resolve`] turns a typed [`crate::ast::Expression`] into a [`Value`]
//! against an [`ExpressionContext`]. The context lives for one batch pass:
//! each statement sees the bindings made by the statements before it.

mod boolean;
mod context;
mod intersect;
mod resolve;
mod value;

pub use boolean::{combine, rings};
pub use context::{CoordinateSystem, ExpressionContext, TransformBinding};
pub use intersect::intersect;
pub use resolve::{resolve, resolve_statement};
pub use value::{Effect, Value};

use crate::errors::ParseError;
use crate::parse::Node;

/// Parser entry point used by the compiler.
pub type ParseFn = fn(&str) -> Result<Node, ParseError>;

/// Evaluation settings shared by every statement of a batch.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    /// How `point(a, b)` interprets its two numbers
    pub coordinates: CoordinateSystem,
    pub parse: ParseFn,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            coordinates: CoordinateSystem::Cartesian,
            parse: crate::parse::parse,
        }
    }
}
