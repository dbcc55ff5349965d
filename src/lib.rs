//! construkt: a runtime for a textual geometric construction language.
//!
//! A script is a list of statements such as
//!
//! ```text
//! a = point(1, 2)
//! b = point(4, 6)
//! s = line(a, b)
//! rotate(s, 90, a)
//! ```
//!
//! Each statement is parsed into a generic [`Node`], built into a typed
//! [`ast::Expression`], resolved to a [`Value`] and compiled into one
//! drawable [`exec::Command`]. The [`Compiler`] evaluates whole scripts and
//! tracks which commands changed since the last pass; the [`Controller`]
//! plays the commands back through a [`Renderer`].
//!
//! ```
//! use construkt::{Compiler, Controller, RecordingRenderer, SourceLine};
//!
//! let mut compiler = Compiler::new();
//! let script = [
//!     SourceLine::new(1, "a = point(1, 2)"),
//!     SourceLine::new(2, "b = point(4, 6)"),
//!     SourceLine::new(3, "line(a, b)"),
//! ];
//! let evaluation = compiler.evaluate_script(&script).unwrap();
//! assert!(evaluation.is_ok());
//!
//! let mut controller = Controller::new(RecordingRenderer::new());
//! controller.apply(&evaluation);
//! controller.draw_all();
//! assert_eq!(controller.renderer().live_count(), 3);
//! ```

pub mod log;

pub mod ast;
pub mod clip;
pub mod compile;
pub mod defaults;
pub mod errors;
pub mod eval;
pub mod exec;
pub mod parse;
pub mod registry;
pub mod shapes;
pub mod types;

pub use compile::{Compiler, Evaluation, SourceLine, compile};
pub use errors::{ClipError, CompileError, ParseError, ResolveError, ScriptError, StatementError};
pub use eval::{CoordinateSystem, EvalConfig, Value};
pub use exec::{
    BoundaryConstrainer, Controller, ControllerConfig, Handle, Primitive, RecordingRenderer, RenderState, Renderer,
};
pub use parse::{Node, parse};
pub use shapes::{Geometry, Shape, Transformable};
pub use types::{Color, Pt, Ratio};
