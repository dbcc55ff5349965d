//! Command execution
//!
//! Compiled commands are drawn through a [`Renderer`] by a [`Controller`]
//! that plays them back on a sequential timeline. Each command moves from
//! [`RenderState::Preview`] (a frame per tick, handles reused) to
//! [`RenderState::Committed`] (permanent output) when its ratio reaches 1.

mod command;
mod constrain;
mod controller;
mod render;
mod renderer;

pub use command::{
    Command, CommandKind, Drawable, EffectCommand, ExecutionContext, RenderState, ShapeCommand, Style,
    TransformCommand, UtilityCommand,
};
pub use constrain::BoundaryConstrainer;
pub use controller::{Controller, ControllerConfig};
pub use render::shape_frame;
pub use renderer::{Call, Handle, Primitive, Recorded, RecordingRenderer, Renderer};
