//! Commands and their per-command render state

use enum_dispatch::enum_dispatch;

use crate::eval::{Effect, TransformBinding};
use crate::shapes::{Geometry, Shape, TransformOp};
use crate::types::{Color, Pt, Ratio};

use super::render::shape_frame;
use super::renderer::{Handle, Primitive, Renderer};

/// Anything the controller can draw
#[enum_dispatch]
pub trait Drawable {
    /// Primitives for the frame at `ratio`. Ratio 1 is the committed output.
    fn frame(&self, ratio: Ratio) -> Vec<Primitive>;

    /// Label position before the line's offset is applied
    fn anchor(&self) -> Option<Pt>;
}

/// Draws a shape progressively
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCommand {
    pub shape: Shape,
}

impl Drawable for ShapeCommand {
    fn frame(&self, ratio: Ratio) -> Vec<Primitive> {
        shape_frame(&self.shape, ratio)
    }

    fn anchor(&self) -> Option<Pt> {
        Some(self.shape.start_value())
    }
}

/// Animates a shape through a transform and commits the result
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCommand {
    pub source: Shape,
    pub op: TransformOp,
    pub result: Shape,
}

impl TransformCommand {
    pub fn new(binding: TransformBinding) -> Self {
        let result = binding.result();
        Self {
            source: binding.source,
            op: binding.op,
            result,
        }
    }
}

impl Drawable for TransformCommand {
    fn frame(&self, ratio: Ratio) -> Vec<Primitive> {
        if ratio.is_complete() {
            return shape_frame(&self.result, Ratio::ONE);
        }
        shape_frame(&self.op.apply(&self.source, ratio.raw()), Ratio::ONE)
    }

    fn anchor(&self) -> Option<Pt> {
        Some(self.result.start_value())
    }
}

/// Changes the opacity of another command's output
#[derive(Debug, Clone, PartialEq)]
pub struct EffectCommand {
    pub effect: Effect,
}

impl Drawable for EffectCommand {
    fn frame(&self, _ratio: Ratio) -> Vec<Primitive> {
        Vec::new()
    }

    fn anchor(&self) -> Option<Pt> {
        None
    }
}

/// A statement that only binds or measures a number
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityCommand {
    pub value: f64,
}

impl Drawable for UtilityCommand {
    fn frame(&self, _ratio: Ratio) -> Vec<Primitive> {
        Vec::new()
    }

    fn anchor(&self) -> Option<Pt> {
        None
    }
}

#[enum_dispatch(Drawable)]
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Shape(ShapeCommand),
    Transform(TransformCommand),
    Effect(EffectCommand),
    Utility(UtilityCommand),
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Shape(s) => s.shape.kind().name(),
            CommandKind::Transform(t) => t.op.name(),
            CommandKind::Effect(_) => "effect",
            CommandKind::Utility(_) => "utility",
        }
    }
}

/// Presentation properties of a command, independent of its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub color: Color,
    /// Playback speed multiplier; non-positive means the controller default
    pub speed: f64,
    pub label: bool,
    pub label_offset: Pt,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::default(),
            speed: crate::defaults::DEFAULT_SPEED,
            label: false,
            label_offset: Pt::ZERO,
        }
    }
}

/// The executable unit compiled from one statement
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Id of the originating line
    pub id: u32,
    pub kind: CommandKind,
    pub style: Style,
    /// Name bound by the statement, used as label text
    pub name: Option<String>,
    pub text: String,
}

impl Command {
    pub fn label_text(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.text)
    }

    pub fn label_position(&self) -> Option<Pt> {
        self.kind.anchor().map(|a| a + self.style.label_offset)
    }
}

/// Where a command is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Ratio below 1: only ephemeral preview output exists
    Preview,
    /// Ratio reached 1: permanent output is registered
    Committed,
}

/// Scratch state of one command: the handles it owns.
#[derive(Debug)]
pub struct ExecutionContext {
    pub id: u32,
    state: RenderState,
    preview: Vec<Handle>,
    committed: Vec<Handle>,
    label: Option<Handle>,
    /// Text the label was last drawn with
    label_text: String,
    opacity: f64,
    /// Target opacity captured when an effect starts
    pub(super) effect_from: Option<f64>,
}

impl ExecutionContext {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            state: RenderState::Preview,
            preview: Vec::new(),
            committed: Vec::new(),
            label: None,
            label_text: String::new(),
            opacity: 1.0,
            effect_from: None,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn committed(&self) -> &[Handle] {
        &self.committed
    }

    pub fn label(&self) -> Option<Handle> {
        self.label
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Draw `command` at `ratio`. Below 1 the preview handles are reused
    /// frame to frame; at 1 the preview is replaced by committed output.
    pub fn draw(&mut self, command: &Command, ratio: Ratio, renderer: &mut dyn Renderer) {
        match self.state {
            RenderState::Committed => {}
            RenderState::Preview if ratio.is_complete() => self.commit(command, renderer),
            RenderState::Preview => {
                let frame = command.kind.frame(ratio);
                self.show_preview(&frame, &command.style, renderer);
            }
        }
    }

    fn show_preview(&mut self, frame: &[Primitive], style: &Style, renderer: &mut dyn Renderer) {
        for (i, primitive) in frame.iter().enumerate() {
            match self.preview.get(i) {
                Some(&handle) => renderer.update(handle, primitive),
                None => {
                    let handle = renderer.create(primitive);
                    renderer.set_color(handle, &style.color);
                    if self.opacity < 1.0 {
                        renderer.set_opacity(handle, self.opacity);
                    }
                    self.preview.push(handle);
                }
            }
        }
        for handle in self.preview.drain(frame.len()..) {
            renderer.remove(handle);
        }
    }

    fn commit(&mut self, command: &Command, renderer: &mut dyn Renderer) {
        for handle in self.preview.drain(..) {
            renderer.remove(handle);
        }
        for primitive in command.kind.frame(Ratio::ONE) {
            let handle = renderer.create(&primitive);
            renderer.set_color(handle, &command.style.color);
            if self.opacity < 1.0 {
                renderer.set_opacity(handle, self.opacity);
            }
            self.committed.push(handle);
        }
        self.sync_label(command, renderer);
        self.state = RenderState::Committed;
        crate::log::trace!(id = self.id, handles = self.committed.len(), "committed");
    }

    fn sync_label(&mut self, command: &Command, renderer: &mut dyn Renderer) {
        let wanted = command.style.label.then(|| command.label_position()).flatten();
        match (wanted, self.label) {
            (Some(at), Some(handle)) if self.label_text == command.label_text() => {
                renderer.set_position(handle, at);
            }
            (Some(at), Some(handle)) => {
                self.label_text = command.label_text().to_string();
                renderer.update(handle, &Primitive::Text {
                    at,
                    text: self.label_text.clone(),
                });
            }
            (Some(at), None) => {
                self.label_text = command.label_text().to_string();
                let handle = renderer.create(&Primitive::Text {
                    at,
                    text: self.label_text.clone(),
                });
                renderer.set_color(handle, &command.style.color);
                self.label = Some(handle);
            }
            (None, Some(handle)) => {
                renderer.remove(handle);
                self.label = None;
            }
            (None, None) => {}
        }
    }

    /// Apply new presentation properties to output that already exists.
    pub fn restyle(&mut self, command: &Command, renderer: &mut dyn Renderer) {
        for &handle in self.preview.iter().chain(&self.committed) {
            renderer.set_color(handle, &command.style.color);
        }
        if let Some(handle) = self.label {
            renderer.set_color(handle, &command.style.color);
        }
        if self.state == RenderState::Committed {
            self.sync_label(command, renderer);
        }
    }

    pub fn set_opacity(&mut self, opacity: f64, renderer: &mut dyn Renderer) {
        self.opacity = opacity;
        for &handle in self.preview.iter().chain(&self.committed).chain(&self.label) {
            renderer.set_opacity(handle, opacity);
        }
    }

    /// Remove everything this command has drawn.
    pub fn teardown(&mut self, renderer: &mut dyn Renderer) {
        for handle in self.preview.drain(..).chain(self.committed.drain(..)).chain(self.label.take()) {
            renderer.remove(handle);
        }
        self.state = RenderState::Preview;
        self.opacity = 1.0;
        self.effect_from = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::renderer::RecordingRenderer;
    use crate::shapes::LineShape;

    fn line_command(label: bool) -> Command {
        Command {
            id: 7,
            kind: ShapeCommand {
                shape: LineShape::new(Pt::ZERO, Pt::new(2.0, 0.0)).into(),
            }
            .into(),
            style: Style {
                label,
                label_offset: Pt::new(0.0, 0.5),
                ..Style::default()
            },
            name: Some("seg".to_string()),
            text: "seg = line(a, b)".to_string(),
        }
    }

    #[test]
    fn preview_reuses_its_handle() {
        let mut r = RecordingRenderer::new();
        let mut cx = ExecutionContext::new(7);
        let cmd = line_command(false);
        for step in 1..5 {
            cx.draw(&cmd, Ratio::clamped(step as f64 / 5.0), &mut r);
        }
        assert_eq!(r.created(), 1);
        assert_eq!(r.live_count(), 1);
        assert_eq!(cx.state(), RenderState::Preview);
    }

    #[test]
    fn commit_replaces_preview_and_adds_label() {
        let mut r = RecordingRenderer::new();
        let mut cx = ExecutionContext::new(7);
        let cmd = line_command(true);
        cx.draw(&cmd, Ratio::clamped(0.5), &mut r);
        cx.draw(&cmd, Ratio::ONE, &mut r);
        assert_eq!(cx.state(), RenderState::Committed);
        assert_eq!(cx.committed().len(), 1);
        let label = cx.label().and_then(|h| r.get(h)).unwrap();
        assert_eq!(
            label.primitive,
            Primitive::Text {
                at: Pt::new(0.0, 0.5),
                text: "seg".to_string()
            }
        );
        // preview handle gone, line and label live
        assert_eq!(r.live_count(), 2);

        cx.draw(&cmd, Ratio::ONE, &mut r);
        assert_eq!(r.live_count(), 2, "drawing a committed command is a no-op");
    }

    #[test]
    fn teardown_removes_everything() {
        let mut r = RecordingRenderer::new();
        let mut cx = ExecutionContext::new(7);
        let cmd = line_command(true);
        cx.draw(&cmd, Ratio::ONE, &mut r);
        cx.teardown(&mut r);
        assert_eq!(r.live_count(), 0);
        assert_eq!(cx.state(), RenderState::Preview);
    }
}
