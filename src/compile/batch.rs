//! Whole-script evaluation with dirty tracking

use std::collections::{BTreeSet, HashMap};

use crate::ast::Expression;
use crate::errors::{ClipError, CompileError, ResolveError, ScriptError, StatementError};
use crate::eval::{EvalConfig, ExpressionContext, Value};
use crate::exec::{Command, Style};
use crate::registry::FunctionTable;
use crate::types::{Color, Pt};

use super::compile;

/// One editor line as submitted by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub id: u32,
    pub text: String,
    pub color: Color,
    pub speed: f64,
    pub label: bool,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl SourceLine {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        let style = Style::default();
        Self {
            id,
            text: text.into(),
            color: style.color,
            speed: style.speed,
            label: style.label,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_label(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.label = true;
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn style(&self) -> Style {
        Style {
            color: self.color.clone(),
            speed: self.speed,
            label: self.label,
            label_offset: Pt::new(self.offset_x, self.offset_y),
        }
    }

    /// Blank lines and `#` comments produce nothing.
    fn is_blank(&self) -> bool {
        let text = self.text.trim();
        text.is_empty() || text.starts_with('#')
    }
}

/// Result of one pass over a script
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Commands in source order, up to the failing line if any
    pub commands: Vec<Command>,
    /// Ids whose value is new or changed, directly or through a dependency
    pub dirty: BTreeSet<u32>,
    /// Clean ids whose presentation properties changed
    pub restyled: BTreeSet<u32>,
    pub error: Option<ScriptError>,
    /// Bound name to the id of the line that bound it last
    pub names: HashMap<String, u32>,
}

impl Evaluation {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn command(&self, id: u32) -> Option<&Command> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn is_dirty(&self, id: u32) -> bool {
        self.dirty.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    value: Value,
    style: Style,
    /// Bound name, shown by the label
    name: Option<String>,
}

/// Evaluates scripts and remembers the last successful pass.
///
/// ```
/// use construkt::{Compiler, SourceLine};
///
/// let mut compiler = Compiler::new();
/// let lines = [SourceLine::new(1, "a = point(1, 2)"), SourceLine::new(2, "line(a, point(4, 6))")];
/// let first = compiler.evaluate_script(&lines).unwrap();
/// assert_eq!(first.dirty.len(), 2);
/// let second = compiler.evaluate_script(&lines).unwrap();
/// assert!(second.dirty.is_empty());
/// ```
pub struct Compiler {
    config: EvalConfig,
    functions: FunctionTable,
    /// Id to value and style from the last successful pass
    previous: HashMap<u32, Snapshot>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            config,
            functions: FunctionTable::standard(),
            previous: HashMap::new(),
        }
    }

    /// Forget the last pass so every command is dirty next time.
    pub fn reset(&mut self) {
        self.previous.clear();
    }

    /// Evaluate `lines` in order, stopping at the first failing line.
    ///
    /// Statement failures are reported in [`Evaluation::error`]; only a
    /// clipping defect is returned as `Err`. The remembered snapshot is
    /// replaced only when every line succeeds.
    pub fn evaluate_script(&mut self, lines: &[SourceLine]) -> Result<Evaluation, ClipError> {
        crate::log::debug!(lines = lines.len(), "evaluating script");
        let mut ctx = ExpressionContext::new(self.config.coordinates);
        let mut out = Evaluation::default();
        let mut current: HashMap<u32, Snapshot> = HashMap::new();

        for (index, line) in lines.iter().enumerate() {
            if line.is_blank() {
                continue;
            }
            let evaluated = if current.contains_key(&line.id) {
                Err(CompileError::DuplicateId { id: line.id }.into())
            } else {
                self.evaluate_line(line, &mut ctx)
            };
            let (value, expr, mut command) = match evaluated {
                Ok(done) => done,
                Err(StatementError::Resolve(ResolveError::Clip(e))) => return Err(e),
                Err(error) => {
                    crate::log::debug!(index, id = line.id, %error, "statement failed");
                    out.error = Some(ScriptError {
                        index,
                        expression_id: line.id,
                        error,
                    });
                    break;
                }
            };
            command.style = line.style();

            let snapshot = Snapshot {
                value,
                style: command.style.clone(),
                name: command.name.clone(),
            };
            let dirty = match self.previous.get(&line.id) {
                None => true,
                Some(old) if old.value != snapshot.value => true,
                Some(_) => expr
                    .references()
                    .iter()
                    .filter_map(|name| out.names.get(*name))
                    .any(|dep| out.dirty.contains(dep)),
            };
            if dirty {
                out.dirty.insert(line.id);
            } else if self
                .previous
                .get(&line.id)
                .is_some_and(|old| old.style != snapshot.style || old.name != snapshot.name)
            {
                out.restyled.insert(line.id);
            }
            crate::log::trace!(id = line.id, dirty, "line evaluated");

            if let Some(name) = expr.binds() {
                out.names.insert(name.to_string(), line.id);
            }
            current.insert(line.id, snapshot);
            out.commands.push(command);
        }

        if out.is_ok() {
            self.previous = current;
        }
        crate::log::debug!(
            commands = out.commands.len(),
            dirty = out.dirty.len(),
            ok = out.is_ok(),
            "script evaluated"
        );
        Ok(out)
    }

    fn evaluate_line(
        &self,
        line: &SourceLine,
        ctx: &mut ExpressionContext,
    ) -> Result<(Value, Expression, Command), StatementError> {
        let node = (self.config.parse)(&line.text)?;
        let expr = self.functions.build(&node, &line.text)?.with_id(line.id);
        let value = expr.resolve(ctx)?.clone();
        let command = compile(&expr)?;
        Ok((value, expr, command))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<SourceLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| SourceLine::new(i as u32 + 1, *t))
            .collect()
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let mut c = Compiler::new();
        let eval = c
            .evaluate_script(&lines(&["", "# setup", "a = point(0, 0)", "   "]))
            .unwrap();
        assert!(eval.is_ok());
        assert_eq!(eval.commands.len(), 1);
        assert_eq!(eval.commands[0].id, 3);
    }

    #[test]
    fn effects_follow_their_target() {
        let mut c = Compiler::new();
        c.evaluate_script(&lines(&["a = point(0, 0)", "hide(a)"])).unwrap();
        let eval = c.evaluate_script(&lines(&["a = point(1, 0)", "hide(a)"])).unwrap();
        assert!(eval.is_dirty(1));
        assert!(eval.is_dirty(2), "an effect is dirty when its target is");
    }

    #[test]
    fn style_changes_are_not_dirty() {
        let mut c = Compiler::new();
        c.evaluate_script(&lines(&["a = point(0, 0)"])).unwrap();
        let restyled = vec![SourceLine::new(1, "a = point(0, 0)").with_color(Color::parse("red"))];
        let eval = c.evaluate_script(&restyled).unwrap();
        assert!(eval.dirty.is_empty());
        assert!(eval.restyled.contains(&1));
        assert_eq!(eval.commands[0].style.color, Color::Named("red".into()));
    }

    #[test]
    fn failure_keeps_the_previous_snapshot() {
        let mut c = Compiler::new();
        let good = lines(&["a = point(0, 0)", "b = point(1, 1)"]);
        c.evaluate_script(&good).unwrap();
        let bad = c.evaluate_script(&lines(&["a = point(0, 0)", "b = 1 / 0"])).unwrap();
        let error = bad.error.as_ref().unwrap();
        assert_eq!((error.index, error.expression_id), (1, 2));
        assert_eq!(error.name(), "ResolutionError");

        let again = c.evaluate_script(&good).unwrap();
        assert!(again.dirty.is_empty());
    }

    #[test]
    fn renaming_a_binding_is_a_restyle() {
        let mut c = Compiler::new();
        c.evaluate_script(&lines(&["a = point(1, 2)"])).unwrap();
        let eval = c.evaluate_script(&lines(&["b = point(1, 2)"])).unwrap();
        assert!(eval.dirty.is_empty());
        assert!(eval.restyled.contains(&1));
        assert_eq!(eval.commands[0].label_text(), "b");
        assert_eq!(eval.names.get("b"), Some(&1));

        let again = c.evaluate_script(&lines(&["b = point(1, 2)"])).unwrap();
        assert!(again.restyled.is_empty());
    }

    #[test]
    fn duplicate_ids_fail_the_second_line() {
        let mut c = Compiler::new();
        let script = vec![
            SourceLine::new(7, "a = point(0, 0)"),
            SourceLine::new(8, "b = point(1, 1)"),
            SourceLine::new(7, "c = point(2, 2)"),
        ];
        let eval = c.evaluate_script(&script).unwrap();
        let error = eval.error.as_ref().unwrap();
        assert_eq!((error.index, error.expression_id), (2, 7));
        assert_eq!(error.name(), "CommandCompilationError");
        assert!(matches!(
            error.error,
            StatementError::Compile(CompileError::DuplicateId { id: 7 })
        ));
        assert_eq!(eval.commands.len(), 2);
        assert_eq!(eval.command(7).map(|c| c.text.as_str()), Some("a = point(0, 0)"));
    }

    #[test]
    fn parse_errors_are_reported_with_the_line() {
        let mut c = Compiler::new();
        let eval = c.evaluate_script(&lines(&["point(1,", "point(2, 2)"])).unwrap();
        let error = eval.error.unwrap();
        assert_eq!(error.index, 0);
        assert_eq!(error.name(), "ParseError");
        assert!(eval.commands.is_empty());
    }
}
