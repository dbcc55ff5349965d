//! Statement to command compilation
//!
//! [`compile`] maps one resolved top-level expression to exactly one
//! [`Command`]. [`Compiler`] runs whole scripts and works out which
//! commands changed since the last successful pass.

mod batch;

pub use batch::{Compiler, Evaluation, SourceLine};

use crate::ast::{ExprKind, Expression};
use crate::errors::CompileError;
use crate::eval::Value;
use crate::exec::{Command, CommandKind, EffectCommand, ShapeCommand, Style, TransformCommand, UtilityCommand};

/// Build the command for a resolved statement. Presentation properties are
/// left at their defaults; the batch copies them over from the source line.
pub fn compile(expr: &Expression) -> Result<Command, CompileError> {
    let value = expr.value().ok_or_else(|| CompileError::Unresolved {
        text: expr.text.clone(),
    })?;
    let inner = expr.unwrap_assign();
    let assigned = expr.binds().is_some();

    let kind: CommandKind = match value {
        Value::Effect(effect) => EffectCommand { effect: effect.clone() }.into(),
        Value::Shape(shape) => match expr.motion() {
            Some(binding) if inner.kind.is_transform() => TransformCommand::new(binding.clone()).into(),
            _ => ShapeCommand { shape: shape.clone() }.into(),
        },
        Value::Number(n) if is_utility(&inner.kind, assigned) => UtilityCommand { value: *n }.into(),
        Value::Number(_) => {
            return Err(CompileError::NoSuchCommand {
                kind: inner.kind.name(),
            });
        }
    };
    crate::log::trace!(kind = kind.name(), text = %expr.text, "compiled");

    Ok(Command {
        id: expr.id.unwrap_or_default(),
        kind,
        style: Style::default(),
        name: expr.binds().map(str::to_string),
        text: expr.text.clone(),
    })
}

/// Number-valued statements that still get a command
fn is_utility(kind: &ExprKind, assigned: bool) -> bool {
    match kind {
        ExprKind::Dist(..) | ExprKind::Angle(..) | ExprKind::X(_) | ExprKind::Y(_) => true,
        ExprKind::Number(_)
        | ExprKind::Binary { .. }
        | ExprKind::Neg(_)
        | ExprKind::Math { .. }
        | ExprKind::Variable(_) => assigned,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{CoordinateSystem, ExpressionContext};
    use crate::parse::parse;
    use crate::registry::FunctionTable;
    use crate::shapes::{Geometry, ShapeKind};

    fn compiled(script: &[&str]) -> Vec<Result<Command, CompileError>> {
        let table = FunctionTable::standard();
        let mut ctx = ExpressionContext::new(CoordinateSystem::Cartesian);
        script
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let expr = table.build(&parse(text).unwrap(), text).unwrap().with_id(i as u32);
                expr.resolve(&mut ctx).unwrap();
                compile(&expr)
            })
            .collect()
    }

    #[test]
    fn shapes_and_transforms() {
        let out = compiled(&["a = point(1, 2)", "s = line(a, point(3, 2))", "rotate(s, 90, a)"]);
        let a = out[0].as_ref().unwrap();
        assert_eq!(a.name.as_deref(), Some("a"));
        assert!(matches!(&a.kind, CommandKind::Shape(s) if s.shape.kind() == ShapeKind::Point));
        let CommandKind::Transform(t) = &out[2].as_ref().unwrap().kind else {
            panic!("expected a transform command");
        };
        assert_eq!(t.source.kind(), ShapeKind::Line);
        assert!(t.result.end_value().distance(crate::types::Pt::new(1.0, 4.0)) < 1e-9);
    }

    #[test]
    fn bare_numbers_have_no_command() {
        let out = compiled(&["k = 2 * 3", "k + 1", "dist(point(0,0), point(3,4))"]);
        assert!(matches!(out[0].as_ref().unwrap().kind, CommandKind::Utility(UtilityCommand { value }) if value == 6.0));
        assert_eq!(
            out[1].as_ref().unwrap_err(),
            &CompileError::NoSuchCommand { kind: "arithmetic" }
        );
        assert!(matches!(out[2].as_ref().unwrap().kind, CommandKind::Utility(_)));
    }

    #[test]
    fn effects_compile_to_commands() {
        let out = compiled(&["p = point(0, 0)", "hide(p)"]);
        assert!(matches!(out[1].as_ref().unwrap().kind, CommandKind::Effect(_)));
    }

    #[test]
    fn unresolved_expression_is_rejected() {
        let table = FunctionTable::standard();
        let expr = table.build(&parse("point(1, 1)").unwrap(), "point(1, 1)").unwrap();
        assert!(matches!(compile(&expr), Err(CompileError::Unresolved { .. })));
    }
}
