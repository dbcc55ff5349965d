//! Function table: call names -> expression builders
//!
//! Built once from a declarative list. Building is a pure bottom-up walk:
//! every argument node becomes an [`Expression`] before its parent's builder
//! runs, and no value is looked at until resolution.

use std::collections::HashMap;

use crate::ast::{BinaryOp, EffectKind, ExprKind, Expression, MathFn};
use crate::clip::ClipOp;
use crate::errors::ResolveError;
use crate::parse::Node;

/// How many arguments a function accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(k) => n >= k,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(k) => k.to_string(),
            Arity::Range(lo, hi) => format!("{}..={}", lo, hi),
            Arity::AtLeast(k) => format!("at least {}", k),
        }
    }
}

/// Turns already-built arguments into an expression kind.
pub type Builder = fn(Vec<Expression>) -> Result<ExprKind, ResolveError>;

#[derive(Clone, Copy)]
struct Entry {
    arity: Arity,
    build: Builder,
}

/// Immutable name -> builder map
pub struct FunctionTable {
    entries: HashMap<&'static str, Entry>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn boxed(e: Expression) -> Box<Expression> {
    Box::new(e)
}

/// Split an argument vector whose length the arity check already fixed.
fn take<const N: usize>(args: Vec<Expression>) -> Result<[Expression; N], ResolveError> {
    let got = args.len();
    <[Expression; N]>::try_from(args).map_err(|_| ResolveError::Arity {
        function: "builder".to_string(),
        expected: N.to_string(),
        got,
    })
}

/// First argument plus the rest.
fn split_first(args: Vec<Expression>) -> Result<(Expression, Vec<Expression>), ResolveError> {
    let mut iter = args.into_iter();
    let first = iter.next().ok_or(ResolveError::Arity {
        function: "builder".to_string(),
        expected: "at least 1".to_string(),
        got: 0,
    })?;
    Ok((first, iter.collect()))
}

fn variable_name(e: Expression) -> Result<String, ResolveError> {
    match &e.kind {
        ExprKind::Variable(name) => Ok(name.clone()),
        other => Err(ResolveError::TypeMismatch {
            expected: "name",
            got: other.name(),
        }),
    }
}

fn binary(op: BinaryOp) -> impl Fn(Vec<Expression>) -> Result<ExprKind, ResolveError> {
    move |args| {
        let [lhs, rhs] = take(args)?;
        Ok(ExprKind::Binary {
            op,
            lhs: boxed(lhs),
            rhs: boxed(rhs),
        })
    }
}

fn boolean(op: ClipOp) -> impl Fn(Vec<Expression>) -> Result<ExprKind, ResolveError> {
    move |args| {
        let [lhs, rhs] = take(args)?;
        Ok(ExprKind::Boolean {
            op,
            lhs: boxed(lhs),
            rhs: boxed(rhs),
        })
    }
}

fn effect(kind: EffectKind, args: Vec<Expression>) -> Result<ExprKind, ResolveError> {
    let (target, rest) = split_first(args)?;
    Ok(ExprKind::Effect {
        kind,
        target: variable_name(target)?,
        opacity: rest.into_iter().next().map(boxed),
    })
}

fn rotate_like(args: Vec<Expression>, dilate: bool) -> Result<ExprKind, ResolveError> {
    let mut iter = args.into_iter();
    let (Some(target), Some(amount)) = (iter.next(), iter.next()) else {
        return Err(ResolveError::Arity {
            function: if dilate { "dilate" } else { "rotate" }.to_string(),
            expected: "2..=3".to_string(),
            got: 0,
        });
    };
    let about = iter.next().map(boxed);
    let (target, amount) = (boxed(target), boxed(amount));
    Ok(if dilate {
        ExprKind::Dilate {
            target,
            scale: amount,
            about,
        }
    } else {
        ExprKind::Rotate {
            target,
            degrees: amount,
            about,
        }
    })
}

/// Register `name Arity => builder` entries.
macro_rules! functions {
    ($table:ident; $($name:literal $arity:expr => $build:expr),* $(,)?) => {
        $(
            $table.insert($name, Entry { arity: $arity, build: $build });
        )*
    };
}

macro_rules! math_fns {
    ($table:ident; $($name:literal => $func:ident ($arity:expr)),* $(,)?) => {
        $(
            $table.insert($name, Entry {
                arity: $arity,
                build: |args| Ok(ExprKind::Math { func: MathFn::$func, args }),
            });
        )*
    };
}

impl FunctionTable {
    /// The construction language's functions and operators.
    pub fn standard() -> Self {
        use Arity::*;
        let mut t: HashMap<&'static str, Entry> = HashMap::new();

        functions! { t;
            "+" Exact(2) => |a| binary(BinaryOp::Add)(a),
            "-" Exact(2) => |a| binary(BinaryOp::Sub)(a),
            "*" Exact(2) => |a| binary(BinaryOp::Mul)(a),
            "/" Exact(2) => |a| binary(BinaryOp::Div)(a),
            "^" Exact(2) => |a| binary(BinaryOp::Pow)(a),
            "neg" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Neg(boxed(e)))
            },
            "=" Exact(2) => |a| {
                let [target, value] = take(a)?;
                let ExprKind::Variable(name) = target.kind else {
                    return Err(ResolveError::AssignmentTarget);
                };
                Ok(ExprKind::Assign { name, value: boxed(value) })
            },

            // Geometry
            "point" Exact(2) => |a| {
                let [x, y] = take(a)?;
                Ok(ExprKind::Point(boxed(x), boxed(y)))
            },
            "line" Exact(2) => |a| {
                let [p, q] = take(a)?;
                Ok(ExprKind::Line(boxed(p), boxed(q)))
            },
            "arc" Exact(3) => |a| {
                let [center, from, sweep] = take(a)?;
                Ok(ExprKind::Arc { center: boxed(center), from: boxed(from), sweep: boxed(sweep) })
            },
            "circle" Exact(2) => |a| {
                let [center, radius] = take(a)?;
                Ok(ExprKind::Circle { center: boxed(center), radius: boxed(radius) })
            },
            "perp" Exact(2) => |a| {
                let [line, through] = take(a)?;
                Ok(ExprKind::Perp { line: boxed(line), through: boxed(through) })
            },
            "parallel" Exact(2) => |a| {
                let [line, through] = take(a)?;
                Ok(ExprKind::Parallel { line: boxed(line), through: boxed(through) })
            },
            "polygon" AtLeast(3) => |a| Ok(ExprKind::Polygon(a)),
            "spline" AtLeast(2) => |a| Ok(ExprKind::Spline(a)),
            "pair" Exact(2) => |a| {
                let [p, q] = take(a)?;
                Ok(ExprKind::Pair(boxed(p), boxed(q)))
            },
            "fill" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Fill(boxed(e)))
            },
            "angle" Exact(3) => |a| {
                let [p, vertex, q] = take(a)?;
                Ok(ExprKind::Angle(boxed(p), boxed(vertex), boxed(q)))
            },
            "dist" Exact(2) => |a| {
                let [p, q] = take(a)?;
                Ok(ExprKind::Dist(boxed(p), boxed(q)))
            },
            "intersect" Exact(2) => |a| {
                let [p, q] = take(a)?;
                Ok(ExprKind::Intersect(boxed(p), boxed(q)))
            },
            "x" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::X(boxed(e)))
            },
            "y" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Y(boxed(e)))
            },
            "vertex" Exact(2) => |a| {
                let [shape, index] = take(a)?;
                Ok(ExprKind::Vertex { shape: boxed(shape), index: boxed(index) })
            },
            "start" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Start(boxed(e)))
            },
            "end" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::End(boxed(e)))
            },
            "mid" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Mid(boxed(e)))
            },

            // Transforms
            "rotate" Range(2, 3) => |a| rotate_like(a, false),
            "dilate" Range(2, 3) => |a| rotate_like(a, true),
            "translate" Exact(2) => |a| {
                let [target, by] = take(a)?;
                Ok(ExprKind::Translate { target: boxed(target), by: boxed(by) })
            },
            "reflect" Range(2, 3) => |a| {
                let (target, mirror) = split_first(a)?;
                Ok(ExprKind::Reflect { target: boxed(target), mirror })
            },
            "project" Range(2, 3) => |a| {
                let (target, onto) = split_first(a)?;
                Ok(ExprKind::Project { target: boxed(target), onto })
            },

            // Composition
            "group" AtLeast(1) => |a| Ok(ExprKind::Group(a)),
            "repeat" Exact(2) => |a| {
                let [transform, count] = take(a)?;
                Ok(ExprKind::Repeat { transform: boxed(transform), count: boxed(count) })
            },
            "part" Exact(3) => |a| {
                let [target, from, to] = take(a)?;
                Ok(ExprKind::Part { target: boxed(target), from: boxed(from), to: boxed(to) })
            },
            "reverse" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Reverse(boxed(e)))
            },
            "trace" Exact(1) => |a| {
                let [e] = take(a)?;
                Ok(ExprKind::Trace(boxed(e)))
            },

            // Boolean
            "and" Exact(2) => |a| boolean(ClipOp::Intersection)(a),
            "or" Exact(2) => |a| boolean(ClipOp::Union)(a),
            "diff" Exact(2) => |a| boolean(ClipOp::Difference)(a),
            "xor" Exact(2) => |a| boolean(ClipOp::Xor)(a),

            // Effects
            "hide" Exact(1) => |a| effect(EffectKind::Hide, a),
            "show" Exact(1) => |a| effect(EffectKind::Show, a),
            "fade" Range(1, 2) => |a| effect(EffectKind::Fade, a),
        }

        math_fns! { t;
            "sin" => Sin(Exact(1)),
            "cos" => Cos(Exact(1)),
            "tan" => Tan(Exact(1)),
            "asin" => Asin(Exact(1)),
            "acos" => Acos(Exact(1)),
            "atan" => Atan(Exact(1)),
            "sqrt" => Sqrt(Exact(1)),
            "abs" => Abs(Exact(1)),
            "ln" => Ln(Exact(1)),
            "log" => Log(Exact(1)),
            "exp" => Exp(Exact(1)),
            "floor" => Floor(Exact(1)),
            "ceil" => Ceil(Exact(1)),
            "round" => Round(Exact(1)),
            "min" => Min(AtLeast(1)),
            "max" => Max(AtLeast(1)),
        }

        Self { entries: t }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Build the typed tree for `node`. `text` becomes the root's source
    /// text; children get their rendered node text.
    pub fn build(&self, node: &Node, text: &str) -> Result<Expression, ResolveError> {
        let kind = match node {
            Node::Number(n) => ExprKind::Number(*n),
            Node::Ident(name) => ExprKind::Variable(name.clone()),
            Node::Call { name, args } => {
                let entry = self
                    .entries
                    .get(name.as_str())
                    .ok_or_else(|| ResolveError::UnknownFunction { name: name.clone() })?;
                if !entry.arity.accepts(args.len()) {
                    return Err(ResolveError::Arity {
                        function: name.clone(),
                        expected: entry.arity.describe(),
                        got: args.len(),
                    });
                }
                let built = args
                    .iter()
                    .map(|arg| self.build(arg, &arg.to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                (entry.build)(built)?
            }
        };
        Ok(Expression::new(kind, text.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn build(text: &str) -> Result<Expression, ResolveError> {
        FunctionTable::standard().build(&parse(text).unwrap(), text)
    }

    #[test]
    fn builds_bottom_up() {
        let expr = build("a = rotate(line(p, q), 30)").unwrap();
        assert_eq!(expr.text, "a = rotate(line(p, q), 30)");
        let ExprKind::Assign { name, value } = &expr.kind else {
            panic!("expected an assignment");
        };
        assert_eq!(name, "a");
        let ExprKind::Rotate { target, about, .. } = &value.kind else {
            panic!("expected a rotation");
        };
        assert_eq!(target.text, "line(p, q)");
        assert!(about.is_none());
    }

    #[test]
    fn unknown_function_and_arity() {
        assert!(matches!(build("frobnicate(1)"), Err(ResolveError::UnknownFunction { .. })));
        let err = build("line(p)").unwrap_err();
        assert!(matches!(err, ResolveError::Arity { ref function, got: 1, .. } if function == "line"));
        assert!(matches!(build("polygon(a, b)"), Err(ResolveError::Arity { .. })));
        assert!(build("fade(a, 0.5)").is_ok());
    }

    #[test]
    fn effects_take_a_name() {
        let ExprKind::Effect { kind, target, .. } = build("hide(seg)").unwrap().kind else {
            panic!("expected an effect");
        };
        assert_eq!((kind, target.as_str()), (EffectKind::Hide, "seg"));
        assert!(matches!(build("hide(point(1, 2))"), Err(ResolveError::TypeMismatch { .. })));
    }

    #[test]
    fn every_listed_function_is_registered() {
        let table = FunctionTable::standard();
        for name in [
            "+", "-", "*", "/", "^", "neg", "=", "sin", "cos", "tan", "asin", "acos", "atan", "sqrt", "abs", "ln",
            "log", "exp", "floor", "ceil", "round", "min", "max", "point", "line", "arc", "circle", "perp",
            "parallel", "polygon", "spline", "pair", "fill", "angle", "dist", "intersect", "x", "y", "vertex",
            "start", "end", "mid", "rotate", "translate", "dilate", "reflect", "project", "group", "repeat",
            "part", "reverse", "trace", "and", "or", "diff", "xor", "hide", "show", "fade",
        ] {
            assert!(table.contains(name), "{name} is not registered");
        }
    }
}
