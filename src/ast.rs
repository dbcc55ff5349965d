//! Typed expression tree
//!
//! An [`Expression`] is built bottom-up from a parser [`crate::Node`] by the
//! [`crate::registry::FunctionTable`] and resolved against an
//! [`crate::eval::ExpressionContext`] in a separate pass.

use std::cell::OnceCell;

use crate::clip::ClipOp;
use crate::errors::ResolveError;
use crate::eval::{ExpressionContext, TransformBinding, Value, resolve_statement};

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Built-in numeric functions. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Abs,
    Ln,
    Log,
    Exp,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

impl MathFn {
    pub fn name(self) -> &'static str {
        match self {
            MathFn::Sin => "sin",
            MathFn::Cos => "cos",
            MathFn::Tan => "tan",
            MathFn::Asin => "asin",
            MathFn::Acos => "acos",
            MathFn::Atan => "atan",
            MathFn::Sqrt => "sqrt",
            MathFn::Abs => "abs",
            MathFn::Ln => "ln",
            MathFn::Log => "log",
            MathFn::Exp => "exp",
            MathFn::Floor => "floor",
            MathFn::Ceil => "ceil",
            MathFn::Round => "round",
            MathFn::Min => "min",
            MathFn::Max => "max",
        }
    }
}

/// What an effect statement does to its target's output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    Hide,
    Show,
    Fade,
}

type Child = Box<Expression>;

/// The tagged expression variants.
#[derive(Debug, Clone)]
pub enum ExprKind {
    // Scalars
    Number(f64),
    Variable(String),
    Binary {
        op: BinaryOp,
        lhs: Child,
        rhs: Child,
    },
    Neg(Child),
    Math {
        func: MathFn,
        args: Vec<Expression>,
    },

    // Binding
    Assign {
        name: String,
        value: Child,
    },

    // Constructors
    Point(Child, Child),
    Line(Child, Child),
    Arc {
        center: Child,
        from: Child,
        sweep: Child,
    },
    Circle {
        center: Child,
        radius: Child,
    },
    Perp {
        line: Child,
        through: Child,
    },
    Parallel {
        line: Child,
        through: Child,
    },
    Polygon(Vec<Expression>),
    Spline(Vec<Expression>),
    Pair(Child, Child),
    Fill(Child),

    // Measurements and queries
    Angle(Child, Child, Child),
    Dist(Child, Child),
    Intersect(Child, Child),
    X(Child),
    Y(Child),
    Vertex {
        shape: Child,
        index: Child,
    },
    Start(Child),
    End(Child),
    Mid(Child),

    // Transforms
    Rotate {
        target: Child,
        degrees: Child,
        about: Option<Child>,
    },
    Translate {
        target: Child,
        by: Child,
    },
    Dilate {
        target: Child,
        scale: Child,
        about: Option<Child>,
    },
    /// Mirror line given as one line or two points
    Reflect {
        target: Child,
        mirror: Vec<Expression>,
    },
    Project {
        target: Child,
        onto: Vec<Expression>,
    },

    // Composition
    Group(Vec<Expression>),
    Repeat {
        transform: Child,
        count: Child,
    },
    Part {
        target: Child,
        from: Child,
        to: Child,
    },
    Reverse(Child),
    Trace(Child),

    // Boolean
    Boolean {
        op: ClipOp,
        lhs: Child,
        rhs: Child,
    },

    // Effects
    Effect {
        kind: EffectKind,
        target: String,
        opacity: Option<Child>,
    },
}

impl ExprKind {
    /// Short name used in diagnostics and compile errors
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Number(_) => "number",
            ExprKind::Variable(_) => "variable",
            ExprKind::Binary { .. } | ExprKind::Neg(_) => "arithmetic",
            ExprKind::Math { func, .. } => func.name(),
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Point(..) => "point",
            ExprKind::Line(..) => "line",
            ExprKind::Arc { .. } => "arc",
            ExprKind::Circle { .. } => "circle",
            ExprKind::Perp { .. } => "perp",
            ExprKind::Parallel { .. } => "parallel",
            ExprKind::Polygon(_) => "polygon",
            ExprKind::Spline(_) => "spline",
            ExprKind::Pair(..) => "pair",
            ExprKind::Fill(_) => "fill",
            ExprKind::Angle(..) => "angle",
            ExprKind::Dist(..) => "dist",
            ExprKind::Intersect(..) => "intersect",
            ExprKind::X(_) => "x",
            ExprKind::Y(_) => "y",
            ExprKind::Vertex { .. } => "vertex",
            ExprKind::Start(_) => "start",
            ExprKind::End(_) => "end",
            ExprKind::Mid(_) => "mid",
            ExprKind::Rotate { .. } => "rotate",
            ExprKind::Translate { .. } => "translate",
            ExprKind::Dilate { .. } => "dilate",
            ExprKind::Reflect { .. } => "reflect",
            ExprKind::Project { .. } => "project",
            ExprKind::Group(_) => "group",
            ExprKind::Repeat { .. } => "repeat",
            ExprKind::Part { .. } => "part",
            ExprKind::Reverse(_) => "reverse",
            ExprKind::Trace(_) => "trace",
            ExprKind::Boolean { op, .. } => op.name(),
            ExprKind::Effect { kind, .. } => match kind {
                EffectKind::Hide => "hide",
                EffectKind::Show => "show",
                EffectKind::Fade => "fade",
            },
        }
    }

    /// Direct children in argument order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            ExprKind::Number(_) | ExprKind::Variable(_) => vec![],
            ExprKind::Binary { lhs, rhs, .. }
            | ExprKind::Boolean { lhs, rhs, .. }
            | ExprKind::Point(lhs, rhs)
            | ExprKind::Line(lhs, rhs)
            | ExprKind::Pair(lhs, rhs)
            | ExprKind::Dist(lhs, rhs)
            | ExprKind::Intersect(lhs, rhs)
            | ExprKind::Translate {
                target: lhs,
                by: rhs,
            }
            | ExprKind::Circle {
                center: lhs,
                radius: rhs,
            }
            | ExprKind::Perp {
                line: lhs,
                through: rhs,
            }
            | ExprKind::Parallel {
                line: lhs,
                through: rhs,
            }
            | ExprKind::Vertex {
                shape: lhs,
                index: rhs,
            }
            | ExprKind::Repeat {
                transform: lhs,
                count: rhs,
            } => vec![&**lhs, &**rhs],
            ExprKind::Neg(e)
            | ExprKind::Fill(e)
            | ExprKind::X(e)
            | ExprKind::Y(e)
            | ExprKind::Start(e)
            | ExprKind::End(e)
            | ExprKind::Mid(e)
            | ExprKind::Reverse(e)
            | ExprKind::Trace(e)
            | ExprKind::Assign { value: e, .. } => vec![&**e],
            ExprKind::Math { args, .. }
            | ExprKind::Polygon(args)
            | ExprKind::Spline(args)
            | ExprKind::Group(args) => args.iter().collect(),
            ExprKind::Angle(a, b, c)
            | ExprKind::Arc {
                center: a,
                from: b,
                sweep: c,
            }
            | ExprKind::Part {
                target: a,
                from: b,
                to: c,
            } => vec![&**a, &**b, &**c],
            ExprKind::Rotate {
                target,
                degrees: amount,
                about,
            }
            | ExprKind::Dilate {
                target,
                scale: amount,
                about,
            } => {
                let mut v = vec![&**target, &**amount];
                v.extend(about.as_deref());
                v
            }
            ExprKind::Reflect { target, mirror: line }
            | ExprKind::Project { target, onto: line } => {
                std::iter::once(&**target).chain(line.iter()).collect()
            }
            ExprKind::Effect { opacity, .. } => opacity.as_deref().into_iter().collect(),
        }
    }

    pub fn is_transform(&self) -> bool {
        matches!(
            self,
            ExprKind::Rotate { .. }
                | ExprKind::Translate { .. }
                | ExprKind::Dilate { .. }
                | ExprKind::Reflect { .. }
                | ExprKind::Project { .. }
        )
    }
}

/// One node of the typed tree
#[derive(Debug, Clone)]
pub struct Expression {
    /// Caller-assigned line id; only set on top-level statements
    pub id: Option<u32>,
    /// Source text this node was built from
    pub text: String,
    pub kind: ExprKind,
    value: OnceCell<Value>,
    motion: OnceCell<Option<TransformBinding>>,
}

impl Expression {
    pub fn new(kind: ExprKind, text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            kind,
            value: OnceCell::new(),
            motion: OnceCell::new(),
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Resolve once and cache the value. A second call returns the cached
    /// value and re-binds assignments so the context stays consistent.
    pub fn resolve(&self, ctx: &mut ExpressionContext) -> Result<&Value, ResolveError> {
        if let Some(value) = self.value.get() {
            if let ExprKind::Assign { name, .. } = &self.kind {
                ctx.bind(name, value.clone());
                ctx.set_transform(name, self.motion().cloned());
            }
            return Ok(value);
        }
        let (value, motion) = resolve_statement(self, ctx)?;
        self.motion.get_or_init(|| motion);
        Ok(self.value.get_or_init(|| value))
    }

    /// The cached value, if [`Expression::resolve`] has succeeded
    pub fn value(&self) -> Option<&Value> {
        self.value.get()
    }

    /// The transform this statement animates, once resolved
    pub fn motion(&self) -> Option<&TransformBinding> {
        self.motion.get().and_then(Option::as_ref)
    }

    /// Names this expression reads, including effect targets, in first-use
    /// order without duplicates. The name bound by an assignment is not a
    /// reference.
    pub fn references(&self) -> Vec<&str> {
        fn walk<'a>(e: &'a Expression, out: &mut Vec<&'a str>) {
            match &e.kind {
                ExprKind::Variable(name) | ExprKind::Effect { target: name, .. } => {
                    if !out.contains(&name.as_str()) {
                        out.push(name);
                    }
                }
                _ => {}
            }
            for child in e.kind.children() {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Name bound by a top-level assignment
    pub fn binds(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Assign { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The expression with assignments peeled off
    pub fn unwrap_assign(&self) -> &Expression {
        match &self.kind {
            ExprKind::Assign { value, .. } => value.unwrap_assign(),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expression {
        Expression::new(ExprKind::Variable(name.into()), name)
    }

    #[test]
    fn references_are_deduplicated_in_order() {
        let line = Expression::new(ExprKind::Line(Box::new(var("b")), Box::new(var("a"))), "line(b, a)");
        let group = Expression::new(ExprKind::Group(vec![line, var("b")]), "group(line(b, a), b)");
        let assign = Expression::new(
            ExprKind::Assign {
                name: "g".into(),
                value: Box::new(group),
            },
            "g = group(line(b, a), b)",
        );
        assert_eq!(assign.references(), vec!["b", "a"]);
        assert_eq!(assign.binds(), Some("g"));
        assert_eq!(assign.unwrap_assign().kind.name(), "group");
    }

    #[test]
    fn optional_children_are_listed() {
        let rotate = ExprKind::Rotate {
            target: Box::new(var("s")),
            degrees: Box::new(Expression::new(ExprKind::Number(30.0), "30")),
            about: Some(Box::new(var("o"))),
        };
        assert_eq!(rotate.children().len(), 3);
        assert!(rotate.is_transform());
    }
}
