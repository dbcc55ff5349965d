//! Expression resolution functions

use crate::ast::{BinaryOp, EffectKind, ExprKind, Expression, MathFn};
use crate::defaults;
use crate::errors::ResolveError;
use crate::shapes::{
    ArcShape, FilledPolygonShape, Geometry, GroupShape, LineShape, PointPairShape, PolygonShape, Shape, SplineShape,
    TransformOp, Transformable,
};
use crate::types::{EPSILON, Pt, Ratio, finite, heading, polar};

use super::context::{CoordinateSystem, ExpressionContext, TransformBinding};
use super::value::{Effect, Value};
use super::{boolean, intersect};

/// Resolve a top-level statement, also returning the transform it
/// performs when it is one (directly, or through an assignment).
pub fn resolve_statement(
    expr: &Expression,
    ctx: &mut ExpressionContext,
) -> Result<(Value, Option<TransformBinding>), ResolveError> {
    match &expr.kind {
        ExprKind::Assign { name, .. } => {
            let value = resolve(expr, ctx)?;
            Ok((value, ctx.transform(name).cloned()))
        }
        kind if kind.is_transform() => {
            let binding = transform_binding(expr, ctx)?;
            Ok((Value::Shape(binding.result()), Some(binding)))
        }
        _ => Ok((resolve(expr, ctx)?, None)),
    }
}

/// Resolve `expr` against `ctx`. Assignments bind into `ctx` as a side
/// effect; everything else only reads it. Fails on the first error.
pub fn resolve(expr: &Expression, ctx: &mut ExpressionContext) -> Result<Value, ResolveError> {
    let value = match &expr.kind {
        ExprKind::Number(n) => Value::Number(checked(*n, "number")?),
        ExprKind::Variable(name) => ctx.get(name).cloned().ok_or_else(|| ResolveError::UndefinedVariable {
            name: name.clone(),
        })?,
        ExprKind::Binary { op, lhs, rhs } => {
            let l = resolve(lhs, ctx)?;
            let r = resolve(rhs, ctx)?;
            binary(*op, l, r)?
        }
        ExprKind::Neg(e) => match resolve(e, ctx)? {
            Value::Number(n) => Value::Number(-n),
            Value::Shape(Shape::Point(p)) => Value::point(-p.at),
            other => return Err(mismatch("number or point", &other)),
        },
        ExprKind::Math { func, args } => {
            let args = args.iter().map(|a| number(a, ctx)).collect::<Result<Vec<_>, _>>()?;
            Value::Number(math(*func, &args)?)
        }
        ExprKind::Assign { name, value } => {
            let (resolved, binding) = resolve_statement(value, ctx)?;
            let binding = match (&value.kind, binding) {
                (ExprKind::Variable(source), None) => ctx.transform(source).cloned(),
                (_, binding) => binding,
            };
            crate::log::debug!(var = %name, kind = resolved.type_name(), "bind");
            ctx.bind(name, resolved.clone());
            ctx.set_transform(name, binding);
            resolved
        }

        ExprKind::Point(a, b) => {
            let (a, b) = (number(a, ctx)?, number(b, ctx)?);
            match ctx.coordinates() {
                CoordinateSystem::Cartesian => Value::point(Pt::new(a, b)),
                CoordinateSystem::Polar => Value::point(polar(Pt::ZERO, a, b)),
            }
        }
        ExprKind::Line(a, b) => shaped(LineShape::new(point(a, ctx)?, point(b, ctx)?)),
        ExprKind::Arc { center, from, sweep } => {
            let c = point(center, ctx)?;
            let f = point(from, ctx)?;
            let sweep = number(sweep, ctx)?;
            let radius = c.distance(f);
            if radius <= EPSILON {
                return Err(ResolveError::Degenerate { what: "arc of radius 0" });
            }
            shaped(ArcShape::new(c, radius, heading(c, f), sweep))
        }
        ExprKind::Circle { center, radius } => {
            let c = point(center, ctx)?;
            let r = number(radius, ctx)?;
            if r <= EPSILON {
                return Err(ResolveError::Degenerate {
                    what: "circle of non-positive radius",
                });
            }
            shaped(ArcShape::circle(c, r))
        }
        ExprKind::Perp { line, through } => {
            let l = line_arg(line, ctx)?;
            let p = point(through, ctx)?;
            let f = crate::types::foot(p, l.start, l.end).ok_or(ResolveError::Degenerate {
                what: "zero-length line",
            })?;
            if p.distance(f) <= EPSILON {
                shaped(LineShape::new(p, p + l.vector().perp()))
            } else {
                shaped(LineShape::new(p, f))
            }
        }
        ExprKind::Parallel { line, through } => {
            let l = line_arg(line, ctx)?;
            let p = point(through, ctx)?;
            shaped(LineShape::new(p, p + l.vector()))
        }
        ExprKind::Polygon(args) => shaped(PolygonShape::closed(points(args, ctx)?)),
        ExprKind::Spline(args) => shaped(SplineShape::new(points(args, ctx)?)),
        ExprKind::Pair(a, b) => shaped(PointPairShape::new(point(a, ctx)?, point(b, ctx)?)),
        ExprKind::Fill(e) => match shape(e, ctx)? {
            Shape::Polygon(p) if p.closed => shaped(FilledPolygonShape::new(p.vertices, vec![])),
            Shape::Arc(arc) => shaped(FilledPolygonShape::new(arc.ring(defaults::ARC_SEGMENTS), vec![])),
            filled @ Shape::FilledPolygon(_) => filled.into(),
            other => {
                return Err(ResolveError::TypeMismatch {
                    expected: "closed polygon or arc",
                    got: other.kind().name(),
                });
            }
        },

        ExprKind::Angle(a, vertex, c) => {
            let (a, v, c) = (point(a, ctx)?, point(vertex, ctx)?, point(c, ctx)?);
            if a.distance(v) <= EPSILON || c.distance(v) <= EPSILON {
                return Err(ResolveError::Degenerate {
                    what: "angle arm of length 0",
                });
            }
            Value::Number((heading(v, c) - heading(v, a)).rem_euclid(360.0))
        }
        ExprKind::Dist(a, b) => Value::Number(point(a, ctx)?.distance(point(b, ctx)?)),
        ExprKind::Intersect(a, b) => {
            let a = shape(a, ctx)?;
            let b = shape(b, ctx)?;
            intersect::intersect(&a, &b)?.into()
        }
        ExprKind::X(e) => Value::Number(point(e, ctx)?.x),
        ExprKind::Y(e) => Value::Number(point(e, ctx)?.y),
        ExprKind::Vertex { shape: s, index } => {
            let s = shape(s, ctx)?;
            let raw = number(index, ctx)?;
            let len = s.control_points().len();
            let out_of_range = || ResolveError::IndexOutOfRange {
                index: raw as i64,
                len,
            };
            if raw < 0.0 || raw.fract() != 0.0 {
                return Err(out_of_range());
            }
            Value::point(s.position_index(raw as usize).ok_or_else(out_of_range)?)
        }
        ExprKind::Start(e) => Value::point(shape(e, ctx)?.start_value()),
        ExprKind::End(e) => Value::point(shape(e, ctx)?.end_value()),
        ExprKind::Mid(e) => match shape(e, ctx)? {
            Shape::Line(l) => Value::point(l.midpoint()),
            other => Value::point(other.part(0.0, 0.5).end_value()),
        },

        ExprKind::Rotate { .. }
        | ExprKind::Translate { .. }
        | ExprKind::Dilate { .. }
        | ExprKind::Reflect { .. }
        | ExprKind::Project { .. } => Value::Shape(transform_binding(expr, ctx)?.result()),

        ExprKind::Group(args) => {
            let children = args.iter().map(|a| shape(a, ctx)).collect::<Result<Vec<_>, _>>()?;
            shaped(GroupShape::new(children))
        }
        ExprKind::Repeat { transform, count } => {
            let binding = transform_binding(transform, ctx)?;
            let n = number(count, ctx)?;
            if n < 1.0 || n.fract() != 0.0 || n > defaults::MAX_REPEAT as f64 {
                return Err(ResolveError::InvalidNumeric {
                    context: "repeat count",
                });
            }
            let mut current = binding.source;
            let mut children = Vec::with_capacity(n as usize);
            for _ in 0..n as usize {
                current = binding.op.apply(&current, 1.0);
                children.push(current.clone());
            }
            shaped(GroupShape::new(children))
        }
        ExprKind::Part { target, from, to } => {
            let s = shape(target, ctx)?;
            let from = ratio(from, ctx, "part")?;
            let to = ratio(to, ctx, "part")?;
            s.part(from.raw(), to.raw()).into()
        }
        ExprKind::Reverse(e) => shape(e, ctx)?.reverse().into(),
        ExprKind::Trace(e) => trace(&transform_binding(e, ctx)?)?,

        ExprKind::Boolean { op, lhs, rhs } => {
            let a = shape(lhs, ctx)?;
            let b = shape(rhs, ctx)?;
            boolean::combine(*op, &a, &b)?.into()
        }

        ExprKind::Effect { kind, target, opacity } => {
            if ctx.get(target).is_none() {
                return Err(ResolveError::UndefinedVariable { name: target.clone() });
            }
            let opacity = match (kind, opacity) {
                (EffectKind::Hide, _) => 0.0,
                (EffectKind::Show, _) => 1.0,
                (EffectKind::Fade, Some(o)) => ratio(o, ctx, "fade")?.raw(),
                (EffectKind::Fade, None) => defaults::FADE_OPACITY,
            };
            Value::Effect(Effect {
                kind: *kind,
                target: target.clone(),
                opacity,
            })
        }
    };
    Ok(value)
}

/// Follow `expr` to the transform it stands for: a transform call, or a
/// name that was bound to one (possibly through other names).
fn transform_binding(expr: &Expression, ctx: &mut ExpressionContext) -> Result<TransformBinding, ResolveError> {
    let op = match &expr.kind {
        ExprKind::Variable(name) => {
            if ctx.get(name).is_none() {
                return Err(ResolveError::UndefinedVariable { name: name.clone() });
            }
            return ctx.transform(name).cloned().ok_or_else(|| ResolveError::NoTransformable {
                name: name.clone(),
            });
        }
        ExprKind::Assign { value, .. } => return transform_binding(value, ctx),
        ExprKind::Rotate { degrees, about, .. } => TransformOp::Rotate {
            degrees: number(degrees, ctx)?,
            about: optional_point(about.as_deref(), ctx)?,
        },
        ExprKind::Translate { by, .. } => TransformOp::Translate {
            vector: match resolve(by, ctx)? {
                Value::Shape(Shape::Point(p)) => p.at,
                Value::Shape(Shape::Line(l)) => l.vector(),
                other => return Err(mismatch("point or line", &other)),
            },
        },
        ExprKind::Dilate { scale, about, .. } => TransformOp::Dilate {
            scale: number(scale, ctx)?,
            about: optional_point(about.as_deref(), ctx)?,
        },
        ExprKind::Reflect { mirror, .. } => {
            let (p1, p2) = mirror_line(mirror, ctx)?;
            TransformOp::Reflect { p1, p2 }
        }
        ExprKind::Project { onto, .. } => {
            let (p1, p2) = mirror_line(onto, ctx)?;
            TransformOp::Project { p1, p2 }
        }
        _ => {
            return Err(ResolveError::NoTransformable {
                name: expr.text.clone(),
            });
        }
    };
    let target = match &expr.kind {
        ExprKind::Rotate { target, .. }
        | ExprKind::Translate { target, .. }
        | ExprKind::Dilate { target, .. }
        | ExprKind::Reflect { target, .. }
        | ExprKind::Project { target, .. } => target,
        _ => {
            return Err(ResolveError::NoTransformable {
                name: expr.text.clone(),
            });
        }
    };
    let source = match resolve(target, ctx)? {
        Value::Shape(s) => s,
        _ => {
            return Err(ResolveError::NoTransformable {
                name: target.text.clone(),
            });
        }
    };
    Ok(TransformBinding { source, op })
}

/// Locus of every defining point of the source while the transform runs
/// from ratio 0 to 1. Points that do not move are skipped.
fn trace(binding: &TransformBinding) -> Result<Value, ResolveError> {
    let steps = defaults::TRACE_SAMPLES;
    let mut paths: Vec<Shape> = Vec::new();
    for p in binding.source.control_points() {
        let start = crate::shapes::PointShape::new(p);
        let locus: Vec<Pt> = (0..=steps)
            .map(|i| binding.op.apply(&start, i as f64 / steps as f64).at)
            .collect();
        if crate::types::path_length(&locus, false) > EPSILON {
            paths.push(PolygonShape::open(locus).into());
        }
    }
    match paths.len() {
        0 => Err(ResolveError::Degenerate {
            what: "trace with no moving points",
        }),
        1 => Ok(paths.remove(0).into()),
        _ => Ok(shaped(GroupShape::new(paths))),
    }
}

fn binary(op: BinaryOp, l: Value, r: Value) -> Result<Value, ResolveError> {
    use Value::Number as N;
    let value = match (op, &l, &r) {
        (BinaryOp::Div, _, N(b)) if *b == 0.0 => return Err(ResolveError::DivisionByZero),
        (BinaryOp::Add, N(a), N(b)) => N(a + b),
        (BinaryOp::Sub, N(a), N(b)) => N(a - b),
        (BinaryOp::Mul, N(a), N(b)) => N(a * b),
        (BinaryOp::Div, N(a), N(b)) => N(a / b),
        (BinaryOp::Pow, N(a), N(b)) => N(a.powf(*b)),
        _ => {
            // Vector arithmetic on points
            let (p, q) = (l.as_shape().and_then(Shape::as_point), r.as_shape().and_then(Shape::as_point));
            match (op, p, q, &l, &r) {
                (BinaryOp::Add, Some(p), Some(q), ..) => Value::point(p + q),
                (BinaryOp::Sub, Some(p), Some(q), ..) => Value::point(p - q),
                (BinaryOp::Mul, Some(p), None, _, N(k)) | (BinaryOp::Mul, None, Some(p), N(k), _) => {
                    Value::point(p * *k)
                }
                (BinaryOp::Div, Some(p), None, _, N(k)) => Value::point(p / *k),
                _ => {
                    let offending = if matches!(l, N(_)) { &r } else { &l };
                    return Err(mismatch("number", offending));
                }
            }
        }
    };
    match &value {
        N(n) => {
            checked(*n, op.symbol())?;
        }
        Value::Shape(Shape::Point(p)) => {
            checked(p.at.x, op.symbol())?;
            checked(p.at.y, op.symbol())?;
        }
        _ => {}
    }
    Ok(value)
}

fn math(func: MathFn, args: &[f64]) -> Result<f64, ResolveError> {
    let x = args.first().copied().ok_or_else(|| ResolveError::Arity {
        function: func.name().to_string(),
        expected: "at least 1".to_string(),
        got: 0,
    })?;
    let y = match func {
        MathFn::Sin => x.to_radians().sin(),
        MathFn::Cos => x.to_radians().cos(),
        MathFn::Tan => x.to_radians().tan(),
        MathFn::Asin => x.asin().to_degrees(),
        MathFn::Acos => x.acos().to_degrees(),
        MathFn::Atan => x.atan().to_degrees(),
        MathFn::Sqrt => x.sqrt(),
        MathFn::Abs => x.abs(),
        MathFn::Ln => x.ln(),
        MathFn::Log => x.log10(),
        MathFn::Exp => x.exp(),
        MathFn::Floor => x.floor(),
        MathFn::Ceil => x.ceil(),
        MathFn::Round => x.round(),
        MathFn::Min => args.iter().copied().fold(x, f64::min),
        MathFn::Max => args.iter().copied().fold(x, f64::max),
    };
    checked(y, func.name())
}

// ============================================================================
// Argument helpers
// ============================================================================

fn shaped(s: impl Into<Shape>) -> Value {
    Value::Shape(s.into())
}

fn checked(v: f64, context: &'static str) -> Result<f64, ResolveError> {
    finite(v).map_err(|_| ResolveError::InvalidNumeric { context })
}

fn mismatch(expected: &'static str, got: &Value) -> ResolveError {
    ResolveError::TypeMismatch {
        expected,
        got: got.type_name(),
    }
}

fn number(expr: &Expression, ctx: &mut ExpressionContext) -> Result<f64, ResolveError> {
    match resolve(expr, ctx)? {
        Value::Number(n) => Ok(n),
        other => Err(mismatch("number", &other)),
    }
}

fn ratio(expr: &Expression, ctx: &mut ExpressionContext, context: &'static str) -> Result<Ratio, ResolveError> {
    Ratio::try_new(number(expr, ctx)?).map_err(|_| ResolveError::InvalidNumeric { context })
}

fn point(expr: &Expression, ctx: &mut ExpressionContext) -> Result<Pt, ResolveError> {
    match resolve(expr, ctx)? {
        Value::Shape(Shape::Point(p)) => Ok(p.at),
        other => Err(mismatch("point", &other)),
    }
}

fn optional_point(expr: Option<&Expression>, ctx: &mut ExpressionContext) -> Result<Pt, ResolveError> {
    expr.map_or(Ok(Pt::ZERO), |e| point(e, ctx))
}

fn points(args: &[Expression], ctx: &mut ExpressionContext) -> Result<Vec<Pt>, ResolveError> {
    args.iter().map(|a| point(a, ctx)).collect()
}

fn shape(expr: &Expression, ctx: &mut ExpressionContext) -> Result<Shape, ResolveError> {
    match resolve(expr, ctx)? {
        Value::Shape(s) => Ok(s),
        other => Err(mismatch("shape", &other)),
    }
}

fn line_arg(expr: &Expression, ctx: &mut ExpressionContext) -> Result<LineShape, ResolveError> {
    match resolve(expr, ctx)? {
        Value::Shape(Shape::Line(l)) => Ok(l),
        other => Err(mismatch("line", &other)),
    }
}

/// A line given either as one line argument or as two points.
fn mirror_line(args: &[Expression], ctx: &mut ExpressionContext) -> Result<(Pt, Pt), ResolveError> {
    let (p1, p2) = match args {
        [line] => {
            let l = line_arg(line, ctx)?;
            (l.start, l.end)
        }
        [a, b] => (point(a, ctx)?, point(b, ctx)?),
        _ => {
            return Err(ResolveError::Arity {
                function: "reflect/project".to_string(),
                expected: "a line or two points".to_string(),
                got: args.len(),
            });
        }
    };
    if p1.distance(p2) <= EPSILON {
        return Err(ResolveError::Degenerate {
            what: "zero-length mirror line",
        });
    }
    Ok((p1, p2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FunctionTable;
    use glam::DVec2;

    fn eval_in(ctx: &mut ExpressionContext, text: &str) -> Result<Value, ResolveError> {
        let node = crate::parse::parse(text).unwrap();
        let expr = FunctionTable::standard().build(&node, text)?;
        resolve(&expr, ctx)
    }

    fn eval(text: &str) -> Result<Value, ResolveError> {
        eval_in(&mut ExpressionContext::default(), text)
    }

    fn num(text: &str) -> f64 {
        match eval(text).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected a number, got {other:?}"),
        }
    }

    fn pt(v: Value) -> Pt {
        v.as_shape().and_then(Shape::as_point).expect("a point")
    }

    #[test]
    fn arithmetic_and_math() {
        assert_eq!(num("1 + 2 * 3"), 7.0);
        assert_eq!(num("2 ^ 3 ^ 2"), 512.0);
        assert!((num("sin(30)") - 0.5).abs() < 1e-12);
        assert!((num("atan(1)") - 45.0).abs() < 1e-12);
        assert_eq!(num("max(1, 7, 3)"), 7.0);
        assert_eq!(num("min(4, -2)"), -2.0);
        assert_eq!(num("-pi / pi"), -1.0);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(matches!(eval("1 / (2 - 2)"), Err(ResolveError::DivisionByZero)));
        assert!(matches!(eval("sqrt(-1)"), Err(ResolveError::InvalidNumeric { .. })));
    }

    #[test]
    fn points_support_vector_arithmetic() {
        assert_eq!(pt(eval("point(1, 2) + point(3, 4) * 2").unwrap()), DVec2::new(7.0, 10.0));
        assert!(matches!(eval("point(1, 2) + 1"), Err(ResolveError::TypeMismatch { .. })));
    }

    #[test]
    fn polar_coordinates() {
        let mut ctx = ExpressionContext::new(CoordinateSystem::Polar);
        let p = pt(eval_in(&mut ctx, "point(2, 90)").unwrap());
        assert!(p.distance(DVec2::new(0.0, 2.0)) < 1e-12);
    }

    #[test]
    fn assignment_binds_and_forwards() {
        let mut ctx = ExpressionContext::default();
        let v = eval_in(&mut ctx, "a = point(1, 2)").unwrap();
        assert_eq!(ctx.get("a"), Some(&v));
        assert_eq!(num_in(&mut ctx, "x(a) + y(a)"), 3.0);
    }

    fn num_in(ctx: &mut ExpressionContext, text: &str) -> f64 {
        match eval_in(ctx, text).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected a number, got {other:?}"),
        }
    }

    #[test]
    fn undefined_variable() {
        let err = eval("line(point(0, 0), c)").unwrap_err();
        assert!(matches!(err, ResolveError::UndefinedVariable { ref name } if name == "c"));
    }

    #[test]
    fn perp_and_parallel() {
        let mut ctx = ExpressionContext::default();
        eval_in(&mut ctx, "l = line(point(0, 0), point(4, 0))").unwrap();
        let Value::Shape(Shape::Line(perp)) = eval_in(&mut ctx, "perp(l, point(1, 3))").unwrap() else {
            panic!("expected a line");
        };
        assert_eq!((perp.start, perp.end), (DVec2::new(1.0, 3.0), DVec2::new(1.0, 0.0)));

        let Value::Shape(Shape::Line(on)) = eval_in(&mut ctx, "perp(l, point(2, 0))").unwrap() else {
            panic!("expected a line");
        };
        assert_eq!(on.end, DVec2::new(2.0, 4.0));

        let Value::Shape(Shape::Line(par)) = eval_in(&mut ctx, "parallel(l, point(0, 1))").unwrap() else {
            panic!("expected a line");
        };
        assert_eq!(par.end, DVec2::new(4.0, 1.0));
    }

    #[test]
    fn angle_is_counter_clockwise() {
        assert!((num("angle(point(1, 0), origin, point(0, 1))") - 90.0).abs() < 1e-9);
        assert!((num("angle(point(0, 1), origin, point(1, 0))") - 270.0).abs() < 1e-9);
    }

    #[test]
    fn transforms_default_about_origin() {
        let p = pt(eval("rotate(point(1, 0), 90)").unwrap());
        assert!(p.distance(DVec2::new(0.0, 1.0)) < 1e-12);
        let p = pt(eval("dilate(point(1, 1), 3, point(1, 0))").unwrap());
        assert_eq!(p, DVec2::new(1.0, 3.0));
        let p = pt(eval("translate(point(1, 1), line(point(0, 0), point(2, -1)))").unwrap());
        assert_eq!(p, DVec2::new(3.0, 0.0));
        let p = pt(eval("reflect(point(1, 2), point(0, 0), point(1, 0))").unwrap());
        assert_eq!(p, DVec2::new(1.0, -2.0));
        let p = pt(eval("project(point(1, 2), line(point(0, 0), point(1, 0)))").unwrap());
        assert_eq!(p, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn transform_of_a_number_has_no_transformable() {
        let mut ctx = ExpressionContext::default();
        eval_in(&mut ctx, "k = 3").unwrap();
        let err = eval_in(&mut ctx, "rotate(k, 30)").unwrap_err();
        assert!(matches!(err, ResolveError::NoTransformable { ref name } if name == "k"));
        let err = eval_in(&mut ctx, "repeat(k, 3)").unwrap_err();
        assert!(matches!(err, ResolveError::NoTransformable { .. }));
    }

    #[test]
    fn repeat_follows_named_transforms() {
        let mut ctx = ExpressionContext::default();
        eval_in(&mut ctx, "t = translate(point(0, 0), point(1, 0))").unwrap();
        eval_in(&mut ctx, "u = t").unwrap();
        let Value::Shape(Shape::Group(g)) = eval_in(&mut ctx, "repeat(u, 3)").unwrap() else {
            panic!("expected a group");
        };
        let xs: Vec<f64> = g.children.iter().map(|c| c.start_value().x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn repeat_count_is_bounded() {
        let mut ctx = ExpressionContext::default();
        eval_in(&mut ctx, "t = translate(point(0, 0), point(1, 0))").unwrap();
        for count in ["1e18", "0", "2.5"] {
            let err = eval_in(&mut ctx, &format!("repeat(t, {count})")).unwrap_err();
            assert!(
                matches!(err, ResolveError::InvalidNumeric { context: "repeat count" }),
                "{count}: {err:?}"
            );
        }
        let limit = format!("repeat(t, {})", defaults::MAX_REPEAT);
        let Value::Shape(Shape::Group(g)) = eval_in(&mut ctx, &limit).unwrap() else {
            panic!("expected a group");
        };
        assert_eq!(g.children.len(), defaults::MAX_REPEAT);
    }

    #[test]
    fn trace_of_a_rotation_is_an_arc_like_path() {
        let Value::Shape(Shape::Polygon(path)) = eval("trace(rotate(point(1, 0), 90))").unwrap() else {
            panic!("expected an open polygon");
        };
        assert!(!path.closed);
        assert_eq!(path.vertices.len(), defaults::TRACE_SAMPLES + 1);
        assert!(path.vertices.iter().all(|v| (v.length() - 1.0).abs() < 1e-9));
        assert!(matches!(
            eval("trace(rotate(point(0, 0), 90))"),
            Err(ResolveError::Degenerate { .. })
        ));
    }

    #[test]
    fn vertex_and_queries() {
        let mut ctx = ExpressionContext::default();
        eval_in(&mut ctx, "tri = polygon(point(0, 0), point(4, 0), point(0, 3))").unwrap();
        assert_eq!(pt(eval_in(&mut ctx, "vertex(tri, 1)").unwrap()), DVec2::new(4.0, 0.0));
        assert!(matches!(
            eval_in(&mut ctx, "vertex(tri, 3)"),
            Err(ResolveError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(pt(eval_in(&mut ctx, "mid(line(point(0, 0), point(2, 2)))").unwrap()), DVec2::ONE);
        assert_eq!(num_in(&mut ctx, "dist(vertex(tri, 1), vertex(tri, 2))"), 5.0);
    }

    #[test]
    fn effects_need_a_bound_target() {
        let mut ctx = ExpressionContext::default();
        assert!(matches!(eval_in(&mut ctx, "hide(a)"), Err(ResolveError::UndefinedVariable { .. })));
        eval_in(&mut ctx, "a = point(1, 1)").unwrap();
        let Value::Effect(e) = eval_in(&mut ctx, "fade(a)").unwrap() else {
            panic!("expected an effect");
        };
        assert_eq!(e.opacity, defaults::FADE_OPACITY);
        assert!(matches!(eval_in(&mut ctx, "fade(a, 2)"), Err(ResolveError::InvalidNumeric { .. })));
    }

    #[test]
    fn boolean_ops_resolve_through_the_clipper() {
        let v = eval("and(polygon(point(0,0), point(2,0), point(2,2), point(0,2)), circle(point(2, 2), 1))").unwrap();
        let Value::Shape(Shape::FilledPolygon(f)) = v else {
            panic!("expected a filled polygon");
        };
        // quarter of a 64-gon circle
        assert!((f.area() - std::f64::consts::PI / 4.0).abs() < 0.01);
    }
}
