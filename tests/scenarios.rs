//! End-to-end scripts through the compiler

mod common;

use common::{init_logging, run, script};
use construkt::exec::{CommandKind, ShapeCommand};
use construkt::{Compiler, Geometry, Pt, Shape, SourceLine};

fn line_endpoints(kind: &CommandKind) -> (Pt, Pt) {
    match kind {
        CommandKind::Shape(ShapeCommand { shape: Shape::Line(l) }) => (l.start, l.end),
        other => panic!("expected a line command, got {}", other.name()),
    }
}

#[test]
fn points_and_a_line() {
    init_logging();
    let mut compiler = Compiler::new();
    let eval = run(&mut compiler, &["a = point(1,2)", "b = point(4,6)", "line(a,b)"]);
    assert!(eval.is_ok());
    assert_eq!(eval.commands.len(), 3);
    for command in &eval.commands[..2] {
        assert!(
            matches!(&command.kind, CommandKind::Shape(ShapeCommand { shape: Shape::Point(_) })),
            "{} should compile to a point",
            command.text
        );
    }
    assert_eq!(line_endpoints(&eval.commands[2].kind), (Pt::new(1.0, 2.0), Pt::new(4.0, 6.0)));
}

#[test]
fn unchanged_script_is_clean_on_the_second_pass() {
    init_logging();
    let mut compiler = Compiler::new();
    let text = ["a = point(1,2)", "b = point(4,6)", "s = line(a,b)", "rotate(s, 45, a)"];
    let first = run(&mut compiler, &text);
    assert_eq!(first.dirty.len(), 4);
    let second = run(&mut compiler, &text);
    assert!(second.dirty.is_empty(), "dirty on rerun: {:?}", second.dirty);
}

#[test]
fn editing_a_point_dirties_only_its_dependents() {
    init_logging();
    let mut compiler = Compiler::new();
    run(&mut compiler, &["a = point(1,2)", "b = point(4,6)", "line(a,b)"]);
    let eval = run(&mut compiler, &["a = point(1,2)", "b = point(5,6)", "line(a,b)"]);
    assert_eq!(eval.dirty.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(line_endpoints(&eval.commands[2].kind).1, Pt::new(5.0, 6.0));
}

#[test]
fn undefined_variable_stops_the_batch() {
    init_logging();
    let mut compiler = Compiler::new();
    let eval = run(&mut compiler, &["a = point(1,2)", "b = line(a, c)", "point(3,3)"]);
    let error = eval.error.as_ref().expect("the second line fails");
    assert_eq!(error.index, 1);
    assert_eq!(error.expression_id, 2);
    assert_eq!(error.name(), "ResolutionError");
    assert!(error.message().contains('c'), "message: {}", error.message());
    assert_eq!(eval.commands.len(), 1);
    assert!(eval.command(3).is_none());
}

#[test]
fn reflection_and_repeat() {
    init_logging();
    let mut compiler = Compiler::new();
    let eval = run(
        &mut compiler,
        &[
            "tri = polygon(point(0,0), point(2,0), point(0,1))",
            "m = reflect(tri, point(0,0), point(0,1))",
            "r = rotate(tri, 90)",
            "repeat(r, 4)",
        ],
    );
    assert!(eval.is_ok(), "{:?}", eval.error);
    let CommandKind::Transform(reflect) = &eval.commands[1].kind else {
        panic!("reflect should animate");
    };
    assert!((reflect.result.position_index(1).unwrap() - Pt::new(-2.0, 0.0)).length() < 1e-9);
    let CommandKind::Shape(ShapeCommand { shape: Shape::Group(g) }) = &eval.commands[3].kind else {
        panic!("repeat yields a group");
    };
    assert_eq!(g.children.len(), 4);
}

#[test]
fn boolean_difference_leaves_a_hole() {
    init_logging();
    let mut compiler = Compiler::new();
    let eval = run(
        &mut compiler,
        &[
            "outer = polygon(point(0,0), point(4,0), point(4,4), point(0,4))",
            "inner = polygon(point(1,1), point(3,1), point(3,3), point(1,3))",
            "diff(outer, inner)",
        ],
    );
    assert!(eval.is_ok(), "{:?}", eval.error);
    let CommandKind::Shape(ShapeCommand {
        shape: Shape::FilledPolygon(f),
    }) = &eval.commands[2].kind
    else {
        panic!("expected a filled polygon");
    };
    assert_eq!(f.holes.len(), 1);
    assert!((f.area() - 12.0).abs() < 1e-6);
}

#[test]
fn styles_are_copied_from_the_line() {
    init_logging();
    let mut compiler = Compiler::new();
    let mut lines = script(&["a = point(0,0)"]);
    lines.push(SourceLine::new(9, "b = point(1,1)").with_speed(2.0).with_label(0.5, 0.5));
    let eval = compiler.evaluate_script(&lines).unwrap();
    let b = eval.command(9).unwrap();
    assert_eq!(b.style.speed, 2.0);
    assert!(b.style.label);
    assert_eq!(b.style.label_offset, Pt::new(0.5, 0.5));
    assert_eq!(b.label_text(), "b");
}
