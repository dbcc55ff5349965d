//! Compiler and controller together, observed through a recording renderer

mod common;

use common::{init_logging, run};
use construkt::exec::Call;
use construkt::{Color, Compiler, Controller, Primitive, RecordingRenderer, RenderState, SourceLine};

fn texts(controller: &Controller<RecordingRenderer>) -> Vec<String> {
    controller
        .renderer()
        .live()
        .filter_map(|(_, item)| match &item.primitive {
            Primitive::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn preview_reuses_one_handle_per_primitive() {
    init_logging();
    let mut compiler = Compiler::new();
    let eval = run(&mut compiler, &["line(point(0,0), point(10,0))"]);
    let mut ctl = Controller::new(RecordingRenderer::new());
    ctl.apply(&eval);

    for _ in 0..9 {
        assert!(ctl.tick(0.1));
    }
    assert_eq!(ctl.state(1), Some(RenderState::Preview));
    assert_eq!(ctl.renderer().created(), 1, "preview ticks update in place");

    ctl.tick(0.2);
    assert_eq!(ctl.state(1), Some(RenderState::Committed));
    assert_eq!(ctl.renderer().live_count(), 1);
    let (_, line) = ctl.renderer().live().next().unwrap();
    assert_eq!(
        line.primitive,
        Primitive::Line {
            from: construkt::Pt::ZERO,
            to: construkt::Pt::new(10.0, 0.0)
        }
    );
}

#[test]
fn error_tears_down_later_lines() {
    init_logging();
    let mut compiler = Compiler::new();
    let mut ctl = Controller::new(RecordingRenderer::new());

    let eval = run(&mut compiler, &["a = point(1,2)", "b = point(4,6)", "line(a,b)"]);
    ctl.apply(&eval);
    ctl.draw_all();
    assert_eq!(ctl.renderer().live_count(), 3);

    let eval = run(&mut compiler, &["a = point(1,2)", "b = point(4,6) + q", "line(a,b)"]);
    assert_eq!(eval.error.as_ref().map(|e| e.index), Some(1));
    ctl.apply(&eval);
    assert_eq!(ctl.renderer().live_count(), 1, "only `a` survives");
    assert_eq!(ctl.state(1), Some(RenderState::Committed));
    assert_eq!(ctl.state(2), None);
    assert_eq!(ctl.state(3), None);

    // fixing the line brings the rest back
    let eval = run(&mut compiler, &["a = point(1,2)", "b = point(4,6)", "line(a,b)"]);
    assert!(eval.dirty.is_empty());
    ctl.apply(&eval);
    ctl.draw_all();
    assert_eq!(ctl.renderer().live_count(), 3);
}

#[test]
fn clean_commands_are_not_redrawn() {
    init_logging();
    let mut compiler = Compiler::new();
    let mut ctl = Controller::new(RecordingRenderer::new());
    ctl.apply(&run(&mut compiler, &["a = point(1,2)", "b = point(4,6)", "line(a,b)"]));
    ctl.draw_all();
    ctl.renderer_mut().clear_calls();

    ctl.apply(&run(&mut compiler, &["a = point(1,2)", "b = point(5,6)", "line(a,b)"]));
    ctl.draw_all();
    let removed = ctl
        .renderer()
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::Remove(_)))
        .count();
    assert_eq!(removed, 2, "b and the line are rebuilt");
    assert_eq!(ctl.renderer().created(), 2);
    assert_eq!(ctl.renderer().live_count(), 3);
}

#[test]
fn labels_and_restyling() {
    init_logging();
    let mut compiler = Compiler::new();
    let mut ctl = Controller::new(RecordingRenderer::new());
    let lines = vec![SourceLine::new(1, "a = point(1,2)").with_label(0.0, 1.0)];
    ctl.apply(&compiler.evaluate_script(&lines).unwrap());
    ctl.draw_all();
    assert_eq!(texts(&ctl), vec!["a".to_string()]);
    let label = ctl.context(1).and_then(|cx| cx.label()).unwrap();
    assert_eq!(
        ctl.renderer().get(label).map(|r| &r.primitive),
        Some(&Primitive::Text {
            at: construkt::Pt::new(1.0, 3.0),
            text: "a".into()
        })
    );

    let red = vec![
        SourceLine::new(1, "a = point(1,2)")
            .with_label(0.0, 1.0)
            .with_color(Color::parse("#ff0000")),
    ];
    let eval = compiler.evaluate_script(&red).unwrap();
    assert!(eval.restyled.contains(&1));
    ctl.apply(&eval);
    assert!(ctl.is_idle(), "a restyle does not replay the command");
    for (_, item) in ctl.renderer().live() {
        assert_eq!(item.color, Some(Color::Rgb(255, 0, 0)));
    }
}

#[test]
fn renaming_updates_the_committed_label() {
    init_logging();
    let mut compiler = Compiler::new();
    let mut ctl = Controller::new(RecordingRenderer::new());
    ctl.apply(&compiler.evaluate_script(&[SourceLine::new(1, "a = point(1,2)").with_label(0.0, 1.0)]).unwrap());
    ctl.draw_all();
    assert_eq!(texts(&ctl), vec!["a".to_string()]);

    let eval = compiler.evaluate_script(&[SourceLine::new(1, "b = point(1,2)").with_label(0.0, 1.0)]).unwrap();
    assert!(eval.dirty.is_empty());
    ctl.apply(&eval);
    assert!(ctl.is_idle());
    assert_eq!(texts(&ctl), vec!["b".to_string()]);
    assert_eq!(ctl.renderer().live_count(), 2, "the label is updated in place");
}

#[test]
fn show_after_hide_restores_visibility() {
    init_logging();
    let mut compiler = Compiler::new();
    let mut ctl = Controller::new(RecordingRenderer::new());
    ctl.apply(&run(&mut compiler, &["p = point(0,0)", "hide(p)", "show(p)"]));
    ctl.tick(2.0);
    assert_eq!(ctl.context(1).map(|cx| cx.opacity()), Some(0.0));
    ctl.tick(1.0);
    assert_eq!(ctl.context(1).map(|cx| cx.opacity()), Some(1.0));
    for (_, item) in ctl.renderer().live() {
        assert_eq!(item.opacity, 1.0);
    }
}
