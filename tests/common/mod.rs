//! Shared helpers for the scenario tests

#![allow(dead_code)]

use std::sync::Once;

use construkt::{Compiler, Evaluation, SourceLine};

static INIT: Once = Once::new();

/// Route `RUST_LOG` output to the test harness once per binary.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Lines numbered from 1 in order.
pub fn script(texts: &[&str]) -> Vec<SourceLine> {
    texts
        .iter()
        .zip(1..)
        .map(|(text, id)| SourceLine::new(id, *text))
        .collect()
}

pub fn run(compiler: &mut Compiler, texts: &[&str]) -> Evaluation {
    compiler
        .evaluate_script(&script(texts))
        .expect("clipping defect")
}
