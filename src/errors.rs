//! Error types with rich diagnostics using miette
//!
//! Four families, matching the stages a statement passes through:
//! parsing, resolution, command compilation and polygon clipping.
//! The first three are user errors and are handed back to the caller as
//! data ([`ScriptError`]); [`ClipError`] signals a defect in the clipper and
//! is propagated as `Err`.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// Parse Errors
// ============================================================================

/// Malformed statement text, reported by the grammar.
#[derive(Error, Diagnostic, Debug)]
#[error("syntax error: {message}")]
#[diagnostic(code(construkt::parse::syntax))]
pub struct ParseError {
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    pub fn new(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        Self {
            message: message.into(),
            src: NamedSource::new("<statement>", source.to_string()),
            span: (offset, 0).into(),
        }
    }
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// Errors raised while building or resolving an expression
#[derive(Error, Diagnostic, Debug)]
pub enum ResolveError {
    #[error("undefined variable: {name}")]
    #[diagnostic(
        code(construkt::resolve::undefined_variable),
        help("assign `{name}` on an earlier line; forward references are not supported")
    )]
    UndefinedVariable { name: String },

    #[error("unknown function: {name}")]
    #[diagnostic(code(construkt::resolve::unknown_function))]
    UnknownFunction { name: String },

    #[error("{function} expects {expected} argument(s), got {got}")]
    #[diagnostic(code(construkt::resolve::arity))]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("type mismatch: expected {expected}, got {got}")]
    #[diagnostic(code(construkt::resolve::type_mismatch))]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("division by zero")]
    #[diagnostic(code(construkt::resolve::division_by_zero))]
    DivisionByZero,

    #[error("invalid numeric value in {context}")]
    #[diagnostic(
        code(construkt::resolve::invalid_numeric),
        help("the result is NaN or infinite")
    )]
    InvalidNumeric { context: &'static str },

    #[error("no transformable object found for `{name}`")]
    #[diagnostic(code(construkt::resolve::no_transformable))]
    NoTransformable { name: String },

    #[error("the objects do not intersect")]
    #[diagnostic(code(construkt::resolve::no_intersection))]
    NoIntersection,

    #[error("degenerate geometry: {what}")]
    #[diagnostic(code(construkt::resolve::degenerate))]
    Degenerate { what: &'static str },

    #[error("index {index} out of range for {len} position(s)")]
    #[diagnostic(code(construkt::resolve::index_out_of_range))]
    IndexOutOfRange { index: i64, len: usize },

    #[error("left side of `=` must be a name")]
    #[diagnostic(code(construkt::resolve::assignment_target))]
    AssignmentTarget,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Clip(#[from] ClipError),
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors from mapping a resolved expression to a command
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("no such command: {kind}")]
    #[diagnostic(
        code(construkt::compile::no_such_command),
        help("assign the value to a name, or use it inside a drawable expression")
    )]
    NoSuchCommand { kind: &'static str },

    #[error("expression `{text}` was compiled before it was resolved")]
    #[diagnostic(code(construkt::compile::unresolved))]
    Unresolved { text: String },

    #[error("expression id {id} is used by more than one line")]
    #[diagnostic(code(construkt::compile::duplicate_id))]
    DuplicateId { id: u32 },
}

// ============================================================================
// Clipping Errors
// ============================================================================

/// Internal invariant violations inside the scan-line clipper.
///
/// These are defect signals, not user errors.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ClipError {
    #[error("coordinate {value} is outside the clipping range")]
    #[diagnostic(code(construkt::clip::out_of_range))]
    CoordinateOutOfRange { value: f64 },

    #[error("intersections could not be ordered between adjacent edges")]
    #[diagnostic(code(construkt::clip::intersection_order))]
    IntersectionOrder,

    #[error("edge advanced past the end of its bound")]
    #[diagnostic(code(construkt::clip::bound_overrun))]
    BoundOverrun,

    #[error("unpaired maximum at y = {y}")]
    #[diagnostic(code(construkt::clip::maxima))]
    Maxima { y: i64 },
}

// ============================================================================
// Script-level error report
// ============================================================================

/// The typed failure of one statement.
#[derive(Error, Diagnostic, Debug)]
pub enum StatementError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Compile(#[from] CompileError),
}

/// A failing line as reported back to the editor.
#[derive(Error, Diagnostic, Debug)]
#[error("line {index} (expression {expression_id}): {error}")]
pub struct ScriptError {
    /// Position of the failing line in the submitted batch
    pub index: usize,
    /// Caller-assigned id of the failing line
    pub expression_id: u32,
    #[source]
    #[diagnostic_source]
    pub error: StatementError,
}

impl ScriptError {
    /// Short category name: `ParseError`, `ResolutionError` or
    /// `CommandCompilationError`.
    pub fn name(&self) -> &'static str {
        match self.error {
            StatementError::Parse(_) => "ParseError",
            StatementError::Resolve(_) => "ResolutionError",
            StatementError::Compile(_) => "CommandCompilationError",
        }
    }

    /// Human-readable message without the line prefix.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}
