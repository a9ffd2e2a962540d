use crate::span::Span;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// A property access no strategy applies to. Recoverable: a placeholder is emitted.
    #[error("Access error: {msg}")]
    Access { msg: String, span: Span },

    /// A compiler bug: the type checker proved something code generation cannot find.
    #[error("Internal error: {msg}")]
    Internal { msg: String, span: Span },

    #[error("Hierarchy error: {msg}")]
    Hierarchy { msg: String },

    #[error("Config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("Fixture error: {msg}")]
    Fixture { msg: String, path: PathBuf },
}

impl CompileError {
    pub fn access(msg: impl Into<String>, span: Span) -> Self {
        Self::Access { msg: msg.into(), span }
    }

    pub fn internal(msg: impl Into<String>, span: Span) -> Self {
        Self::Internal { msg: msg.into(), span }
    }

    pub fn hierarchy(msg: impl Into<String>) -> Self {
        Self::Hierarchy { msg: msg.into() }
    }

    pub fn config(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Config { msg: msg.into(), path }
    }

    pub fn fixture(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Fixture { msg: msg.into(), path }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Access { span, .. } | CompileError::Internal { span, .. } => Some(*span),
            _ => None,
        }
    }

    /// Fatal errors abort code generation for the whole unit.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CompileError::Access { .. })
    }
}

/// Collects recoverable errors for one compilation unit.
/// Sibling access sites keep generating code after a report.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, err: CompileError) {
        tracing::warn!(%err, "recorded diagnostic");
        self.errors.push(err);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors
    }
}

/// Render a CompileError with ariadne for nice terminal output.
pub fn render_error(source: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CompileError::Access { msg, span } | CompileError::Internal { msg, span } => {
            let kind_str = match err {
                CompileError::Access { .. } => "access",
                _ => "internal",
            };
            let end = span.end.min(source.len());
            let start = span.start.min(end);
            let printed = Report::build(ReportKind::Error, (), start)
                .with_message(format!("{kind_str} error"))
                .with_label(Label::new(start..end).with_message(msg))
                .finish()
                .eprint(Source::from(source));
            if printed.is_err() {
                eprintln!("error[{kind_str}]: {msg}");
            }
        }
        CompileError::Hierarchy { msg } => {
            eprintln!("error[hierarchy]: {msg}");
        }
        CompileError::Config { msg, path } => {
            eprintln!("error[config]: {msg}");
            eprintln!("  --> {}", path.display());
        }
        CompileError::Fixture { msg, path } => {
            eprintln!("error[fixture]: {msg}");
            eprintln!("  --> {}", path.display());
        }
    }
}
