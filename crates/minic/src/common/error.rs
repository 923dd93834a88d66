//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice, StandardStream};
use thiserror::Error;
use super::{Position, Span};

/// Compile error with source location
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("lexer error at {position}: {message}")]
    Lexer {
        message: String,
        span: Span,
        position: Position,
    },

    #[error("syntax error at {position}: {message}")]
    Parser {
        message: String,
        span: Span,
        position: Position,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span, position: Position) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
            position,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span, position: Position) -> Self {
        Self::Parser {
            message: message.into(),
            span,
            position,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CompileError::Lexer { message, .. } | CompileError::Parser { message, .. } => {
                message.clone()
            }
            CompileError::Io(err) => err.to_string(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lexer { span, .. } | CompileError::Parser { span, .. } => Some(*span),
            CompileError::Io(_) => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Lexer { position, .. } | CompileError::Parser { position, .. } => {
                Some(*position)
            }
            CompileError::Io(_) => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    color: ColorChoice,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(color: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            color,
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Lexer { message, span, .. } => Diagnostic::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CompileError::Parser { message, span, .. } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {err}"))
            }
        }
    }

    /// Render one error to stderr
    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let writer = StandardStream::stderr(self.color);
        let diagnostic = Self::diagnostic(file_id, error);
        let _ = term::emit(&mut writer.lock(), &self.config, &self.files, &diagnostic);
    }

    pub fn report_all(&self, file_id: usize, errors: &[CompileError]) {
        for error in errors {
            self.report_error(file_id, error);
        }
    }

    /// Render one error without color into a string
    pub fn render_to_string(&self, file_id: usize, error: &CompileError) -> String {
        let mut buffer = Buffer::no_color();
        let diagnostic = Self::diagnostic(file_id, error);
        let _ = term::emit(&mut buffer, &self.config, &self.files, &diagnostic);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
