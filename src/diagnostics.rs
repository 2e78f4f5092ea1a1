use std::fmt;

use thiserror::Error;

/// Represents a byte span within a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// The pipeline stage that raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Parse,
    Runtime,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Lexical => write!(f, "LexicalError"),
            DiagnosticKind::Parse => write!(f, "ParseError"),
            DiagnosticKind::Runtime => write!(f, "RuntimeError"),
        }
    }
}

/// Rich diagnostic information surfaced to end users.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lexical, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Parse, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Runtime, message)
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " ({}..{})", span.start, span.end)?;
        }
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// One error per pipeline stage; a failure in one stage never surfaces as another.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MinilangError {
    #[error("LexicalError: {0}")]
    Lexical(Diagnostic),
    #[error("ParseError: {0}")]
    Parse(Diagnostic),
    #[error("RuntimeError: {0}")]
    Runtime(Diagnostic),
}

impl MinilangError {
    pub fn kind(&self) -> DiagnosticKind {
        self.diagnostic().kind
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            MinilangError::Lexical(diag)
            | MinilangError::Parse(diag)
            | MinilangError::Runtime(diag) => diag,
        }
    }

    pub fn message(&self) -> &str {
        &self.diagnostic().message
    }
}

impl From<Diagnostic> for MinilangError {
    fn from(diag: Diagnostic) -> Self {
        match diag.kind {
            DiagnosticKind::Lexical => MinilangError::Lexical(diag),
            DiagnosticKind::Parse => MinilangError::Parse(diag),
            DiagnosticKind::Runtime => MinilangError::Runtime(diag),
        }
    }
}

pub type Result<T> = std::result::Result<T, MinilangError>;
