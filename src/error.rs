//! Error kinds for the HLDSL evaluator and LLIL processor.
//!
//! Mirrors the hand-rolled enum + `Display`/`Error` style used elsewhere in
//! this crate's PDF adapter (see `pdf::writer`) rather than pulling in an
//! error-handling macro crate: there is no localization need here and the
//! variant set is small and closed.

use std::fmt;

/// The six error kinds from the language specification. All are fatal: there
/// is no recovery path once one is raised.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed header, unknown token class, unclosed string, invalid
    /// escape, invalid numeric, invalid identifier.
    Syntax { message: String },
    /// Operation sees the wrong value kind on the stack, or an
    /// integer-to-fixed promotion is out of range.
    Type { message: String },
    /// Operation used in the wrong mode (page/path/text/accumulator state),
    /// unmatched group/save, nested page/accumulator, missing required
    /// field at finish, unterminated subpath.
    State { message: String },
    /// Undeclared variable/constant, duplicate declaration, redefining a
    /// resource name, or assignment to a constant.
    Name { message: String },
    /// Numeric out of allowed range, invalid box geometry, unsupported
    /// image colour/interlace, unknown built-in font name, unknown atom.
    Domain { message: String },
    /// File not found, or font/image parse failure.
    Resource { message: String },
}

impl Error {
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax { message: message.into() }
    }

    pub fn ty(message: impl Into<String>) -> Self {
        Error::Type { message: message.into() }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Error::State { message: message.into() }
    }

    pub fn name(message: impl Into<String>) -> Self {
        Error::Name { message: message.into() }
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Error::Domain { message: message.into() }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Error::Resource { message: message.into() }
    }

    /// Short, stable tag for the error kind (used in test assertions and by
    /// `LlilError`'s `Display` impl).
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Syntax { .. } => "SyntaxError",
            Error::Type { .. } => "TypeError",
            Error::State { .. } => "StateError",
            Error::Name { .. } => "NameError",
            Error::Domain { .. } => "DomainError",
            Error::Resource { .. } => "ResourceError",
        }
    }

    fn message(&self) -> &str {
        match self {
            Error::Syntax { message }
            | Error::Type { message }
            | Error::State { message }
            | Error::Name { message }
            | Error::Domain { message }
            | Error::Resource { message } => message,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for Error {}

/// An `Error` annotated with the LLIL source line it was raised on, per
/// spec: "Errors raised from LLIL execution are annotated with the current
/// line number before being surfaced."
#[derive(Debug, Clone, PartialEq)]
pub struct LlilError {
    pub line: usize,
    pub error: Error,
}

impl fmt::Display for LlilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

impl std::error::Error for LlilError {}

impl LlilError {
    pub fn new(line: usize, error: Error) -> Self {
        LlilError { line, error }
    }
}

impl From<LlilError> for Error {
    /// Folds the line annotation into the message, preserving the original
    /// kind so callers that only care about `kind()` still see it.
    fn from(e: LlilError) -> Self {
        let message = format!("line {}: {}", e.line, e.error.message());
        match e.error {
            Error::Syntax { .. } => Error::Syntax { message },
            Error::Type { .. } => Error::Type { message },
            Error::State { .. } => Error::State { message },
            Error::Name { .. } => Error::Name { message },
            Error::Domain { .. } => Error::Domain { message },
            Error::Resource { .. } => Error::Resource { message },
        }
    }
}
