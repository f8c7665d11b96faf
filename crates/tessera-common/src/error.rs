//! Error types for tessera hosts - thin wrapper over the core errors

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use std::borrow::Cow;
use tessera_editor_core::{ColumnsError, PatchError, PlatformError, SchemaError};

/// Main error type for tessera host operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum TesseraError {
    /// A patch the document refused
    #[error(transparent)]
    #[diagnostic(code(tessera::patch), help("the document is unchanged"))]
    Patch(#[from] PatchError),

    /// A tree that breaks the schema
    #[error(transparent)]
    #[diagnostic(code(tessera::schema))]
    Schema(#[from] SchemaError),

    /// Column operation rejected by validation
    #[error("{}", .0.message())]
    #[diagnostic(code(tessera::columns))]
    Columns(#[from] ColumnsError),

    /// Layout or DOM failure reported by a platform layer
    #[error(transparent)]
    #[diagnostic(code(tessera::platform))]
    Platform(#[from] PlatformError),

    /// IO error
    #[error(transparent)]
    #[diagnostic(code(tessera::io))]
    Io(#[from] std::io::Error),

    /// Settings file with an extension we cannot read or write
    #[error("unsupported settings format: {0}")]
    #[diagnostic(code(tessera::settings), help("use a .json file"))]
    UnsupportedFormat(String),

    /// Parse error with source location
    #[error(transparent)]
    #[diagnostic_source]
    Parse(#[from] ParseError),
}

/// Settings parse error with source code location information
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("parse error: {kind}")]
#[diagnostic(code(tessera::parse))]
pub struct ParseError {
    kind: serde_json::Error,
    #[source_code]
    src: NamedSource<Cow<'static, str>>,
    #[label("here")]
    err_location: SourceSpan,
}

impl ParseError {
    /// Attach the text that failed to parse so the label points into it.
    pub fn new(kind: serde_json::Error, name: impl AsRef<str>, source: impl Into<Cow<'static, str>>) -> Self {
        let source = source.into();
        let offset = if kind.line() == 0 || source.is_empty() {
            SourceOffset::from(0)
        } else {
            SourceOffset::from_location(&source, kind.line(), kind.column())
        };
        Self {
            kind,
            src: NamedSource::new(name, source),
            err_location: SourceSpan::new(offset, 0),
        }
    }

    pub fn inner(&self) -> &serde_json::Error {
        &self.kind
    }
}

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(ParseError::new(err, "json", ""))
    }
}
