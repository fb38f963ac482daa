//! Error types with rich diagnostics using miette
//!
//! Malformed element data never surfaces here: the engine falls back to
//! defaults for bad properties. These errors cover document parsing,
//! scene mutations that would break an invariant, live-value sources and
//! configuration.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::ElementId;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (filename or "<input>")
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Byte offset of a 1-based line/column pair as reported by serde_json.
    pub fn offset_of(&self, line: usize, column: usize) -> usize {
        let line_start: usize = self
            .source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        (line_start + column.saturating_sub(1)).min(self.source.len())
    }
}

// ============================================================================
// Scene Errors
// ============================================================================

/// Errors raised by scene documents and scene mutations
#[derive(Error, Diagnostic, Debug)]
pub enum SceneError {
    #[error("invalid scene document: {message}")]
    #[diagnostic(
        code(hmi_scene::scene::invalid_document),
        help("a scene is a JSON array of element records")
    )]
    InvalidDocument {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("duplicate element id: {id}")]
    #[diagnostic(
        code(hmi_scene::scene::duplicate_id),
        help("element ids must be unique within a scene")
    )]
    DuplicateId { id: ElementId },

    #[error("unknown element: {id}")]
    #[diagnostic(code(hmi_scene::scene::unknown_element))]
    UnknownElement { id: ElementId },
}

impl SceneError {
    /// Wrap a serde_json failure with the document it came from.
    pub fn invalid_document(ctx: &SourceContext, err: &serde_json::Error) -> Self {
        let offset = ctx.offset_of(err.line(), err.column());
        SceneError::InvalidDocument {
            message: err.to_string(),
            src: ctx.named_source(),
            span: SourceSpan::from(offset..offset),
        }
    }
}

// ============================================================================
// Live Value Source Errors
// ============================================================================

/// Errors reported by a live-value source while polling
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("live value source unavailable: {reason}")]
    #[diagnostic(code(hmi_scene::live::unavailable))]
    Unavailable { reason: String },

    #[error("live value source rejected the credential")]
    #[diagnostic(
        code(hmi_scene::live::unauthorized),
        help("refresh the session token passed to the resolver")
    )]
    Unauthorized,

    #[error("malformed live value payload: {reason}")]
    #[diagnostic(code(hmi_scene::live::malformed))]
    Malformed { reason: String },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Errors from loading or validating an [`EngineConfig`](crate::config::EngineConfig)
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("invalid {field}: {value}")]
    #[diagnostic(
        code(hmi_scene::config::invalid_value),
        help("{field} must be finite and greater than zero")
    )]
    InvalidValue { field: &'static str, value: f64 },

    #[error("arc sample count must be at least 2, got {samples}")]
    #[diagnostic(code(hmi_scene::config::arc_samples))]
    ArcSamples { samples: usize },

    #[error("could not parse engine configuration")]
    #[diagnostic(code(hmi_scene::config::parse))]
    Parse(#[from] serde_json::Error),
}
