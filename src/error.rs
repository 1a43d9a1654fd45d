//! Error types for rulecheck operations.

use std::fmt;

use thiserror::Error;

use crate::query::Context;

/// Errors that can occur while parsing stylesheets or running checks.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stylesheet parse error at {line}:{column}: {reason}")]
    Parse {
        line: u32,
        column: u32,
        reason: String,
    },

    #[error("selector '{selector}' not found {context}")]
    SelectorNotFound { selector: String, context: Context },

    #[error("selector '{selector}' has no '{property}' declaration {context}")]
    PropertyMissing {
        selector: String,
        property: String,
        context: Context,
    },

    #[error(
        "selector '{selector}' declares '{property}: {actual}', expected one of [{}] {context}",
        .expected.join(", ")
    )]
    ValueMismatch {
        selector: String,
        property: String,
        actual: String,
        expected: Vec<String>,
        context: Context,
    },

    #[error("computed '{property}' of '{selector}' is '{actual}', expected '{expected}'")]
    ComputedMismatch {
        selector: String,
        property: String,
        actual: String,
        expected: String,
    },

    #[error("attribute '{attribute}' of '{selector}' is '{actual}', expected '{expected}'")]
    AttributeMismatch {
        selector: String,
        attribute: String,
        actual: String,
        expected: String,
    },

    #[error("none of {} alternatives passed: {}", .failures.len(), .failures.join("; "))]
    NoAlternativePassed { failures: Vec<String> },

    #[error("rendering surface: {0}")]
    Surface(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Classify this error for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Parse { .. } => FailureKind::ParseError,
            Error::SelectorNotFound { .. } => FailureKind::SelectorNotFound,
            Error::PropertyMissing { .. } => FailureKind::PropertyMissing,
            Error::ValueMismatch { .. } => FailureKind::ValueMismatch,
            Error::ComputedMismatch { .. } => FailureKind::ComputedMismatch,
            Error::AttributeMismatch { .. } => FailureKind::AttributeMismatch,
            Error::NoAlternativePassed { .. } => FailureKind::NoAlternativePassed,
            Error::Surface(_) => FailureKind::Surface,
            Error::Io(_) | Error::Json(_) | Error::Config(_) => FailureKind::Setup,
        }
    }
}

/// Coarse failure classification shown next to each failing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ParseError,
    SelectorNotFound,
    PropertyMissing,
    ValueMismatch,
    ComputedMismatch,
    AttributeMismatch,
    NoAlternativePassed,
    Surface,
    Setup,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ParseError => "ParseError",
            FailureKind::SelectorNotFound => "SelectorNotFound",
            FailureKind::PropertyMissing => "PropertyMissing",
            FailureKind::ValueMismatch => "ValueMismatch",
            FailureKind::ComputedMismatch => "ComputedMismatch",
            FailureKind::AttributeMismatch => "AttributeMismatch",
            FailureKind::NoAlternativePassed => "NoAlternativePassed",
            FailureKind::Surface => "Surface",
            FailureKind::Setup => "Setup",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
