// SPDX-License-Identifier: MIT
//
// WNR Client Configuration: Entropy Source Factory
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/qrng-data-diode

//! Error types for configuration loading
//!
//! Provides a unified error taxonomy using `thiserror` for ergonomic error handling.
//! Every variant is fatal for the load that produced it.

pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required setting is absent
    #[error("Missing required setting \"{0}\"")]
    MissingField(String),

    /// Setting is present but semantically wrong
    #[error("Invalid value for \"{path}\": {reason}")]
    InvalidValue { path: String, reason: String },

    /// Numeric setting violates its bounds
    #[error("Value {value} for \"{path}\" is out of range: {expected}")]
    OutOfRange {
        path: String,
        value: i64,
        expected: String,
    },

    /// Connector constructor failed
    #[error("Construction failed: {0}")]
    Construction(String),

    /// Document text is malformed
    #[error("Configuration syntax error{}: {message}", at_line(.line))]
    DocumentSyntax { line: Option<usize>, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(path: impl Into<String>, value: i64, expected: impl Into<String>) -> Self {
        Error::OutOfRange {
            path: path.into(),
            value,
            expected: expected.into(),
        }
    }

    /// Dotted path of the offending setting, if the error concerns one
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::MissingField(path)
            | Error::InvalidValue { path, .. }
            | Error::OutOfRange { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Check if error was raised while validating document content
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_) | Error::InvalidValue { .. } | Error::OutOfRange { .. }
        )
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::DocumentSyntax {
            line: e.location().map(|loc| loc.line()),
            message: e.to_string(),
        }
    }
}
