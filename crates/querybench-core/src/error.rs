// querybench - Per-test database query accounting
//
// Copyright (c) 2025 querybench contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for report validation and result aggregation.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The kind of validation failure found in report content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A value had the wrong JSON type (e.g. an array where an object was expected).
    Type,
    /// A required field was absent.
    MissingField,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "TypeError"),
            Self::MissingField => write!(f, "MissingFieldError"),
        }
    }
}

/// Report content did not match the expected shape.
///
/// Validation errors are never defaulted away: a report that fails validation
/// aborts whatever command is reading it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// The kind of error.
    pub kind: ValidationErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// The offending field, for [`ValidationErrorKind::MissingField`].
    pub field: Option<String>,
}

impl ValidationError {
    /// A value of JSON type `got` was found where `expected` was required.
    pub fn wrong_type(expected: &str, got: &str) -> Self {
        Self {
            kind: ValidationErrorKind::Type,
            message: format!("Expected {}, got {} instead", expected, got),
            field: None,
        }
    }

    /// A required key is missing from a test record.
    pub fn missing_field(field: &str) -> Self {
        Self {
            kind: ValidationErrorKind::MissingField,
            message: format!("Got invalid data. It is missing a required key: {}", field),
            field: Some(field.to_string()),
        }
    }

    /// Prefix the message with where the error was found.
    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }
}

/// Errors raised by the core report, aggregation and diff operations.
#[derive(Debug, Clone, Error)]
pub enum QueryBenchError {
    /// Report content failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The report file is not valid JSON.
    #[error("The file is not valid json: {0}")]
    Format(String),

    /// I/O operation failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// A worker identity cannot be used as a scratch file name.
    #[error("Invalid worker id '{0}': must be non-empty and contain no path separators")]
    InvalidWorkerId(String),

    /// Two different workers reported the same test.
    #[error(
        "Test '{module}::{test}' was reported by both worker '{first_worker}' and worker '{second_worker}'"
    )]
    ConflictingEntry {
        /// Module name of the conflicting key
        module: String,
        /// Test name of the conflicting key
        test: String,
        /// Worker whose value was seen first
        first_worker: String,
        /// Worker that reported the key again
        second_worker: String,
    },

    /// A required setting is absent from the session environment.
    #[error("Missing session setting: {0}")]
    MissingSetting(&'static str),
}

impl QueryBenchError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

impl From<serde_json::Error> for QueryBenchError {
    fn from(source: serde_json::Error) -> Self {
        Self::Format(source.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, QueryBenchError>;
