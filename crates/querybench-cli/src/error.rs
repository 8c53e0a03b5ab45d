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


//! Structured error types for the querybench CLI.
//!
//! Every command returns `Result<(), CliError>`; the binary maps the error to
//! a process exit code with [`CliError::exit_code`].

use querybench_core::{QueryBenchError, ValidationError};
use querybench_render::TemplateError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for report data that fails validation.
pub const EXIT_VALIDATION: u8 = 1;

/// Exit code for usage and format errors.
pub const EXIT_USAGE: u8 = 2;

/// The main error type for querybench CLI operations.
///
/// # Examples
///
/// ```rust
/// use querybench_cli::error::CliError;
///
/// let err = CliError::InvalidInput("no report given".to_string());
/// assert_eq!(err.exit_code(), 2);
/// ```
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// A file could not be read or written.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Input file exceeds `QUERYBENCH_MAX_FILE_SIZE`.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        /// The file path that exceeded the limit
        path: PathBuf,
        /// The actual file size in bytes
        actual: u64,
        /// The maximum allowed file size in bytes
        max: u64,
        /// The maximum allowed file size in MB (for display)
        max_mb: u64,
    },

    /// A report file is not JSON.
    #[error("Invalid value for '{path}': {message}")]
    Format {
        /// The offending report file
        path: PathBuf,
        /// The parser's message
        message: String,
    },

    /// A report file is JSON but not a valid report.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A template could not be parsed or rendered.
    #[error("Invalid template '{path}': {source}")]
    Template {
        /// The template file
        path: PathBuf,
        /// Where and why it failed
        source: TemplateError,
    },

    /// Any other invalid argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a file-too-large error.
    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    /// Attach a report path to an error raised while loading it.
    pub fn report(path: impl Into<PathBuf>, source: QueryBenchError) -> Self {
        match source {
            QueryBenchError::Validation(err) => Self::Validation(err),
            QueryBenchError::Io { path, message } => Self::Io { path, message },
            other => Self::Format {
                path: path.into(),
                message: other.to_string(),
            },
        }
    }

    /// Create a template error.
    pub fn template(path: impl Into<PathBuf>, source: TemplateError) -> Self {
        Self::Template {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => EXIT_VALIDATION,
            _ => EXIT_USAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let validation = CliError::from(ValidationError::missing_field("query-count"));
        assert_eq!(validation.exit_code(), EXIT_VALIDATION);

        let format = CliError::report(
            "report.json",
            QueryBenchError::Format("EOF while parsing a value".to_string()),
        );
        assert_eq!(format.exit_code(), EXIT_USAGE);

        let io = CliError::io_error("missing.json", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(io.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn test_report_errors_keep_their_kind() {
        let err = CliError::report(
            "report.json",
            QueryBenchError::Validation(ValidationError::missing_field("query-count")),
        );
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("query-count"));

        let err = CliError::report(
            "report.json",
            QueryBenchError::Format("expected value".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Invalid value for 'report.json': The file is not valid json: expected value"
        );
    }

    #[test]
    fn test_file_too_large_message() {
        let err = CliError::file_too_large("big.json", 2 * 1024 * 1024, 1024 * 1024);
        assert_eq!(
            err.to_string(),
            "File 'big.json' is too large (2097152 bytes). Maximum allowed: 1048576 bytes (1 MB)"
        );
    }
}
