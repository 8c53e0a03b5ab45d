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


//! Command implementations for the querybench CLI.
//!
//! Each command is a plain function returning `Result<(), CliError>`; the
//! clap layer in [`crate::cli`] only parses arguments and dispatches here.

mod backup;
mod diff;
mod html;
mod show;

pub use backup::backup;
pub use diff::{diff, format_diff};
pub use html::html;
pub use show::show;

use crate::error::CliError;
use querybench_core::Report;
use std::fs;
use std::io::{self, Write};
use tracing::debug;

/// Default maximum size of an input file: 1 GiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Environment variable overriding [`DEFAULT_MAX_FILE_SIZE`], in bytes.
pub const ENV_MAX_FILE_SIZE: &str = "QUERYBENCH_MAX_FILE_SIZE";

fn get_max_file_size() -> u64 {
    std::env::var(ENV_MAX_FILE_SIZE)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a file into a string, refusing files above the configured size limit.
///
/// # Arguments
///
/// * `path` - Path to the file to read
///
/// # Errors
///
/// Returns `Err` if:
/// - The file metadata cannot be accessed
/// - The file size exceeds `QUERYBENCH_MAX_FILE_SIZE` (default 1 GiB)
/// - The file cannot be read or is not valid UTF-8
///
/// # Examples
///
/// ```no_run
/// use querybench_cli::commands::read_file;
///
/// # fn main() -> Result<(), querybench_cli::error::CliError> {
/// let content = read_file(".pytest-queries")?;
/// assert!(content.starts_with('{'));
/// # Ok(())
/// # }
/// ```
pub fn read_file(path: &str) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max_file_size = get_max_file_size();
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }

    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Write content to a file, or to stdout when `path` is `None` or `-`.
///
/// # Arguments
///
/// * `content` - The string content to write
/// * `path` - Optional output file path
///
/// # Errors
///
/// Returns `Err` if the file or stdout cannot be written.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), CliError> {
    match path.filter(|p| *p != "-") {
        Some(p) => fs::write(p, content).map_err(|e| CliError::io_error(p, e)),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| CliError::io_error("<stdout>", e))
        }
    }
}

/// Read and validate a report file.
///
/// # Errors
///
/// - [`CliError::Format`] if the file is not JSON
/// - [`CliError::Validation`] if the JSON is not a valid report
/// - [`CliError::Io`] / [`CliError::FileTooLarge`] if it cannot be read
pub fn load_report(path: &str) -> Result<Report, CliError> {
    let content = read_file(path)?;
    let report = Report::parse_str(&content).map_err(|e| CliError::report(path, e))?;
    debug!(path, tests = report.len(), "loaded report");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_report_invalid_json() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        let err = load_report(path).unwrap_err();
        assert!(matches!(err, CliError::Format { .. }));
        assert!(err.to_string().contains("The file is not valid json"));
    }

    #[test]
    fn test_load_report_invalid_data() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{"m": {"t": {}}}"#).unwrap();

        let err = load_report(file.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_load_report_missing_file() {
        let err = load_report("/nonexistent/.pytest-queries").unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_write_output_to_file() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();

        write_output("<html></html>", Some(path)).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
