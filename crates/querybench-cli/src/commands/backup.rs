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


//! Backup command - copy the current report aside

use super::write_output;
use crate::error::CliError;
use querybench_core::config::{default_backup_path, DEFAULT_SAVE_PATH, ENV_SAVE_PATH};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Copy the current report to `target`.
///
/// # Arguments
///
/// * `target` - Destination; `<report>.old` when `None`
/// * `report` - Report to copy; `QUERYBENCH_SAVE_PATH` or `.pytest-queries`
///   when `None`
///
/// # Errors
///
/// Returns `Err` if the report does not exist or cannot be copied.
pub fn backup(target: Option<&str>, report: Option<&str>) -> Result<(), CliError> {
    let report = match report {
        Some(path) => PathBuf::from(path),
        None => std::env::var_os(ENV_SAVE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH)),
    };
    let target = target
        .map(PathBuf::from)
        .unwrap_or_else(|| default_backup_path(&report));

    if !report.is_file() {
        return Err(CliError::InvalidInput(format!(
            "there is no report at '{}' to back up",
            report.display()
        )));
    }

    fs::copy(&report, &target).map_err(|e| CliError::io_error(&target, e))?;
    info!(from = %report.display(), to = %target.display(), "backed up report");

    write_output(
        &format!("{} -> {}\n", report.display(), target.display()),
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_backup_to_default_target() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("report.json");
        fs::write(&report, "{}").unwrap();

        backup(None, report.to_str()).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("report.json.old")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_backup_missing_report() {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("absent.json");

        let err = backup(None, report.to_str()).unwrap_err();
        assert!(err.to_string().contains("no report"));
        assert_eq!(err.exit_code(), 2);
    }
}
