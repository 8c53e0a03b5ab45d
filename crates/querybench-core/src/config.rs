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

//! Session and worker settings.
//!
//! The coordinating process decides where the report goes and whether to back
//! up the previous one; workers only learn the scratch directory and their own
//! identity. Both sides read the same environment variables so settings reach
//! worker processes through the session's environment.

use crate::error::{QueryBenchError, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Report file written when no save path is configured.
pub const DEFAULT_SAVE_PATH: &str = ".pytest-queries";

/// Suffix of the default backup file name.
pub const BACKUP_SUFFIX: &str = ".old";

/// Where the session writes its report.
pub const ENV_SAVE_PATH: &str = "QUERYBENCH_SAVE_PATH";

/// Backup setting: unset disables backup, empty selects `<report>.old`,
/// anything else is the backup path.
pub const ENV_BACKUP_PATH: &str = "QUERYBENCH_BACKUP_PATH";

/// Scratch directory shared with workers.
pub const ENV_SCRATCH_DIR: &str = "QUERYBENCH_SCRATCH_DIR";

/// Identity of the current worker process.
pub const ENV_WORKER_ID: &str = "QUERYBENCH_WORKER";

/// Worker identity used by the coordinating process itself.
pub const MASTER_WORKER_ID: &str = "master";

/// Backup behaviour requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackupSetting {
    /// Never back up.
    #[default]
    Disabled,
    /// Back up to `<save_path>.old`.
    DefaultPath,
    /// Back up to an explicit path.
    Path(PathBuf),
}

impl BackupSetting {
    /// Interpret an optional flag value: absent disables, empty picks the default.
    pub fn from_flag(value: Option<OsString>) -> Self {
        match value {
            None => Self::Disabled,
            Some(v) if v.is_empty() => Self::DefaultPath,
            Some(v) => Self::Path(PathBuf::from(v)),
        }
    }

    /// Resolve against the report path.
    pub fn resolve(&self, save_path: &Path) -> Option<PathBuf> {
        match self {
            Self::Disabled => None,
            Self::DefaultPath => Some(default_backup_path(save_path)),
            Self::Path(path) => Some(path.clone()),
        }
    }
}

/// `<save_path>.old`.
pub fn default_backup_path(save_path: &Path) -> PathBuf {
    let mut name = save_path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Settings owned by the coordinating process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Report destination.
    pub save_path: PathBuf,
    /// Copy target for the previous report, if backups are enabled.
    pub backup_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl SessionConfig {
    /// Write to `save_path` without backups.
    pub fn new(save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: save_path.into(),
            backup_path: None,
        }
    }

    /// Apply a backup setting.
    pub fn with_backup(mut self, backup: BackupSetting) -> Self {
        self.backup_path = backup.resolve(&self.save_path);
        self
    }

    /// Read [`ENV_SAVE_PATH`] and [`ENV_BACKUP_PATH`].
    pub fn from_env() -> Self {
        let save_path = env::var_os(ENV_SAVE_PATH)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));

        Self::new(save_path).with_backup(BackupSetting::from_flag(env::var_os(ENV_BACKUP_PATH)))
    }
}

/// Validated worker identity, usable as a scratch file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(String);

impl WorkerId {
    /// Validate a worker identity.
    ///
    /// # Errors
    ///
    /// [`QueryBenchError::InvalidWorkerId`] if `id` is empty, starts with a dot,
    /// or contains a path separator.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = !id.is_empty() && !id.starts_with('.') && !id.contains(['/', '\\']);
        if valid {
            Ok(Self(id))
        } else {
            Err(QueryBenchError::InvalidWorkerId(id))
        }
    }

    /// The coordinating process.
    pub fn master() -> Self {
        Self(MASTER_WORKER_ID.to_string())
    }

    /// The identity as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settings a worker process receives from the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Scratch directory created by the coordinator.
    pub scratch_dir: PathBuf,
    /// This worker's identity.
    pub worker_id: WorkerId,
}

impl WorkerConfig {
    /// Read [`ENV_SCRATCH_DIR`] and [`ENV_WORKER_ID`].
    ///
    /// Neither setting is ever re-derived: a worker missing either one cannot
    /// record anything without risking a collision with another process.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var_os(name))
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<OsString>,
    {
        let scratch_dir = lookup(ENV_SCRATCH_DIR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(QueryBenchError::MissingSetting(ENV_SCRATCH_DIR))?;

        let worker_id = lookup(ENV_WORKER_ID)
            .filter(|v| !v.is_empty())
            .ok_or(QueryBenchError::MissingSetting(ENV_WORKER_ID))?;
        let worker_id = WorkerId::new(worker_id.to_string_lossy())?;

        Ok(Self {
            scratch_dir,
            worker_id,
        })
    }

    /// Environment pairs to hand to a worker process.
    pub fn to_env(&self) -> Vec<(&'static str, OsString)> {
        vec![
            (ENV_SCRATCH_DIR, self.scratch_dir.clone().into_os_string()),
            (ENV_WORKER_ID, OsString::from(self.worker_id.as_str())),
        ]
    }
}
