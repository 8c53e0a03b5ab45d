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

//! Worker-side recording and coordinator-side merging.

use super::scratch::{decode_all, ScratchLine, SCRATCH_EXTENSION};
use crate::capture::CaptureScope;
use crate::config::{SessionConfig, WorkerConfig, WorkerId};
use crate::error::{QueryBenchError, Result};
use crate::report::{Metrics, Report};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

const SCRATCH_DIR_PREFIX: &str = "querybench-";

struct RecorderState {
    buffer: Report,
    file: File,
}

/// Records measurements for one worker process.
///
/// Every entry lands in an in-memory buffer and is appended to the worker's
/// scratch file right away, so a worker killed mid-session still leaves
/// everything it measured before dying.
///
/// # Thread Safety
///
/// The buffer and the file handle sit behind one `parking_lot::Mutex`; tests
/// running on several threads of the same worker can share a recorder.
pub struct WorkerRecorder {
    worker_id: WorkerId,
    scratch_file: PathBuf,
    state: Mutex<RecorderState>,
}

impl WorkerRecorder {
    /// Open (or create) this worker's scratch file.
    pub fn open(config: &WorkerConfig) -> Result<Self> {
        let scratch_file = scratch_file_path(&config.scratch_dir, &config.worker_id);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&scratch_file)
            .map_err(|e| QueryBenchError::io_error(&scratch_file, e))?;

        // A previous run of this worker may have died mid-line; terminate that
        // line so the next record does not get glued onto it.
        let mid_line =
            ends_mid_line(&mut file).map_err(|e| QueryBenchError::io_error(&scratch_file, e))?;
        if mid_line {
            warn!(worker = %config.worker_id, path = %scratch_file.display(), "scratch file ends mid-line, terminating it");
            file.write_all(b"\n")
                .map_err(|e| QueryBenchError::io_error(&scratch_file, e))?;
        }

        debug!(worker = %config.worker_id, path = %scratch_file.display(), "opened scratch file");

        Ok(Self {
            worker_id: config.worker_id.clone(),
            scratch_file,
            state: Mutex::new(RecorderState {
                buffer: Report::new(),
                file,
            }),
        })
    }

    /// Join the session described by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::open(&WorkerConfig::from_env()?)
    }

    /// This worker's identity.
    pub fn worker_id(&self) -> &WorkerId {
        &self.worker_id
    }

    /// Path of this worker's scratch file.
    pub fn scratch_file(&self) -> &Path {
        &self.scratch_file
    }

    /// Record one measurement. A later call for the same test wins.
    pub fn add_entry(
        &self,
        module: &str,
        test: &str,
        query_count: u64,
        duplicate_count: Option<u64>,
    ) -> Result<()> {
        let line = ScratchLine {
            module: module.to_string(),
            test: test.to_string(),
            query_count,
            duplicate_count,
        }
        .encode();

        let mut state = self.state.lock();
        state
            .file
            .write_all(line.as_bytes())
            .map_err(|e| QueryBenchError::io_error(&self.scratch_file, e))?;
        state
            .buffer
            .insert(module, test, Metrics::new(query_count, duplicate_count));

        debug!(worker = %self.worker_id, module, test, query_count, "recorded entry");
        Ok(())
    }

    /// Open a capture window for `module::test`.
    pub fn capture(&self, module: &str, test: &str) -> CaptureScope<'_> {
        CaptureScope::new(self, module.to_string(), test.to_string())
    }

    /// Copy of everything this worker recorded.
    pub fn snapshot(&self) -> Report {
        self.state.lock().buffer.clone()
    }
}

fn ends_mid_line(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn scratch_file_path(scratch_dir: &Path, worker_id: &WorkerId) -> PathBuf {
    scratch_dir.join(format!("{}.{}", worker_id, SCRATCH_EXTENSION))
}

/// The merged report of a session, before it is written.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Union of every worker's entries.
    pub report: Report,
    /// Number of scratch files read.
    pub workers: usize,
    /// Malformed scratch lines skipped.
    pub skipped_lines: usize,
}

/// What [`SessionCoordinator::finish`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// No test was measured; no report file was written.
    NothingRecorded,
    /// The report was written.
    Written {
        /// Report location.
        path: PathBuf,
        /// Where the previous report was copied, if a backup was taken.
        backup: Option<PathBuf>,
        /// Number of tests in the report.
        tests: usize,
        /// Malformed scratch lines skipped during the merge.
        skipped_lines: usize,
    },
}

/// Owns the scratch directory of a test session and writes the final report.
///
/// Created once by the coordinating process at session start. Workers receive
/// [`SessionCoordinator::worker_config`] (usually via
/// [`WorkerConfig::to_env`]) and record through their own
/// [`WorkerRecorder`]; the coordinator itself records through
/// [`SessionCoordinator::recorder`].
///
/// # Examples
///
/// ```no_run
/// use querybench_core::{SessionConfig, SessionCoordinator};
///
/// # fn main() -> querybench_core::Result<()> {
/// let session = SessionCoordinator::start(SessionConfig::new(".pytest-queries"))?;
/// session.recorder().add_entry("test_books", "test_list_books", 3, Some(0))?;
/// session.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct SessionCoordinator {
    config: SessionConfig,
    scratch: TempDir,
    recorder: WorkerRecorder,
}

impl SessionCoordinator {
    /// Create the scratch directory and the coordinator's own recorder.
    pub fn start(config: SessionConfig) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir()
            .map_err(|e| QueryBenchError::io_error(std::env::temp_dir(), e))?;

        let recorder = WorkerRecorder::open(&WorkerConfig {
            scratch_dir: scratch.path().to_path_buf(),
            worker_id: WorkerId::master(),
        })?;

        debug!(path = %scratch.path().display(), "created scratch directory");

        Ok(Self {
            config,
            scratch,
            recorder,
        })
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The shared scratch directory.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Settings to hand to the worker named `worker_id`.
    pub fn worker_config(&self, worker_id: WorkerId) -> WorkerConfig {
        WorkerConfig {
            scratch_dir: self.scratch.path().to_path_buf(),
            worker_id,
        }
    }

    /// Recorder for tests run by the coordinating process itself.
    pub fn recorder(&self) -> &WorkerRecorder {
        &self.recorder
    }

    /// Merge every worker's scratch file.
    ///
    /// Files are read in file-name order. Within one file the last line for a
    /// test wins; malformed lines are skipped. Unreadable files count as empty.
    ///
    /// # Errors
    ///
    /// [`QueryBenchError::ConflictingEntry`] if two workers reported the same test.
    pub fn merge(&self) -> Result<MergeOutcome> {
        let mut outcome = MergeOutcome::default();
        let mut owners: BTreeMap<(String, String), String> = BTreeMap::new();

        for path in self.scratch_files()? {
            let worker = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(worker = %worker, "skipping unreadable scratch file: {}", e);
                    continue;
                }
            };
            let decoded = decode_all(&String::from_utf8_lossy(&bytes));

            for (line_no, e) in &decoded.skipped {
                warn!(worker = %worker, line = line_no, "skipping malformed scratch line: {}", e);
            }
            outcome.skipped_lines += decoded.skipped.len();
            outcome.workers += 1;

            let mut latest: BTreeMap<(String, String), Metrics> = BTreeMap::new();
            for line in decoded.lines {
                latest.insert(
                    (line.module, line.test),
                    Metrics::new(line.query_count, line.duplicate_count),
                );
            }

            for ((module, test), metrics) in latest {
                if let Some(first_worker) = owners.get(&(module.clone(), test.clone())) {
                    error!(module = %module, test = %test, "test reported by more than one worker");
                    return Err(QueryBenchError::ConflictingEntry {
                        module,
                        test,
                        first_worker: first_worker.clone(),
                        second_worker: worker,
                    });
                }
                owners.insert((module.clone(), test.clone()), worker.clone());
                outcome.report.insert(module, test, metrics);
            }
        }

        debug!(
            workers = outcome.workers,
            tests = outcome.report.len(),
            skipped = outcome.skipped_lines,
            "merged scratch files"
        );
        Ok(outcome)
    }

    fn scratch_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.scratch.path();
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| QueryBenchError::io_error(dir, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path.extension().map_or(false, |ext| ext == SCRATCH_EXTENSION)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Merge, back up the previous report if configured, and write the new one.
    ///
    /// Nothing is written when no test was measured. The scratch directory is
    /// removed in every case.
    pub fn finish(self) -> Result<FinishOutcome> {
        let merged = self.merge()?;
        let Self {
            config,
            scratch,
            recorder,
        } = self;
        drop(recorder);

        let outcome = if merged.report.is_empty() {
            debug!("no test was measured, not writing a report");
            FinishOutcome::NothingRecorded
        } else {
            let backup = backup_previous(&config)?;
            merged.report.save(&config.save_path)?;
            info!(
                path = %config.save_path.display(),
                tests = merged.report.len(),
                "wrote query count report"
            );
            FinishOutcome::Written {
                path: config.save_path.clone(),
                backup,
                tests: merged.report.len(),
                skipped_lines: merged.skipped_lines,
            }
        };

        if let Err(e) = scratch.close() {
            warn!("failed to remove scratch directory: {}", e);
        }
        Ok(outcome)
    }

    /// [`finish`](Self::finish) for session-end hooks: errors are logged and
    /// swallowed so a metrics failure can never fail the test run.
    pub fn finish_or_log(self) -> Option<FinishOutcome> {
        match self.finish() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("query count report was not written: {}", e);
                None
            }
        }
    }
}

/// Copy the existing report aside before it is overwritten.
fn backup_previous(config: &SessionConfig) -> Result<Option<PathBuf>> {
    let Some(backup_path) = &config.backup_path else {
        return Ok(None);
    };
    if !config.save_path.is_file() {
        debug!(path = %config.save_path.display(), "no previous report to back up");
        return Ok(None);
    }

    fs::copy(&config.save_path, backup_path)
        .map_err(|e| QueryBenchError::io_error(backup_path, e))?;
    info!(
        from = %config.save_path.display(),
        to = %backup_path.display(),
        "backed up previous report"
    );
    Ok(Some(backup_path.clone()))
}
