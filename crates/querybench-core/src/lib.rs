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

//! querybench core
//!
//! Counts database queries per test, aggregates the counts of a whole test
//! session into one JSON report and compares two reports.
//!
//! ## Recording a session
//!
//! ```rust,no_run
//! use querybench_core::{capture_with, SessionConfig, SessionCoordinator};
//!
//! # fn main() -> querybench_core::Result<()> {
//! let session = SessionCoordinator::start(SessionConfig::from_env())?;
//!
//! capture_with(session.recorder(), "test_books", "test_list_books", |capture| {
//!     capture.record("SELECT * FROM books");
//!     capture.record("SELECT * FROM authors WHERE id = 1");
//! });
//!
//! session.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Comparing reports
//!
//! ```rust
//! use querybench_core::{DiffChar, DiffGenerator, Report};
//!
//! let old = Report::parse_str(r#"{"mod": {"t1": {"query-count": 20}}}"#).unwrap();
//! let new = Report::parse_str(r#"{"mod": {"t1": {"query-count": 19}}}"#).unwrap();
//!
//! let diff = DiffGenerator::from_reports(&old, &new);
//! let row = &diff.modules()[0].comparisons[0];
//! assert_eq!(row.diff(), DiffChar::Positive);
//! assert_eq!(row.left_count(), "20");
//! assert_eq!(row.right_count(), "19");
//! ```

pub mod aggregate;
pub mod capture;
pub mod config;
pub mod diff;
pub mod entry;
pub mod error;
pub mod humanize;
pub mod report;

pub use aggregate::{FinishOutcome, MergeOutcome, SessionCoordinator, WorkerRecorder};
pub use capture::{capture_with, CaptureDirective, CaptureScope, QueryCapture, QueryMetrics};
pub use config::{BackupSetting, SessionConfig, WorkerConfig, WorkerId};
pub use diff::{ColumnWidths, DiffChar, DiffGenerator, ModuleDiff, SingleEntryComparison};
pub use entry::{
    flatten_entries, iter_entries, DuplicateCount, Entry, Field, ModuleEntries, FIELDS,
};
pub use error::{QueryBenchError, Result, ValidationError, ValidationErrorKind};
pub use humanize::humanize;
pub use report::{Metrics, Report};
