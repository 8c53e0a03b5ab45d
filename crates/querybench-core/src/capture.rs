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

//! Capture windows around a test body.
//!
//! The database layer feeds executed SQL into a [`QueryCapture`]; a
//! [`CaptureScope`] owns one capture for one test and records its metrics
//! into a [`WorkerRecorder`] when it goes out of scope, whether the test body
//! returned normally or panicked.

use crate::aggregate::WorkerRecorder;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Count and duplicate count of one capture window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryMetrics {
    /// Number of executed statements.
    pub query_count: u64,
    /// Statements whose exact SQL text already ran earlier in the window.
    pub duplicate_count: u64,
}

impl QueryMetrics {
    /// Derive metrics from executed statements.
    ///
    /// # Examples
    ///
    /// ```
    /// use querybench_core::QueryMetrics;
    ///
    /// let metrics = QueryMetrics::from_statements(["SELECT 1", "SELECT 2", "SELECT 1"]);
    /// assert_eq!(metrics.query_count, 3);
    /// assert_eq!(metrics.duplicate_count, 1);
    /// ```
    pub fn from_statements<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut metrics = Self::default();

        for sql in statements {
            let sql = sql.as_ref();
            metrics.query_count += 1;
            if !seen.insert(sql.to_string()) {
                metrics.duplicate_count += 1;
            }
        }

        metrics
    }
}

/// Statements executed during one capture window.
#[derive(Debug, Clone, Default)]
pub struct QueryCapture {
    statements: Vec<String>,
}

impl QueryCapture {
    /// Start an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one executed statement.
    pub fn record(&mut self, sql: impl Into<String>) {
        self.statements.push(sql.into());
    }

    /// Executed statements in execution order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Number of executed statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// `true` if nothing ran.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Metrics of the statements captured so far.
    pub fn metrics(&self) -> QueryMetrics {
        QueryMetrics::from_statements(&self.statements)
    }
}

/// Per-test capture options attached to the test marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureDirective {
    /// Capture without the test explicitly requesting the capture fixture.
    pub autouse: bool,
}

impl Default for CaptureDirective {
    fn default() -> Self {
        Self { autouse: true }
    }
}

impl CaptureDirective {
    /// Whether a marked test gets captured.
    pub fn should_capture(&self, fixture_requested: bool) -> bool {
        self.autouse || fixture_requested
    }
}

/// A capture window bound to one test.
///
/// Metrics are recorded exactly once: on [`CaptureScope::finish`], or on drop
/// if the scope was never finished (including during unwinding).
pub struct CaptureScope<'a> {
    recorder: &'a WorkerRecorder,
    module: String,
    test: String,
    capture: QueryCapture,
    finished: bool,
}

impl<'a> CaptureScope<'a> {
    pub(crate) fn new(recorder: &'a WorkerRecorder, module: String, test: String) -> Self {
        Self {
            recorder,
            module,
            test,
            capture: QueryCapture::new(),
            finished: false,
        }
    }

    /// Record one executed statement.
    pub fn record(&mut self, sql: impl Into<String>) {
        self.capture.record(sql);
    }

    /// The underlying capture.
    pub fn capture(&self) -> &QueryCapture {
        &self.capture
    }

    /// Mutable access for database hooks that take a `&mut QueryCapture`.
    pub fn capture_mut(&mut self) -> &mut QueryCapture {
        &mut self.capture
    }

    /// Close the window and record its metrics.
    pub fn finish(mut self) -> QueryMetrics {
        self.commit()
    }

    fn commit(&mut self) -> QueryMetrics {
        let metrics = self.capture.metrics();
        if !self.finished {
            self.finished = true;
            // Recording must never fail the test being measured.
            if let Err(e) = self.recorder.add_entry(
                &self.module,
                &self.test,
                metrics.query_count,
                Some(metrics.duplicate_count),
            ) {
                error!(module = %self.module, test = %self.test, "failed to record query count: {}", e);
            }
        }
        metrics
    }
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.commit();
        }
    }
}

/// Run `body` inside a capture window for `module::test`.
///
/// Metrics are recorded even if `body` panics; the panic is then resumed.
pub fn capture_with<F, R>(recorder: &WorkerRecorder, module: &str, test: &str, body: F) -> R
where
    F: FnOnce(&mut QueryCapture) -> R,
{
    let mut scope = recorder.capture(module, test);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(scope.capture_mut())));
    scope.finish();

    match outcome {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_without_duplicates() {
        let metrics = QueryMetrics::from_statements(["SELECT date('now');", "SELECT 1;"]);
        assert_eq!(metrics, QueryMetrics { query_count: 2, duplicate_count: 0 });
    }

    #[test]
    fn test_duplicates_use_exact_text() {
        let metrics = QueryMetrics::from_statements(["SELECT 1", "select 1", "SELECT 1", "SELECT 1"]);
        assert_eq!(metrics.query_count, 4);
        assert_eq!(metrics.duplicate_count, 2);
    }

    #[test]
    fn test_empty_capture() {
        let capture = QueryCapture::new();
        assert!(capture.is_empty());
        assert_eq!(capture.metrics(), QueryMetrics::default());
    }

    #[test]
    fn test_directive() {
        assert!(CaptureDirective::default().should_capture(false));
        let manual = CaptureDirective { autouse: false };
        assert!(!manual.should_capture(false));
        assert!(manual.should_capture(true));
    }
}
