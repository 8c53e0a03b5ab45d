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

//! The module → test → metrics report and its JSON form.
//!
//! On disk a report looks like:
//!
//! ```json
//! {
//!   "test_books": {
//!     "test_list_books": {
//!       "query-count": 3,
//!       "duplicates": 1
//!     }
//!   }
//! }
//! ```
//!
//! Reading always goes through [`Entry`] validation; writing uses serde with
//! two-space indentation. Both levels are `BTreeMap`s so iteration order is
//! the sorted key order regardless of insertion order.

use crate::entry::{flatten_entries, Entry, ModuleEntries};
use crate::error::{QueryBenchError, Result, ValidationError};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Metrics stored for one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Number of executed statements.
    #[serde(rename = "query-count")]
    pub query_count: u64,
    /// Number of duplicated statements, when tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<u64>,
}

impl Metrics {
    /// Metrics with a known duplicate count.
    pub fn new(query_count: u64, duplicates: Option<u64>) -> Self {
        Self {
            query_count,
            duplicates,
        }
    }
}

impl From<&Entry> for Metrics {
    fn from(entry: &Entry) -> Self {
        Self {
            query_count: entry.query_count,
            duplicates: entry.duplicate_count.known(),
        }
    }
}

/// Per-module, per-test query metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    modules: BTreeMap<String, BTreeMap<String, Metrics>>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record metrics for a test, returning the previous value if any.
    pub fn insert(
        &mut self,
        module: impl Into<String>,
        test: impl Into<String>,
        metrics: Metrics,
    ) -> Option<Metrics> {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(test.into(), metrics)
    }

    /// Metrics of one test.
    pub fn get(&self, module: &str, test: &str) -> Option<&Metrics> {
        self.modules.get(module).and_then(|tests| tests.get(test))
    }

    /// `true` if no test has been recorded.
    pub fn is_empty(&self) -> bool {
        self.modules.values().all(BTreeMap::is_empty)
    }

    /// Number of recorded tests across all modules.
    pub fn len(&self) -> usize {
        self.modules.values().map(BTreeMap::len).sum()
    }

    /// Modules in sorted order.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Metrics>)> {
        self.modules.iter().map(|(name, tests)| (name.as_str(), tests))
    }

    /// Build a report from validated entries; later entries win on key collision.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut report = Self::new();
        for entry in entries {
            report.insert(&entry.module_name, &entry.test_name, Metrics::from(entry));
        }
        report
    }

    /// Entries grouped by module, both levels in sorted order.
    pub fn module_entries(&self) -> Vec<ModuleEntries> {
        self.modules
            .iter()
            .map(|(module, tests)| {
                let entries = tests
                    .iter()
                    .map(|(test, metrics)| Entry {
                        module_name: module.clone(),
                        test_name: test.clone(),
                        query_count: metrics.query_count,
                        duplicate_count: metrics.duplicates.into(),
                    })
                    .collect();
                (module.clone(), entries)
            })
            .collect()
    }

    /// All entries in sorted (module, test) order.
    pub fn entries(&self) -> Vec<Entry> {
        self.module_entries()
            .into_iter()
            .flat_map(|(_, entries)| entries)
            .collect()
    }

    /// Validate a raw JSON value into a report.
    pub fn from_value(value: &Value) -> std::result::Result<Self, ValidationError> {
        let entries = flatten_entries(value)?;
        Ok(Self::from_entries(&entries))
    }

    /// Parse and validate report JSON text.
    ///
    /// # Errors
    ///
    /// [`QueryBenchError::Format`] for invalid JSON, [`QueryBenchError::Validation`]
    /// for JSON that is not a valid report.
    pub fn parse_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value)?)
    }

    /// Read and validate a report file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| QueryBenchError::io_error(path, e))?;
        Self::parse_str(&text)
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report to `path`.
    ///
    /// The JSON is written to a temporary file next to `path` and then moved
    /// into place, so readers never observe a half-written report.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut json = self.to_json_pretty()?;
        json.push('\n');

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| QueryBenchError::io_error(dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| QueryBenchError::io_error(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| QueryBenchError::io_error(path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DuplicateCount;
    use serde_json::json;

    #[test]
    fn test_insert_last_write_wins() {
        let mut report = Report::new();
        assert!(report.insert("m", "t", Metrics::new(1, None)).is_none());
        let previous = report.insert("m", "t", Metrics::new(2, Some(0)));
        assert_eq!(previous, Some(Metrics::new(1, None)));
        assert_eq!(report.get("m", "t"), Some(&Metrics::new(2, Some(0))));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_serialization_format() {
        let mut report = Report::new();
        report.insert("mod", "t1", Metrics::new(20, None));
        report.insert("mod", "t2", Metrics::new(3, Some(1)));

        let json = report.to_json_pretty().unwrap();
        assert_eq!(
            json,
            "{\n  \"mod\": {\n    \"t1\": {\n      \"query-count\": 20\n    },\n    \"t2\": {\n      \"query-count\": 3,\n      \"duplicates\": 1\n    }\n  }\n}"
        );
    }

    #[test]
    fn test_from_value_validates() {
        let err = Report::from_value(&json!({"m": {"t": {}}})).unwrap_err();
        assert!(err.to_string().contains("query-count"));
    }

    #[test]
    fn test_parse_str_invalid_json() {
        let err = Report::parse_str("").unwrap_err();
        assert!(matches!(err, QueryBenchError::Format(_)));
    }

    #[test]
    fn test_entries_keep_unknown_duplicates() {
        let report = Report::parse_str(r#"{"m": {"t": {"query-count": 2}}}"#).unwrap();
        let entries = report.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].duplicate_count, DuplicateCount::Unknown);
    }

    #[test]
    fn test_empty_modules_count_as_empty() {
        let report = Report::parse_str(r#"{"m": {}}"#).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = Report::new();
        report.insert("m", "t", Metrics::new(5, Some(2)));
        report.save(&path).unwrap();

        assert_eq!(Report::load(&path).unwrap(), report);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Report::load("/nonexistent/report.json").unwrap_err();
        assert!(matches!(err, QueryBenchError::Io { .. }));
    }
}
