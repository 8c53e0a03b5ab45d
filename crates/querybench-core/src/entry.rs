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

//! Validated view over one test's raw result record.
//!
//! A raw report is a JSON object of modules, each an object of tests, each a
//! record holding at least `query-count`. [`Entry::parse`] checks one record
//! and [`iter_entries`] / [`flatten_entries`] walk a whole report in sorted
//! key order so every consumer sees the same stable ordering.

use crate::error::ValidationError;
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder rendered when a report carries no duplicate tracking.
pub const UNKNOWN_MARKER: &str = "UNK";

/// A named field of a test record: its raw report key and display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Key in the raw report (or attribute name for the base field).
    pub key: &'static str,
    /// Human-readable column label.
    pub label: &'static str,
}

/// The test name; not stored inside the record but used as its key.
pub const TEST_NAME_FIELD: Field = Field {
    key: "test_name",
    label: "Test Name",
};

/// Number of executed statements. Required.
pub const QUERY_COUNT_FIELD: Field = Field {
    key: "query-count",
    label: "Queries",
};

/// Number of repeated statements. Optional.
pub const DUPLICATES_FIELD: Field = Field {
    key: "duplicates",
    label: "Duplicated",
};

/// Fields every entry has regardless of its record.
pub const BASE_FIELDS: &[Field] = &[TEST_NAME_FIELD];
/// Fields a record must contain.
pub const REQUIRED_FIELDS: &[Field] = &[QUERY_COUNT_FIELD];
/// Fields a record may contain.
pub const OPTIONAL_FIELDS: &[Field] = &[DUPLICATES_FIELD];
/// All fields in display order.
pub const FIELDS: &[Field] = &[TEST_NAME_FIELD, QUERY_COUNT_FIELD, DUPLICATES_FIELD];

/// Duplicate statement count, or the marker for reports that never tracked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DuplicateCount {
    /// Duplicate tracking was not available when the report was produced.
    Unknown,
    /// Number of statements repeating an earlier one in the same window.
    Known(u64),
}

impl DuplicateCount {
    /// The count, if known.
    pub fn known(self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(n),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u64>> for DuplicateCount {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for DuplicateCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{}", n),
            Self::Unknown => f.write_str(UNKNOWN_MARKER),
        }
    }
}

/// One test's validated measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Module the test belongs to.
    pub module_name: String,
    /// Test name, unique within its module.
    pub test_name: String,
    /// Number of executed statements.
    pub query_count: u64,
    /// Number of duplicated statements.
    pub duplicate_count: DuplicateCount,
}

impl Entry {
    /// Validate one raw test record.
    ///
    /// # Errors
    ///
    /// - [`ValidationErrorKind::Type`](crate::ValidationErrorKind::Type) if
    ///   `raw_data` is not an object, or a count is not a non-negative integer
    /// - [`ValidationErrorKind::MissingField`](crate::ValidationErrorKind::MissingField)
    ///   if `query-count` is absent
    ///
    /// # Examples
    ///
    /// ```
    /// use querybench_core::{DuplicateCount, Entry};
    /// use serde_json::json;
    ///
    /// let entry = Entry::parse("test_list", "test_books", &json!({"query-count": 3})).unwrap();
    /// assert_eq!(entry.query_count, 3);
    /// assert_eq!(entry.duplicate_count, DuplicateCount::Unknown);
    /// ```
    pub fn parse(
        raw_test_name: &str,
        module_name: &str,
        raw_data: &Value,
    ) -> Result<Self, ValidationError> {
        let record = expect_object(raw_data)?;

        let query_count = match record.get(QUERY_COUNT_FIELD.key) {
            Some(value) => expect_count(value)?,
            None => return Err(ValidationError::missing_field(QUERY_COUNT_FIELD.key)),
        };

        let duplicate_count = match record.get(DUPLICATES_FIELD.key) {
            None | Some(Value::Null) => DuplicateCount::Unknown,
            Some(value) => DuplicateCount::Known(expect_count(value)?),
        };

        Ok(Self {
            module_name: module_name.to_string(),
            test_name: raw_test_name.to_string(),
            query_count,
            duplicate_count,
        })
    }

    /// Stringified value of a catalog field.
    pub fn field_value(&self, field: &Field) -> Option<String> {
        match field.key {
            "test_name" => Some(self.test_name.clone()),
            "query-count" => Some(self.query_count.to_string()),
            "duplicates" => Some(self.duplicate_count.to_string()),
            _ => None,
        }
    }
}

/// Entries of one module, in sorted test-name order.
pub type ModuleEntries = (String, Vec<Entry>);

/// Walk a raw report in sorted (module, test) order, validating every record.
///
/// # Errors
///
/// Fails on the first container of the wrong type or invalid record; nothing
/// is returned for a half-valid report.
pub fn iter_entries(raw_report: &Value) -> Result<Vec<ModuleEntries>, ValidationError> {
    let modules = expect_object(raw_report)?;

    let mut module_names: Vec<&String> = modules.keys().collect();
    module_names.sort();

    let mut result = Vec::with_capacity(module_names.len());
    for module_name in module_names {
        let tests = expect_object(&modules[module_name.as_str()])
            .map_err(|e| e.with_context(module_name))?;

        let mut test_names: Vec<&String> = tests.keys().collect();
        test_names.sort();

        let entries = test_names
            .into_iter()
            .map(|test_name| {
                Entry::parse(test_name, module_name, &tests[test_name.as_str()])
                    .map_err(|e| e.with_context(format_args!("{}::{}", module_name, test_name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        result.push((module_name.clone(), entries));
    }

    Ok(result)
}

/// All entries of a raw report as one sorted list.
pub fn flatten_entries(raw_report: &Value) -> Result<Vec<Entry>, ValidationError> {
    Ok(iter_entries(raw_report)?
        .into_iter()
        .flat_map(|(_, entries)| entries)
        .collect())
}

fn expect_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::wrong_type("an object", json_type_name(value)))
}

fn expect_count(value: &Value) -> Result<u64, ValidationError> {
    value
        .as_u64()
        .ok_or_else(|| ValidationError::wrong_type("a non-negative integer", json_type_name(value)))
}

/// JSON type name used in validation messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let entry = Entry::parse("test_a", "mod", &json!({"query-count": 4, "duplicates": 1}))
            .unwrap();
        assert_eq!(entry.module_name, "mod");
        assert_eq!(entry.test_name, "test_a");
        assert_eq!(entry.query_count, 4);
        assert_eq!(entry.duplicate_count, DuplicateCount::Known(1));
    }

    #[test]
    fn test_missing_duplicates_is_unknown_not_zero() {
        let entry = Entry::parse("t", "m", &json!({"query-count": 0})).unwrap();
        assert_eq!(entry.duplicate_count, DuplicateCount::Unknown);
        assert_eq!(entry.duplicate_count.to_string(), "UNK");
        assert_ne!(entry.duplicate_count, DuplicateCount::Known(0));
    }

    #[test]
    fn test_missing_query_count() {
        let err = Entry::parse("t", "m", &json!({})).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
        assert_eq!(err.field.as_deref(), Some("query-count"));
    }

    #[test]
    fn test_record_must_be_object() {
        let err = Entry::parse("t", "m", &json!([1, 2])).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Type);
        assert_eq!(err.message, "Expected an object, got array instead");
    }

    #[test]
    fn test_negative_count_is_type_error() {
        let err = Entry::parse("t", "m", &json!({"query-count": -1})).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Type);
    }

    #[test]
    fn test_string_duplicates_is_type_error() {
        let err = Entry::parse("t", "m", &json!({"query-count": 1, "duplicates": "2"}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Type);
    }

    #[test]
    fn test_field_catalog() {
        assert_eq!(FIELDS.len(), BASE_FIELDS.len() + REQUIRED_FIELDS.len() + OPTIONAL_FIELDS.len());
        let entry = Entry::parse("t", "m", &json!({"query-count": 7})).unwrap();
        let values: Vec<_> = FIELDS.iter().filter_map(|f| entry.field_value(f)).collect();
        assert_eq!(values, vec!["t", "7", "UNK"]);
    }

    #[test]
    fn test_iter_entries_sorted() {
        let report = json!({
            "b_mod": {"z": {"query-count": 1}, "a": {"query-count": 2}},
            "a_mod": {"t": {"query-count": 3}},
        });
        let modules = iter_entries(&report).unwrap();
        let names: Vec<_> = modules.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(names, vec!["a_mod", "b_mod"]);
        let tests: Vec<_> = modules[1].1.iter().map(|e| e.test_name.as_str()).collect();
        assert_eq!(tests, vec!["a", "z"]);
    }

    #[test]
    fn test_iter_entries_rejects_non_object_module() {
        let err = iter_entries(&json!({"m": [1]})).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Type);
        assert!(err.message.starts_with("m: "));
    }

    #[test]
    fn test_flatten_reports_first_error_with_location() {
        let err = flatten_entries(&json!({"m": {"t": {}}})).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
        assert!(err.message.contains("m::t"));
        assert!(err.message.contains("query-count"));
    }

    #[test]
    fn test_flatten_empty_report() {
        assert!(flatten_entries(&json!({})).unwrap().is_empty());
        assert!(flatten_entries(&json!({"m": {}})).unwrap().is_empty());
    }
}
