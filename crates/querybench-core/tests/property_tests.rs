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

//! Property-based tests for reports and the diff engine.
//!
//! - Round-trip: serializing a report and reading it back yields the same entries
//! - Antisymmetry: swapping old and new flips `+` and `-`
//! - Presence: tests only in the new report are `+`, only in the old one `-`
//! - Alignment: column widths fit every label and every cell

use proptest::prelude::*;
use querybench_core::{
    DiffChar, DiffGenerator, Entry, Metrics, Report, SingleEntryComparison, ValidationErrorKind,
};
use std::collections::BTreeMap;

// ===== Generators =====

fn name() -> impl Strategy<Value = String> {
    prop::string::string_regex("(tests\\.)?(test_)?[a-z][a-z0-9_]{0,15}")
        .expect("Failed to create name regex")
}

fn metrics() -> impl Strategy<Value = Metrics> {
    (0u64..10_000, prop::option::of(0u64..100)).prop_map(|(q, d)| Metrics::new(q, d))
}

fn report() -> impl Strategy<Value = Report> {
    prop::collection::btree_map(
        name(),
        prop::collection::btree_map(name(), metrics(), 0..6),
        0..5,
    )
    .prop_map(|modules: BTreeMap<String, BTreeMap<String, Metrics>>| {
        let mut report = Report::new();
        for (module, tests) in modules {
            for (test, m) in tests {
                report.insert(module.clone(), test, m);
            }
        }
        report
    })
}

fn entry(count: u64) -> Entry {
    Entry {
        module_name: "m".to_string(),
        test_name: "t".to_string(),
        query_count: count,
        duplicate_count: None::<u64>.into(),
    }
}

fn classify(left: Option<u64>, right: Option<u64>) -> DiffChar {
    SingleEntryComparison::new(left.map(entry), right.map(entry))
        .expect("one side present")
        .diff()
}

// ===== Properties =====

proptest! {
    #[test]
    fn prop_report_round_trip(report in report()) {
        let json = report.to_json_pretty().unwrap();
        let parsed = Report::parse_str(&json).unwrap();
        prop_assert_eq!(parsed.entries(), report.entries());
    }

    #[test]
    fn prop_diff_is_antisymmetric(a in 0u64..1000, b in 0u64..1000) {
        prop_assume!(a != b);
        let forward = classify(Some(a), Some(b));
        let backward = classify(Some(b), Some(a));
        prop_assert_eq!(forward == DiffChar::Negative, backward == DiffChar::Positive);
        prop_assert_eq!(forward == DiffChar::Positive, backward == DiffChar::Negative);
    }

    #[test]
    fn prop_presence_classification(count in 0u64..1000) {
        prop_assert_eq!(classify(None, Some(count)), DiffChar::Positive);
        prop_assert_eq!(classify(Some(count), None), DiffChar::Negative);
        prop_assert_eq!(classify(Some(count), Some(count)), DiffChar::Neutral);
    }

    #[test]
    fn prop_widths_fit_every_cell(old in report(), new in report()) {
        let generator = DiffGenerator::from_reports(&old, &new);
        let widths = *generator.widths();

        prop_assert!(widths.test_name >= "test name".len());
        prop_assert!(widths.query_count >= "right count".len());
        prop_assert!(widths.duplicate_count >= "duplicate count".len());

        for module in generator.modules() {
            for comparison in &module.comparisons {
                prop_assert!(comparison.test_name().chars().count() <= widths.test_name);
                prop_assert!(comparison.test().test_name.chars().count() <= widths.test_name);
                prop_assert!(comparison.left_count().len() <= widths.query_count);
                prop_assert!(comparison.right_count().len() <= widths.query_count);
                prop_assert!(comparison.duplicate_count().len() <= widths.duplicate_count);
            }
        }
    }

    #[test]
    fn prop_diff_covers_union_of_tests(old in report(), new in report()) {
        let generator = DiffGenerator::from_reports(&old, &new);
        let mut keys: Vec<(String, String)> = old
            .entries()
            .into_iter()
            .chain(new.entries())
            .map(|e| (e.module_name, e.test_name))
            .collect();
        keys.sort();
        keys.dedup();

        let total: usize = generator.modules().iter().map(|m| m.comparisons.len()).sum();
        prop_assert_eq!(total, keys.len());
    }

    #[test]
    fn prop_record_without_query_count_is_rejected(dups in 0u64..10) {
        let raw = serde_json::json!({"m": {"t": {"duplicates": dups}}});
        let err = Report::from_value(&raw).unwrap_err();
        prop_assert_eq!(err.kind, ValidationErrorKind::MissingField);
    }
}
