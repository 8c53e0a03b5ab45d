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

//! Comparison of two reports.
//!
//! [`DiffGenerator`] pairs every test of an old report (left) with the same
//! test of a new report (right), groups the pairs by module and renders them
//! as column-aligned rows:
//!
//! ```text
//!   test name     	left count 	right count	duplicate count
//!   --------------	-----------	-----------	---------------
//! - degraded func 	         15	         16	            UNK
//! + improved func 	         20	         19	            UNK
//!   unchanged func	          1	          1	            UNK
//! ```
//!
//! Each row starts with its classification: `+` for fewer queries or a new
//! test, `-` for more queries or a removed test, a space when unchanged.
//! Duplicate counts are shown but never affect the classification.

use crate::entry::{Entry, Field, DUPLICATES_FIELD, QUERY_COUNT_FIELD, TEST_NAME_FIELD};
use crate::humanize::humanize;
use crate::report::Report;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder for a count missing on one side.
pub const NA_CHAR: &str = "-";

const ROW_PREFIX: &str = "  ";
const COLUMN_SEPARATOR: &str = "\t";

/// Per-test classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffChar {
    /// Fewer queries, or a test that only exists in the new report.
    Positive,
    /// More queries, or a test that only exists in the old report.
    Negative,
    /// Same number of queries.
    Neutral,
}

impl DiffChar {
    /// Classify a `right - left` ordering.
    pub fn from_ordering(right_vs_left: Ordering) -> Self {
        match right_vs_left {
            Ordering::Less => Self::Positive,
            Ordering::Greater => Self::Negative,
            Ordering::Equal => Self::Neutral,
        }
    }

    /// The row prefix character.
    pub fn as_char(self) -> char {
        match self {
            Self::Positive => '+',
            Self::Negative => '-',
            Self::Neutral => ' ',
        }
    }
}

impl fmt::Display for DiffChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Alignment of a diff column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// A displayed diff column and the catalog field its width is shared with.
#[derive(Debug, Clone, Copy)]
struct RowField {
    label: &'static str,
    align: Align,
    width_of: Field,
}

const ROW_FIELDS: [RowField; 4] = [
    RowField {
        label: "test name",
        align: Align::Left,
        width_of: TEST_NAME_FIELD,
    },
    RowField {
        label: "left count",
        align: Align::Right,
        width_of: QUERY_COUNT_FIELD,
    },
    RowField {
        label: "right count",
        align: Align::Right,
        width_of: QUERY_COUNT_FIELD,
    },
    RowField {
        label: "duplicate count",
        align: Align::Right,
        width_of: DUPLICATES_FIELD,
    },
];

/// Column widths shared by every row of a diff.
///
/// The left and right count columns share one width so numbers line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    /// Width of the test name column.
    pub test_name: usize,
    /// Width of both count columns.
    pub query_count: usize,
    /// Width of the duplicate count column.
    pub duplicate_count: usize,
}

impl ColumnWidths {
    /// Widths that fit the header labels alone.
    pub fn from_labels() -> Self {
        let mut widths = Self {
            test_name: 0,
            query_count: 0,
            duplicate_count: 0,
        };
        for field in &ROW_FIELDS {
            widths.widen(field.width_of, field.label.chars().count());
        }
        widths
    }

    /// Width of the column group a catalog field belongs to.
    pub fn of(&self, field: Field) -> usize {
        match field.key {
            "test_name" => self.test_name,
            "query-count" => self.query_count,
            _ => self.duplicate_count,
        }
    }

    fn widen(&mut self, field: Field, len: usize) {
        let slot = match field.key {
            "test_name" => &mut self.test_name,
            "query-count" => &mut self.query_count,
            _ => &mut self.duplicate_count,
        };
        *slot = (*slot).max(len);
    }

    /// Grow the widths to fit every cell of `comparison`.
    ///
    /// The test-name column is sized on the raw test name, which is never
    /// shorter than its humanized form.
    pub fn fit(&mut self, comparison: &SingleEntryComparison) {
        for (field, cell) in ROW_FIELDS.iter().zip(comparison.cells()) {
            self.widen(field.width_of, cell.chars().count());
        }
        self.test_name = self
            .test_name
            .max(comparison.test().test_name.chars().count());
    }

    /// The two-line header: padded labels and a dash separator.
    pub fn header(&self) -> String {
        let head: Vec<String> = ROW_FIELDS
            .iter()
            .map(|field| format!("{:<width$}", field.label, width = self.of(field.width_of)))
            .collect();
        let sep: Vec<String> = ROW_FIELDS
            .iter()
            .map(|field| "-".repeat(self.of(field.width_of)))
            .collect();

        format!(
            "{prefix}{}\n{prefix}{}",
            head.join(COLUMN_SEPARATOR),
            sep.join(COLUMN_SEPARATOR),
            prefix = ROW_PREFIX
        )
    }
}

/// One test's old and new measurement. At least one side is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleEntryComparison {
    left: Option<Entry>,
    right: Option<Entry>,
}

impl SingleEntryComparison {
    /// Pair two sides; `None` when both are absent.
    pub fn new(left: Option<Entry>, right: Option<Entry>) -> Option<Self> {
        if left.is_none() && right.is_none() {
            return None;
        }
        Some(Self { left, right })
    }

    /// The old measurement.
    pub fn left(&self) -> Option<&Entry> {
        self.left.as_ref()
    }

    /// The new measurement.
    pub fn right(&self) -> Option<&Entry> {
        self.right.as_ref()
    }

    /// Whichever side is present, preferring the old one.
    pub fn test(&self) -> &Entry {
        match (&self.left, &self.right) {
            (Some(entry), _) | (None, Some(entry)) => entry,
            (None, None) => unreachable!("comparison always holds at least one entry"),
        }
    }

    /// Classification of this test.
    pub fn diff(&self) -> DiffChar {
        match (&self.left, &self.right) {
            (None, _) => DiffChar::Positive,
            (_, None) => DiffChar::Negative,
            (Some(left), Some(right)) => {
                DiffChar::from_ordering(right.query_count.cmp(&left.query_count))
            }
        }
    }

    /// Humanized test name.
    pub fn test_name(&self) -> String {
        humanize(&self.test().test_name)
    }

    /// Old query count or [`NA_CHAR`].
    pub fn left_count(&self) -> String {
        count_or_na(self.left.as_ref())
    }

    /// New query count or [`NA_CHAR`].
    pub fn right_count(&self) -> String {
        count_or_na(self.right.as_ref())
    }

    /// Duplicate count of the newest side present; `UNK` when untracked.
    pub fn duplicate_count(&self) -> String {
        match (&self.right, &self.left) {
            (Some(entry), _) | (None, Some(entry)) => entry.duplicate_count.to_string(),
            (None, None) => NA_CHAR.to_string(),
        }
    }

    fn cells(&self) -> [String; 4] {
        [
            self.test_name(),
            self.left_count(),
            self.right_count(),
            self.duplicate_count(),
        ]
    }

    /// Render the row, prefixed by its classification.
    pub fn to_row(&self, widths: &ColumnWidths) -> String {
        let cols: Vec<String> = ROW_FIELDS
            .iter()
            .zip(self.cells())
            .map(|(field, cell)| {
                let width = widths.of(field.width_of);
                match field.align {
                    Align::Left => format!("{:<width$}", cell, width = width),
                    Align::Right => format!("{:>width$}", cell, width = width),
                }
            })
            .collect();

        format!("{} {}", self.diff(), cols.join(COLUMN_SEPARATOR))
    }
}

fn count_or_na(entry: Option<&Entry>) -> String {
    entry.map_or_else(|| NA_CHAR.to_string(), |e| e.query_count.to_string())
}

/// The comparisons of one module.
#[derive(Debug, Clone)]
pub struct ModuleDiff {
    /// Module key as stored in the reports.
    pub raw_name: String,
    /// Humanized module name.
    pub name: String,
    /// Comparisons sorted by raw test name.
    pub comparisons: Vec<SingleEntryComparison>,
}

impl ModuleDiff {
    /// Header followed by one rendered row per test.
    pub fn lines(&self, widths: &ColumnWidths) -> Vec<String> {
        std::iter::once(widths.header())
            .chain(self.comparisons.iter().map(|c| c.to_row(widths)))
            .collect()
    }
}

#[derive(Default)]
struct Pair {
    left: Option<Entry>,
    right: Option<Entry>,
}

/// Groups comparisons by module and renders them with shared column widths.
#[derive(Debug, Clone)]
pub struct DiffGenerator {
    modules: Vec<ModuleDiff>,
    widths: ColumnWidths,
}

impl DiffGenerator {
    /// Compare two flattened entry lists (old on the left, new on the right).
    pub fn new(entries_left: Vec<Entry>, entries_right: Vec<Entry>) -> Self {
        let mut mapping: BTreeMap<String, BTreeMap<String, Pair>> = BTreeMap::new();

        for entry in entries_left {
            let (module, test) = (entry.module_name.clone(), entry.test_name.clone());
            mapping.entry(module).or_default().entry(test).or_default().left = Some(entry);
        }
        for entry in entries_right {
            let (module, test) = (entry.module_name.clone(), entry.test_name.clone());
            mapping.entry(module).or_default().entry(test).or_default().right = Some(entry);
        }

        let mut widths = ColumnWidths::from_labels();
        let mut modules: Vec<ModuleDiff> = mapping
            .into_iter()
            .map(|(raw_name, tests)| {
                let comparisons: Vec<SingleEntryComparison> = tests
                    .into_values()
                    .filter_map(|pair| SingleEntryComparison::new(pair.left, pair.right))
                    .collect();
                for comparison in &comparisons {
                    widths.fit(comparison);
                }
                ModuleDiff {
                    name: humanize(&raw_name),
                    raw_name,
                    comparisons,
                }
            })
            .collect();

        // Stable sort: modules humanizing to the same label keep raw-key order.
        modules.sort_by(|a, b| a.name.cmp(&b.name));

        Self { modules, widths }
    }

    /// Compare two validated reports.
    pub fn from_reports(old: &Report, new: &Report) -> Self {
        Self::new(old.entries(), new.entries())
    }

    /// Column widths used by every module.
    pub fn widths(&self) -> &ColumnWidths {
        &self.widths
    }

    /// The header block shared by every module.
    pub fn header_rows(&self) -> String {
        self.widths.header()
    }

    /// Modules sorted by humanized name.
    pub fn modules(&self) -> &[ModuleDiff] {
        &self.modules
    }

    /// `(humanized module name, lines)` for every module.
    pub fn iter_lines(&self) -> impl Iterator<Item = (&str, Vec<String>)> + '_ {
        self.modules
            .iter()
            .map(move |module| (module.name.as_str(), module.lines(&self.widths)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DuplicateCount;

    fn entry(module: &str, test: &str, count: u64) -> Entry {
        Entry {
            module_name: module.to_string(),
            test_name: test.to_string(),
            query_count: count,
            duplicate_count: DuplicateCount::Unknown,
        }
    }

    #[test]
    fn test_comparison_requires_one_side() {
        assert!(SingleEntryComparison::new(None, None).is_none());
    }

    #[test]
    fn test_classification() {
        let cmp = |l: Option<u64>, r: Option<u64>| {
            SingleEntryComparison::new(l.map(|n| entry("m", "t", n)), r.map(|n| entry("m", "t", n)))
                .unwrap()
                .diff()
        };
        assert_eq!(cmp(Some(20), Some(19)), DiffChar::Positive);
        assert_eq!(cmp(Some(15), Some(16)), DiffChar::Negative);
        assert_eq!(cmp(Some(1), Some(1)), DiffChar::Neutral);
        assert_eq!(cmp(None, Some(1)), DiffChar::Positive);
        assert_eq!(cmp(Some(1), None), DiffChar::Negative);
    }

    #[test]
    fn test_duplicates_do_not_affect_classification() {
        let mut left = entry("m", "t", 3);
        left.duplicate_count = DuplicateCount::Known(0);
        let mut right = entry("m", "t", 3);
        right.duplicate_count = DuplicateCount::Known(2);

        let cmp = SingleEntryComparison::new(Some(left), Some(right)).unwrap();
        assert_eq!(cmp.diff(), DiffChar::Neutral);
        assert_eq!(cmp.duplicate_count(), "2");
    }

    #[test]
    fn test_missing_side_placeholders() {
        let cmp = SingleEntryComparison::new(None, Some(entry("m", "test_added_func", 1))).unwrap();
        assert_eq!(cmp.left_count(), "-");
        assert_eq!(cmp.right_count(), "1");
        assert_eq!(cmp.duplicate_count(), "UNK");
        assert_eq!(cmp.test_name(), "added func");
    }

    #[test]
    fn test_label_widths() {
        let widths = ColumnWidths::from_labels();
        assert_eq!(widths.test_name, "test name".len());
        assert_eq!(widths.query_count, "right count".len());
        assert_eq!(widths.duplicate_count, "duplicate count".len());
    }

    #[test]
    fn test_header_rows() {
        let generator = DiffGenerator::new(vec![entry("m", "test_a", 1)], vec![]);
        assert_eq!(
            generator.header_rows(),
            "  test name\tleft count \tright count\tduplicate count\n  ---------\t-----------\t-----------\t---------------"
        );
    }

    #[test]
    fn test_row_rendering() {
        let generator = DiffGenerator::new(
            vec![entry("test_module", "test_deleted_func", 1)],
            vec![],
        );
        let lines = generator.modules()[0].lines(generator.widths());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "- deleted func     \t          1\t          -\t            UNK");
    }

    #[test]
    fn test_modules_sorted_by_humanized_name() {
        let generator = DiffGenerator::new(
            vec![entry("test_zeta", "t", 1), entry("alpha", "t", 1)],
            vec![entry("test_beta", "t", 1)],
        );
        let names: Vec<_> = generator.modules().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_widths_cover_long_names() {
        let long = "test_a_really_long_function_name_for_width";
        let generator = DiffGenerator::new(vec![], vec![entry("m", long, 123_456_789_012)]);
        let widths = generator.widths();
        assert_eq!(widths.test_name, long.len());
        assert_eq!(widths.query_count, "123456789012".len());
    }
}
