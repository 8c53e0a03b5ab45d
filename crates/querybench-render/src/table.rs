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

//! Plain-text tables for terminal output.
//!
//! [`render_table`] prints one row per module with the module's tests in a
//! nested table:
//!
//! ```text
//! +--------+--------------------------------------+
//! | Module | Tests                                |
//! +========+======================================+
//! | m      | +-----------+---------+------------+ |
//! |        | | Test Name | Queries | Duplicated | |
//! |        | +===========+=========+============+ |
//! |        | | t         | 3       | UNK        | |
//! |        | +-----------+---------+------------+ |
//! +--------+--------------------------------------+
//! ```

use prettytable::{Cell, Row, Table};
use querybench_core::{Entry, Report, FIELDS};

const OUTER_HEADERS: [&str; 2] = ["Module", "Tests"];

fn title_row<'a>(labels: impl IntoIterator<Item = &'a str>) -> Row {
    Row::new(labels.into_iter().map(Cell::new).collect())
}

fn tests_table(entries: &[Entry]) -> Table {
    let mut table = Table::new();
    table.set_titles(title_row(FIELDS.iter().map(|field| field.label)));
    for entry in entries {
        let cells: Vec<Cell> = FIELDS
            .iter()
            .map(|field| Cell::new(&entry.field_value(field).unwrap_or_default()))
            .collect();
        table.add_row(Row::new(cells));
    }
    table
}

/// Render a report as a module table with one nested test table per module.
///
/// An empty report renders as an empty string. The result carries no
/// trailing newline.
pub fn render_table(report: &Report) -> String {
    if report.is_empty() {
        return String::new();
    }

    let mut table = Table::new();
    table.set_titles(title_row(OUTER_HEADERS));
    for (module, entries) in report.module_entries() {
        let tests = tests_table(&entries).to_string();
        table.add_row(Row::new(vec![Cell::new(&module), Cell::new(&tests)]));
    }
    table.to_string().trim_end_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use querybench_core::Metrics;

    #[test]
    fn test_render_report_nests_tests() {
        let mut report = Report::new();
        report.insert("m", "t", Metrics::new(3, None));

        let expected = [
            "+--------+--------------------------------------+",
            "| Module | Tests                                |",
            "+========+======================================+",
            "| m      | +-----------+---------+------------+ |",
            "|        | | Test Name | Queries | Duplicated | |",
            "|        | +===========+=========+============+ |",
            "|        | | t         | 3       | UNK        | |",
            "|        | +-----------+---------+------------+ |",
            "+--------+--------------------------------------+",
        ];
        let rendered = render_table(&report);
        assert_eq!(rendered.lines().collect::<Vec<_>>(), expected);
        assert!(!rendered.ends_with('\n'));
    }

    #[test]
    fn test_rows_between_modules_are_separated() {
        let mut report = Report::new();
        report.insert("a", "t", Metrics::new(1, Some(0)));
        report.insert("b", "t", Metrics::new(2, Some(0)));

        let rendered = render_table(&report);
        let borders = rendered
            .lines()
            .filter(|line| line.starts_with("+-"))
            .count();
        // top, between the two modules, bottom
        assert_eq!(borders, 3);
    }

    #[test]
    fn test_render_report_sorted_modules() {
        let mut report = Report::new();
        report.insert("zeta", "t", Metrics::new(1, Some(0)));
        report.insert("alpha", "t", Metrics::new(2, Some(1)));

        let rendered = render_table(&report);
        let alpha = rendered.find("alpha").unwrap();
        let zeta = rendered.find("zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_empty_report_renders_nothing() {
        assert_eq!(render_table(&Report::new()), "");
    }
}
