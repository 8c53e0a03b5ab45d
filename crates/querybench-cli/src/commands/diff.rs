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


//! Diff command - compare two reports

use super::{load_report, write_output};
use crate::error::CliError;
use colored::Colorize;
use querybench_core::{DiffChar, DiffGenerator, Report};

/// Compare two report files and print the per-module differences.
///
/// # Arguments
///
/// * `old` - The earlier report (left side)
/// * `new` - The later report (right side)
///
/// # Errors
///
/// Returns `Err` if either report cannot be read or fails validation.
/// Nothing is printed when either side is invalid.
///
/// # Examples
///
/// ```no_run
/// use querybench_cli::commands::diff;
///
/// # fn main() -> Result<(), querybench_cli::error::CliError> {
/// diff(".pytest-queries.old", ".pytest-queries")?;
/// # Ok(())
/// # }
/// ```
pub fn diff(old: &str, new: &str) -> Result<(), CliError> {
    let old = load_report(old)?;
    let new = load_report(new)?;
    write_output(&format_diff(&old, &new), None)
}

/// Render the diff of two reports as text.
///
/// Every module gets a `# <name>` title followed by the column header and
/// one row per test; modules are separated by a blank line. Rows marked `-`
/// are red and rows marked `+` are green unless colour is disabled.
pub fn format_diff(old: &Report, new: &Report) -> String {
    let generator = DiffGenerator::from_reports(old, new);
    let header = generator.header_rows();
    let mut out = String::new();

    for (i, module) in generator.modules().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("# {}\n", module.name));
        out.push_str(&header);
        out.push('\n');

        for comparison in &module.comparisons {
            let row = comparison.to_row(generator.widths());
            let line = match comparison.diff() {
                DiffChar::Negative => row.red().to_string(),
                DiffChar::Positive => row.green().to_string(),
                DiffChar::Neutral => row,
            };
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_diff_layout() {
        colored::control::set_override(false);

        let old = Report::parse_str(r#"{"test_module": {"test_improved_func": {"query-count": 20}}}"#)
            .unwrap();
        let new = Report::parse_str(
            r#"{"test_module": {"test_improved_func": {"query-count": 19}},
                "another_module": {"test_new_test": {"query-count": 1}}}"#,
        )
        .unwrap();

        assert_eq!(
            format_diff(&old, &new),
            "# another module\n\
             \x20 test name         \tleft count \tright count\tduplicate count\n\
             \x20 ------------------\t-----------\t-----------\t---------------\n\
             + new test          \t          -\t          1\t            UNK\n\
             \n\
             # module\n\
             \x20 test name         \tleft count \tright count\tduplicate count\n\
             \x20 ------------------\t-----------\t-----------\t---------------\n\
             + improved func     \t         20\t         19\t            UNK\n"
        );
    }

    #[test]
    fn test_format_diff_of_empty_reports() {
        assert_eq!(format_diff(&Report::new(), &Report::new()), "");
    }
}
