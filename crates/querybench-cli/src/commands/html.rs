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


//! HTML command - export a report as an HTML page

use super::{load_report, read_file, write_output};
use crate::error::CliError;
use querybench_render::{render_html, HtmlTemplate};

/// Stands in for a template path in errors raised by the bundled page.
const BUNDLED_TEMPLATE: &str = "<bundled template>";

/// Render a report to HTML.
///
/// # Arguments
///
/// * `file` - The report to render
/// * `output` - Output file; stdout when `None` or `-`
/// * `template` - Custom template file; the bundled page when `None`
///
/// # Errors
///
/// Returns `Err` if:
/// - The report cannot be read or fails validation
/// - The template cannot be read, parsed or rendered
/// - The output cannot be written
///
/// # Examples
///
/// ```no_run
/// use querybench_cli::commands::html;
///
/// # fn main() -> Result<(), querybench_cli::error::CliError> {
/// html(".pytest-queries", Some("results.html"), None)?;
/// # Ok(())
/// # }
/// ```
pub fn html(file: &str, output: Option<&str>, template: Option<&str>) -> Result<(), CliError> {
    let (template, template_path) = match template {
        Some(path) => (
            HtmlTemplate::parse(&read_file(path)?).map_err(|e| CliError::template(path, e))?,
            path,
        ),
        None => (HtmlTemplate::default(), BUNDLED_TEMPLATE),
    };

    let report = load_report(file)?;
    let page =
        render_html(&report, &template).map_err(|e| CliError::template(template_path, e))?;
    write_output(&page, output)
}
