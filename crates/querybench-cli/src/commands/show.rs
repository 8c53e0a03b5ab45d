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


//! Show command - print a report as a table

use super::{load_report, write_output};
use crate::error::CliError;
use querybench_render::render_table;

/// Print a report as a nested module/test table.
///
/// Prints nothing for a report without tests.
///
/// # Errors
///
/// Returns `Err` if the report cannot be read or fails validation.
pub fn show(file: &str) -> Result<(), CliError> {
    let report = load_report(file)?;
    let table = render_table(&report);
    if table.is_empty() {
        return Ok(());
    }
    write_output(&format!("{}\n", table), None)
}
