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


//! Commands operating on one report.

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;

/// Single-report commands.
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Show a report as a table
    Show {
        /// Report file
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Export a report as an HTML page
    ///
    /// Uses the bundled Bootstrap page unless a template is given. Templates
    /// are Jinja and receive `data` (module name, tests) pairs and a
    /// `humanize` function.
    Html {
        /// Report file
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (`-` or absent for stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Custom template file
        #[arg(short, long, value_name = "TEMPLATE")]
        template: Option<String>,
    },

    /// Copy the current report to a backup file
    Backup {
        /// Backup destination (defaults to `<report>.old`)
        #[arg(value_name = "TARGET")]
        target: Option<String>,

        /// Report to back up (defaults to `QUERYBENCH_SAVE_PATH` or `.pytest-queries`)
        #[arg(short, long, value_name = "FILE")]
        report: Option<String>,
    },
}

impl ReportCommands {
    /// Execute the report command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            ReportCommands::Show { file } => commands::show(&file),
            ReportCommands::Html {
                file,
                output,
                template,
            } => commands::html(&file, output.as_deref(), template.as_deref()),
            ReportCommands::Backup { target, report } => {
                commands::backup(target.as_deref(), report.as_deref())
            }
        }
    }
}
