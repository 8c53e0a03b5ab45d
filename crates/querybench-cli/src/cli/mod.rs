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


//! CLI command definitions and argument parsing.
//!
//! Commands are grouped by category:
//!
//! - [`report`]: commands on a single report (show, html, backup)
//! - [`compare`]: commands on two reports (diff)

mod compare;
mod report;

use crate::error::CliError;
use clap::Subcommand;

pub use compare::CompareCommands;
pub use report::ReportCommands;

/// Top-level CLI commands enum.
///
/// ```text
/// Commands
/// ├── Report (show, html, backup)
/// └── Compare (diff)
/// ```
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use querybench_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand)]
pub enum Commands {
    // Report commands - flattened to appear at top level
    #[command(flatten)]
    Report(ReportCommands),

    // Compare commands - flattened to appear at top level
    #[command(flatten)]
    Compare(CompareCommands),
}

impl Commands {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a file cannot be read or written, or if a report or
    /// template is invalid.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            Commands::Report(cmd) => cmd.execute(),
            Commands::Compare(cmd) => cmd.execute(),
        }
    }
}
