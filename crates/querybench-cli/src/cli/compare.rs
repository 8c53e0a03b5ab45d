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


//! Commands comparing two reports.

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;

/// Report comparison commands.
#[derive(Subcommand)]
pub enum CompareCommands {
    /// Show the query count differences between two reports
    ///
    /// Rows starting with `-` got worse (more queries or removed), rows
    /// starting with `+` got better (fewer queries or added).
    Diff {
        /// Earlier report
        #[arg(value_name = "OLD")]
        old: String,

        /// Later report
        #[arg(value_name = "NEW")]
        new: String,
    },
}

impl CompareCommands {
    /// Execute the compare command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            CompareCommands::Diff { old, new } => commands::diff(&old, &new),
        }
    }
}
