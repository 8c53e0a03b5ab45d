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


//! querybench CLI library.
//!
//! # Commands
//!
//! - **show**: print a report as a nested table
//! - **html**: export a report as an HTML page, optionally through a custom template
//! - **diff**: compare two reports module by module
//! - **backup**: copy the current report aside
//!
//! # Exit codes
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | success                                        |
//! | 1    | a report failed validation                     |
//! | 2    | usage error, unreadable file, invalid JSON or template |
//!
//! # Examples
//!
//! ```no_run
//! use querybench_cli::commands::{diff, show};
//!
//! # fn main() -> Result<(), querybench_cli::error::CliError> {
//! show(".pytest-queries")?;
//! diff(".pytest-queries.old", ".pytest-queries")?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
