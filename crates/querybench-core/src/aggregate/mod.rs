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

//! Session-wide result aggregation.
//!
//! Test workers are separate processes with no shared memory. Each one appends
//! its measurements to its own scratch file inside a directory the
//! coordinating process created at session start; at session end the
//! coordinator merges those files into one report.
//!
//! ```text
//! coordinator ── start ──> scratch dir ──(env)──> workers
//!                              ▲                     │
//!                              └── <worker>.tsv <────┘ add_entry
//! coordinator ── finish ──> merge ──> backup? ──> report.json
//! ```
//!
//! # Ordering
//!
//! - Scratch writes are append-only, so one worker's lines stay in the order
//!   they were recorded.
//! - Files are merged in file-name order; a test reported by two workers is a
//!   [`ConflictingEntry`](crate::QueryBenchError::ConflictingEntry) error.
//! - Only the owning worker writes its file; only the coordinator reads and
//!   removes the directory, after every worker is done.

mod scratch;
mod store;

pub use scratch::{decode_all, DecodedScratch, ScratchLine, ScratchLineError, SCRATCH_EXTENSION};
pub use store::{FinishOutcome, MergeOutcome, SessionCoordinator, WorkerRecorder};
