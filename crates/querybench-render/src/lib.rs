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


//! Rendering of querybench reports.
//!
//! - [`render_table`]: nested ASCII tables for the terminal, drawn with `prettytable`
//! - [`render_html`]: an HTML page through a Jinja [`HtmlTemplate`]
//!
//! # Examples
//!
//! ```
//! use querybench_core::Report;
//! use querybench_render::{render_html, render_table, HtmlTemplate};
//!
//! let report = Report::parse_str(r#"{"test_books": {"test_list": {"query-count": 3}}}"#).unwrap();
//!
//! let table = render_table(&report);
//! assert!(table.contains("| test_list "));
//!
//! let html = render_html(&report, &HtmlTemplate::default()).unwrap();
//! assert!(html.contains("<strong>3</strong>"));
//! ```

pub mod html;
pub mod table;

pub use html::{render_html, HtmlTemplate, TemplateError};
pub use table::render_table;
