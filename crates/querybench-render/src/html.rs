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

//! HTML export through Jinja templates.
//!
//! Templates are rendered with [`minijinja`] and see the following context:
//!
//! | Name       | Value                                                        |
//! |------------|--------------------------------------------------------------|
//! | `data`     | list of `(module_name, tests)` pairs, sorted by module name  |
//! | `humanize` | function turning a raw name into its display form            |
//!
//! Every test in `tests` exposes `module_name`, `test_name`, `query-count`
//! (reachable as `test_entry['query-count']`) and `duplicates` (`UNK` when
//! unknown). Names are raw; pass them through `humanize` for display.
//!
//! Output is HTML-escaped.

use minijinja::{context, Environment};
use querybench_core::{humanize, Entry, Report};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.html");

/// Name the template is registered under. The `.html` suffix turns on
/// HTML auto-escaping.
const TEMPLATE_NAME: &str = "report.html";

/// A template that could not be parsed or rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template error{}: {message}", at_line(.line))]
pub struct TemplateError {
    /// Line of the offending construct (1-based), when known.
    pub line: Option<usize>,
    /// What is wrong with it.
    pub message: String,
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" at line {}", line))
        .unwrap_or_default()
}

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        Self {
            line: err.line(),
            message: err
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| err.kind().to_string()),
        }
    }
}

#[derive(Serialize)]
struct TestContext<'a> {
    module_name: &'a str,
    test_name: &'a str,
    #[serde(rename = "query-count")]
    query_count: u64,
    duplicates: String,
}

impl<'a> From<&'a Entry> for TestContext<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            module_name: &entry.module_name,
            test_name: &entry.test_name,
            query_count: entry.query_count,
            duplicates: entry.duplicate_count.to_string(),
        }
    }
}

/// A compiled HTML template.
#[derive(Debug, Clone)]
pub struct HtmlTemplate {
    env: Environment<'static>,
}

impl HtmlTemplate {
    /// Compile template source.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the source is not valid Jinja syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use querybench_render::HtmlTemplate;
    ///
    /// assert!(HtmlTemplate::parse("{% for name, tests in data %}{{ name }}{% endfor %}").is_ok());
    ///
    /// let err = HtmlTemplate::parse("<p>\n{% for %}").unwrap_err();
    /// assert_eq!(err.line, Some(2));
    /// ```
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_function("humanize", humanize);
        env.add_template_owned(TEMPLATE_NAME, source.to_string())?;
        Ok(Self { env })
    }

    /// Render a report.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when evaluation fails, for instance when the
    /// template calls something that is not callable.
    pub fn render(&self, report: &Report) -> Result<String, TemplateError> {
        let modules = report.module_entries();
        debug!(modules = modules.len(), "rendering HTML report");

        let data: Vec<(&str, Vec<TestContext<'_>>)> = modules
            .iter()
            .map(|(module, entries)| {
                (module.as_str(), entries.iter().map(TestContext::from).collect())
            })
            .collect();

        let template = self.env.get_template(TEMPLATE_NAME)?;
        Ok(template.render(context! { data => data })?)
    }
}

impl Default for HtmlTemplate {
    /// The bundled Bootstrap page.
    fn default() -> Self {
        Self::parse(DEFAULT_TEMPLATE).expect("bundled template is valid")
    }
}

/// Render a report with the given template.
///
/// # Errors
///
/// See [`HtmlTemplate::render`].
pub fn render_html(report: &Report, template: &HtmlTemplate) -> Result<String, TemplateError> {
    template.render(report)
}
