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

//! Display names for modules and tests.

/// Turn a dotted module path or test function name into a readable label.
///
/// Package segments named `test` or `tests` are dropped, a leading `test_`
/// prefix is removed from every other segment, and underscores become spaces.
/// This only affects display; report keys are never rewritten.
///
/// # Examples
///
/// ```
/// use querybench_core::humanize;
///
/// assert_eq!(humanize("tests.api.test_something"), "api something");
/// assert_eq!(humanize("test_something_test"), "something test");
/// ```
pub fn humanize(name: &str) -> String {
    let segments: Vec<&str> = name
        .split('.')
        .filter(|segment| !matches!(*segment, "test" | "tests"))
        .map(strip_test_prefix)
        .filter(|segment| !segment.is_empty())
        .collect();

    segments.join(" ").replace('_', " ").trim().to_string()
}

fn strip_test_prefix(segment: &str) -> &str {
    segment
        .strip_prefix("test_")
        .or_else(|| segment.strip_prefix("tests_"))
        .unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_module_path() {
        assert_eq!(humanize("tests.api.test_something"), "api something");
    }

    #[test]
    fn test_trailing_test_word_is_kept() {
        assert_eq!(humanize("test_something_test"), "something test");
    }

    #[test]
    fn test_plain_module_name() {
        assert_eq!(humanize("test_module"), "module");
        assert_eq!(humanize("test_module_123"), "module 123");
    }

    #[test]
    fn test_names_without_prefix_are_untouched() {
        assert_eq!(humanize("books"), "books");
        assert_eq!(humanize("testing_tools"), "testing tools");
    }

    #[test]
    fn test_parametrized_name() {
        assert_eq!(humanize("test_list_books[10]"), "list books[10]");
    }

    #[test]
    fn test_bare_test_segment() {
        assert_eq!(humanize("test"), "");
        assert_eq!(humanize("example.test.test_views"), "example views");
    }
}
