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

//! Per-worker scratch record format.
//!
//! One line per measurement:
//!
//! ```text
//! module \t test \t query_count \t duplicate_count \n
//! ```
//!
//! An unknown duplicate count is written as `-`. Backslash, tab and newline
//! inside names are escaped so a name can never split a line.

use std::fmt;
use thiserror::Error;

/// Extension of scratch files inside the scratch directory.
pub const SCRATCH_EXTENSION: &str = "tsv";

const UNKNOWN_DUPLICATES: &str = "-";
const FIELD_COUNT: usize = 4;

/// One decoded scratch line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchLine {
    pub module: String,
    pub test: String,
    pub query_count: u64,
    pub duplicate_count: Option<u64>,
}

/// A scratch line that could not be decoded, typically a partial write left
/// behind by a killed worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScratchLineError {
    #[error("expected 4 tab-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field} value '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid escape sequence in '{0}'")]
    InvalidEscape(String),
    #[error("line is not newline-terminated")]
    Truncated,
}

impl ScratchLine {
    /// Encode as a newline-terminated line.
    pub fn encode(&self) -> String {
        let duplicates = self
            .duplicate_count
            .map_or_else(|| UNKNOWN_DUPLICATES.to_string(), |n| n.to_string());
        format!(
            "{}\t{}\t{}\t{}\n",
            escape(&self.module),
            escape(&self.test),
            self.query_count,
            duplicates
        )
    }

    /// Decode one line, without its terminating newline.
    pub fn decode(line: &str) -> Result<Self, ScratchLineError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != FIELD_COUNT {
            return Err(ScratchLineError::FieldCount(fields.len()));
        }

        let query_count = parse_number("query_count", fields[2])?;
        let duplicate_count = match fields[3] {
            UNKNOWN_DUPLICATES => None,
            value => Some(parse_number("duplicate_count", value)?),
        };

        Ok(Self {
            module: unescape(fields[0])?,
            test: unescape(fields[1])?,
            query_count,
            duplicate_count,
        })
    }
}

impl fmt::Display for ScratchLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.test)
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u64, ScratchLineError> {
    value.parse().map_err(|_| ScratchLineError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> Result<String, ScratchLineError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            _ => return Err(ScratchLineError::InvalidEscape(value.to_string())),
        }
    }
    Ok(out)
}

/// Result of decoding a whole scratch file.
#[derive(Debug, Default)]
pub struct DecodedScratch {
    /// Valid lines in file order.
    pub lines: Vec<ScratchLine>,
    /// `(1-based line number, error)` for every skipped line.
    pub skipped: Vec<(usize, ScratchLineError)>,
}

/// Decode a scratch file's contents, skipping malformed lines.
///
/// A final line without its newline is a write cut short and is always
/// skipped, even if its fields happen to parse.
pub fn decode_all(content: &str) -> DecodedScratch {
    let mut decoded = DecodedScratch::default();
    let complete = content.ends_with('\n');
    let raw_lines: Vec<&str> = content.lines().collect();
    let last = raw_lines.len();

    for (idx, raw) in raw_lines.into_iter().enumerate() {
        let line_no = idx + 1;
        if raw.is_empty() {
            continue;
        }
        if line_no == last && !complete {
            decoded.skipped.push((line_no, ScratchLineError::Truncated));
            continue;
        }
        match ScratchLine::decode(raw) {
            Ok(line) => decoded.lines.push(line),
            Err(e) => decoded.skipped.push((line_no, e)),
        }
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(module: &str, test: &str, count: u64, dups: Option<u64>) -> ScratchLine {
        ScratchLine {
            module: module.to_string(),
            test: test.to_string(),
            query_count: count,
            duplicate_count: dups,
        }
    }

    #[test]
    fn test_encode_format() {
        assert_eq!(line("mod", "test_a", 3, Some(1)).encode(), "mod\ttest_a\t3\t1\n");
        assert_eq!(line("mod", "test_a", 3, None).encode(), "mod\ttest_a\t3\t-\n");
    }

    #[test]
    fn test_names_with_separators_survive() {
        let original = line("pkg.mod", "test_x[a\tb\\c\nd]", 1, Some(0));
        let encoded = original.encode();
        assert_eq!(encoded.matches('\n').count(), 1);
        let decoded = ScratchLine::decode(encoded.trim_end_matches('\n')).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            ScratchLine::decode("mod\ttest\t3"),
            Err(ScratchLineError::FieldCount(3))
        );
    }

    #[test]
    fn test_bad_number() {
        assert!(matches!(
            ScratchLine::decode("mod\ttest\tx\t0"),
            Err(ScratchLineError::InvalidNumber { field: "query_count", .. })
        ));
    }

    #[test]
    fn test_decode_all_skips_partial_tail() {
        let content = "m\ta\t1\t0\nm\tb\t2\t0\nm\tc\t3";
        let decoded = decode_all(content);
        assert_eq!(decoded.lines.len(), 2);
        assert_eq!(decoded.skipped.len(), 1);
        assert_eq!(decoded.skipped[0], (3, ScratchLineError::Truncated));
    }

    #[test]
    fn test_decode_all_skips_garbage_in_middle() {
        let content = "m\ta\t1\t0\ngarbage\nm\tb\t2\t-\n";
        let decoded = decode_all(content);
        assert_eq!(decoded.lines.len(), 2);
        assert_eq!(decoded.lines[1].duplicate_count, None);
        assert_eq!(decoded.skipped[0].0, 2);
    }

    #[test]
    fn test_decode_all_empty() {
        let decoded = decode_all("");
        assert!(decoded.lines.is_empty());
        assert!(decoded.skipped.is_empty());
    }
}
