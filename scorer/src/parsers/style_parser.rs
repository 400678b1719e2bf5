//! Style checker output parser.
//!
//! pycodestyle, flake8, pylint (with a parseable template) and most linters can print one
//! violation per line as `path:line:col: CODE text`. With `--show-source` pycodestyle follows a
//! violation with the offending source line and a caret line; the source line is kept.

use crate::error::ParseError;
use crate::traits::parser::Parser;
use crate::traits::style_checker::Violation;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static VIOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>.+?):(?P<line>\d+):(?:(?P<col>\d+):)?\s*(?P<code>[A-Z]+\d+)\s+(?P<text>.*)$")
        .expect("valid violation pattern")
});

pub struct StyleOutputParser;

impl Parser<&str, Vec<(PathBuf, Violation)>> for StyleOutputParser {
    fn parse(&self, input: &str) -> Result<Vec<(PathBuf, Violation)>, ParseError> {
        let mut found: Vec<(PathBuf, Violation)> = Vec::new();
        let mut awaiting_source = false;

        for raw in input.lines() {
            if let Some(caps) = VIOLATION.captures(raw) {
                let number = |name: &str| -> Result<u32, ParseError> {
                    caps.name(name).map_or(Ok(1), |m| {
                        m.as_str().parse().map_err(|_| {
                            ParseError::InvalidValue(format!("bad {name} number in '{raw}'"))
                        })
                    })
                };
                found.push((
                    PathBuf::from(&caps["path"]),
                    Violation {
                        line: number("line")?,
                        column: number("col")?,
                        code: caps["code"].to_string(),
                        text: caps["text"].trim().to_string(),
                        source_line: None,
                    },
                ));
                awaiting_source = true;
                continue;
            }

            if raw.trim().is_empty() || raw.trim() == "^" {
                continue;
            }
            if awaiting_source {
                if let Some((_, last)) = found.last_mut() {
                    last.source_line = Some(raw.to_string());
                }
                awaiting_source = false;
            }
        }
        Ok(found)
    }
}
