//! # Style Checkers
//!
//! Implementations of [`StyleChecker`](crate::traits::style_checker::StyleChecker):
//!
//! - [`line_rules`]: built-in physical-line checks using pep8 codes. Needs no external tool.
//! - [`command_checker`]: runs an external linter and parses its `path:line:col: CODE text`
//!   output.

pub mod command_checker;
pub mod line_rules;
