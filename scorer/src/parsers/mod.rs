//! # Parsers
//!
//! Turn the textual output of external tools and submitted data files into typed values.
//! Every parser implements [`Parser`](crate::traits::parser::Parser) and reports problems as
//! [`ParseError`](crate::error::ParseError); the calling scorer decides which tier the error
//! belongs to.
//!
//! The available parsers are:
//! - [`gcov_parser`]: `.gcov` files produced by `gcov -b`.
//! - [`coverage_json_parser`]: coverage.py JSON reports.
//! - [`style_parser`]: `path:line:col: CODE text` checker output.
//! - [`csv_parser`]: CSV input data against a record schema.

pub mod coverage_json_parser;
pub mod csv_parser;
pub mod gcov_parser;
pub mod style_parser;
