//! Parser Trait
//!
//! This module defines the [`Parser`] trait, which provides a generic interface for parsing
//! external tool output (coverage data, style checker output, CSV input data) into
//! strongly-typed Rust structures. Implementations validate the input and return a
//! [`ParseError`] describing the first problem they find.
//!
//! # Example
//!
//! ```rust
//! use scorer::error::ParseError;
//! use scorer::traits::parser::Parser;
//!
//! struct LineCount;
//!
//! impl<'a> Parser<&'a str, usize> for LineCount {
//!     fn parse(&self, input: &'a str) -> Result<usize, ParseError> {
//!         Ok(input.lines().count())
//!     }
//! }
//!
//! assert_eq!(LineCount.parse("a\nb").unwrap(), 2);
//! ```

use crate::error::ParseError;

/// A generic trait for parsing data into a strongly-typed Rust structure.
///
/// # Type Parameters
///
/// * `Input` - The input type to be parsed.
/// * `Output` - The output type produced by the parser.
pub trait Parser<Input, Output> {
    /// Parse an input value into the target type.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the input does not conform to the expected format.
    fn parse(&self, input: Input) -> Result<Output, ParseError>;
}
