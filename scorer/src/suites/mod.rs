//! # Test Suites
//!
//! Implementations of [`TestSuite`](crate::traits::suite::TestSuite):
//!
//! - [`case_suite`]: named Rust closures run in-process.
//! - [`command_suite`]: one external command per fully-qualified test name, with discovery of
//!   test modules in a submission tree.

pub mod case_suite;
pub mod command_suite;
