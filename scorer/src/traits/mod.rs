//!
//! Traits Module
//!
//! This module contains the seams of the grading core. Each external collaborator a scorer
//! depends on is reached through one of these traits, so scorers can be driven by real tools
//! in production and by in-memory doubles in tests.
//!
//! - [`scorer`]: the uniform contract every scorer variant implements.
//! - [`suite`]: test suites run by the unit-test and coverage scorers.
//! - [`style_checker`]: static style checkers used by the code-style scorer.
//! - [`collector`]: coverage data collection around an instrumented run.
//! - [`parser`]: the generic trait for parsing external tool output into Rust types.

pub mod collector;
pub mod parser;
pub mod scorer;
pub mod style_checker;
pub mod suite;
