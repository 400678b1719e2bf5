//! # Input Data
//!
//! Types for judging supplied test data: the [`schema::RecordSchema`] that input records must
//! follow, the typed [`schema::Record`] each CSV row becomes, and the ordered
//! [`check_class::CheckClasses`] the records are expected to exercise.

pub mod check_class;
pub mod schema;
