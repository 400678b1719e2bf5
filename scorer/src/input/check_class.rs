//! Check classes: named predicates over input records.

use crate::error::GradingError;
use crate::input::schema::Record;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// A description plus the predicate deciding whether a record belongs to the class.
#[derive(Clone)]
pub struct CheckClass {
    description: String,
    predicate: Predicate,
}

impl CheckClass {
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn matches(&self, record: &Record) -> bool {
        (self.predicate)(record)
    }
}

impl fmt::Debug for CheckClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckClass")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered, non-empty list of check classes.
///
/// ```
/// use scorer::input::check_class::CheckClasses;
///
/// let classes = CheckClasses::builder()
///     .rule("a is negative", |r| r.int("a").is_some_and(|a| a < 0))
///     .rule("a is zero", |r| r.int("a") == Some(0))
///     .build()
///     .unwrap();
/// assert_eq!(classes.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CheckClasses {
    classes: Vec<CheckClass>,
}

impl CheckClasses {
    pub fn builder() -> CheckClassesBuilder {
        CheckClassesBuilder::default()
    }

    /// Fails with [`GradingError::InvalidConfig`] on an empty list, since the coverage rate
    /// over zero classes is undefined.
    pub fn new(classes: Vec<CheckClass>) -> Result<Self, GradingError> {
        if classes.is_empty() {
            return Err(GradingError::InvalidConfig(
                "at least one check class is required".to_string(),
            ));
        }
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CheckClass> {
        self.classes.iter()
    }

    /// For each class in order, whether any record satisfies it.
    pub fn coverage(&self, records: &[Record]) -> Vec<bool> {
        self.classes
            .iter()
            .map(|class| records.iter().any(|r| class.matches(r)))
            .collect()
    }
}

#[derive(Default)]
pub struct CheckClassesBuilder {
    classes: Vec<CheckClass>,
}

impl CheckClassesBuilder {
    /// Append a class. Order of calls is report order.
    pub fn rule<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.classes.push(CheckClass::new(description, predicate));
        self
    }

    pub fn build(self) -> Result<CheckClasses, GradingError> {
        CheckClasses::new(self.classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::schema::FieldValue;

    fn record(a: i64) -> Record {
        let mut r = Record::default();
        r.insert("a", FieldValue::Int(a));
        r
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            CheckClasses::builder().build(),
            Err(GradingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_coverage_in_declaration_order() {
        let classes = CheckClasses::builder()
            .rule("negative", |r| r.int("a").is_some_and(|a| a < 0))
            .rule("zero", |r| r.int("a") == Some(0))
            .rule("positive", |r| r.int("a").is_some_and(|a| a > 0))
            .build()
            .unwrap();
        let descriptions: Vec<_> = classes.iter().map(CheckClass::description).collect();
        assert_eq!(descriptions, ["negative", "zero", "positive"]);
        assert_eq!(
            classes.coverage(&[record(5), record(-1)]),
            vec![true, false, true]
        );
        assert_eq!(classes.coverage(&[]), vec![false, false, false]);
    }
}
