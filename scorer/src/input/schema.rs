//! Record schema and typed records.
//!
//! A [`RecordSchema`] is an ordered list of named, typed fields. Parsing a CSV row against it
//! yields a [`Record`] whose values are already converted, so check-class predicates can read
//! `record.int("age")` instead of re-parsing strings.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Int,
    Float,
    Text,
    Bool,
}

/// A converted field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// One schema field. A field with a default may be omitted or left empty in the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Convert a raw cell to this field's kind.
    pub fn convert(&self, raw: &str) -> Result<FieldValue, ParseError> {
        let raw = raw.trim();
        let invalid = || {
            ParseError::InvalidValue(format!(
                "field '{}': cannot convert '{}' to {:?}",
                self.name, raw, self.kind
            ))
        };
        match self.kind {
            FieldKind::Int => raw.parse().map(FieldValue::Int).map_err(|_| invalid()),
            FieldKind::Float => raw.parse().map(FieldValue::Float).map_err(|_| invalid()),
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "y" | "t" => Ok(FieldValue::Bool(true)),
                "false" | "0" | "no" | "n" | "f" => Ok(FieldValue::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }
}

/// Ordered field list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }
}

/// One parsed input record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Float fields, with int fields widened.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(FieldValue::Float(v)) => Some(*v),
            Some(FieldValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(FieldValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }
}
