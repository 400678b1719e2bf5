//! # Message Module
//!
//! Report text leaves the scorer core as *templates with named parameters*, never as
//! final user-facing text. A renderer outside this crate (for example a localisation
//! layer in the web front end) turns a [`Message`] into a sentence.
//!
//! Placeholders are written `{name}`. [`Message::render`] performs a plain substitution
//! for logs and the CLI; floats are shown with two decimals.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "template": "{rate}% tests ({success} of {total}) passed.",
//!   "params": { "rate": 70.0, "success": 7, "total": 10 }
//! }
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single named template parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{v}"),
            Param::Float(v) => write!(f, "{v:.2}"),
            Param::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<usize> for Param {
    fn from(v: usize) -> Self {
        Param::Int(v as i64)
    }
}

impl From<u64> for Param {
    fn from(v: u64) -> Self {
        Param::Int(v as i64)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

/// A message template plus the parameters it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub template: String,
    pub params: BTreeMap<String, Param>,
}

impl Message {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: BTreeMap::new(),
        }
    }

    /// Attach a named parameter.
    pub fn with(mut self, name: &str, value: impl Into<Param>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Substitute every `{name}` placeholder that has a parameter.
    ///
    /// Unknown placeholders are left untouched, as are unmatched braces.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match self.params.get(key) {
                        Some(param) => out.push_str(&param.to_string()),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl From<&str> for Message {
    fn from(template: &str) -> Self {
        Message::new(template)
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Message::new(template)
    }
}
