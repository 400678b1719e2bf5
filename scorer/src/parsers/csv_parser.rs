//! CSV input data parser.
//!
//! The first non-empty line is the header. Fields are separated by `,`; a field may be wrapped
//! in double quotes, inside which `""` is a literal quote and commas and newlines are data.
//! Columns not named by the schema are ignored.

use crate::error::ParseError;
use crate::input::schema::{Record, RecordSchema};
use crate::traits::parser::Parser;

/// Parses CSV text into records of `schema`.
pub struct CsvParser<'s> {
    schema: &'s RecordSchema,
}

impl<'s> CsvParser<'s> {
    pub fn new(schema: &'s RecordSchema) -> Self {
        Self { schema }
    }
}

/// Split CSV text into rows of cells, honouring quoted fields.
fn split_rows(input: &str) -> Result<Vec<Vec<String>>, ParseError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' if cell.trim().is_empty() => {
                cell.clear();
                in_quotes = true;
            }
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(ParseError::Malformed(
            "unterminated quoted field".to_string(),
        ));
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    Ok(rows
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect())
}

impl Parser<&str, Vec<Record>> for CsvParser<'_> {
    fn parse(&self, input: &str) -> Result<Vec<Record>, ParseError> {
        let mut rows = split_rows(input)?.into_iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

        let columns: Vec<Option<usize>> = self
            .schema
            .fields
            .iter()
            .map(|f| header.iter().position(|h| *h == f.name))
            .collect();

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            // header is line 1
            let line = index + 2;
            let mut record = Record::default();
            for (field, column) in self.schema.fields.iter().zip(&columns) {
                let cell = column
                    .and_then(|c| row.get(c))
                    .map(String::as_str)
                    .filter(|cell| !cell.trim().is_empty());
                let raw = match (cell, &field.default) {
                    (Some(cell), _) => cell,
                    (None, Some(default)) => default.as_str(),
                    (None, None) => {
                        return Err(ParseError::MissingField(format!(
                            "record {line}: field '{}' is required",
                            field.name
                        )));
                    }
                };
                let value = field.convert(raw).map_err(|e| match e {
                    ParseError::InvalidValue(msg) => {
                        ParseError::InvalidValue(format!("record {line}: {msg}"))
                    }
                    other => other,
                })?;
                record.insert(field.name.clone(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::schema::{FieldKind, FieldSpec, FieldValue};

    fn schema() -> RecordSchema {
        RecordSchema::new()
            .field(FieldSpec::new("a", FieldKind::Int))
            .field(FieldSpec::new("label", FieldKind::Text))
            .field(FieldSpec::new("flag", FieldKind::Bool).with_default("false"))
    }

    #[test]
    fn test_parses_rows_with_quotes_and_defaults() {
        let schema = schema();
        let input = "\nlabel,a,extra,flag\r\n\"x, \"\"quoted\"\"\",1,zz,true\nplain,-2,,\n\n";
        let records = CsvParser::new(&schema).parse(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("label"), Some("x, \"quoted\""));
        assert_eq!(records[0].int("a"), Some(1));
        assert_eq!(records[0].bool("flag"), Some(true));
        assert_eq!(records[1].get("flag"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_missing_column_is_missing_field() {
        let schema = schema();
        let err = CsvParser::new(&schema).parse("a\n1\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingField(msg) if msg.contains("label")));
    }

    #[test]
    fn test_empty_required_cell_is_missing_field() {
        let schema = schema();
        let err = CsvParser::new(&schema).parse("a,label\n,x\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingField(msg) if msg.contains("record 2")));
    }

    #[test]
    fn test_unconvertible_value() {
        let schema = schema();
        let err = CsvParser::new(&schema)
            .parse("a,label\n1,x\nten,y\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue(msg) if msg.contains("record 3")));
    }

    #[test]
    fn test_unterminated_quote() {
        let schema = schema();
        assert!(matches!(
            CsvParser::new(&schema).parse("a,label\n1,\"open\n"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_header_only_has_no_records() {
        let schema = schema();
        assert!(CsvParser::new(&schema).parse("a,label\n").unwrap().is_empty());
    }
}
