//! Row input shapes accepted by `add_row`

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::Row;

/// Row data as supplied by the caller, before it is resolved to a [`Row`]
#[derive(Debug, Clone, PartialEq)]
pub enum RowInput {
    /// Already a column → value mapping
    FieldMap(Row),
    /// Values joined by a separator, zipped against a column list
    DelimitedText(String),
    /// Values in column order, zipped against a column list
    OrderedValues(Vec<Value>),
}

impl RowInput {
    /// Resolve to a field mapping.
    ///
    /// Mappings pass through untouched. Text is split on `separator` with
    /// every part trimmed; both text and sequences need a non-empty column
    /// list of the same length.
    pub fn into_row(self, columns: Option<&[String]>, separator: &str) -> CoreResult<Row> {
        let values: Vec<Value> = match self {
            RowInput::FieldMap(row) => return Ok(row),
            RowInput::DelimitedText(text) => split_text(&text, separator),
            RowInput::OrderedValues(values) => values,
        };

        let columns = match columns {
            Some(columns) if !columns.is_empty() => columns,
            _ => return Err(CoreError::ColumnsRequired),
        };

        if values.len() != columns.len() {
            return Err(CoreError::LengthMismatch {
                values: values.len(),
                columns: columns.len(),
            });
        }

        Ok(columns.iter().cloned().zip(values).collect())
    }
}

fn split_text(text: &str, separator: &str) -> Vec<Value> {
    if separator.is_empty() {
        return vec![Value::String(text.trim().to_string())];
    }
    text.split(separator)
        .map(|part| Value::String(part.trim().to_string()))
        .collect()
}

impl TryFrom<Value> for RowInput {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(RowInput::FieldMap(map)),
            Value::String(text) => Ok(RowInput::DelimitedText(text)),
            Value::Array(values) => Ok(RowInput::OrderedValues(values)),
            other => Err(CoreError::UnsupportedInput {
                message: format!("expected an object, a string or a list, got {}", other),
            }),
        }
    }
}

impl From<Row> for RowInput {
    fn from(row: Row) -> Self {
        RowInput::FieldMap(row)
    }
}

impl From<&str> for RowInput {
    fn from(text: &str) -> Self {
        RowInput::DelimitedText(text.to_string())
    }
}

impl From<Vec<Value>> for RowInput {
    fn from(values: Vec<Value>) -> Self {
        RowInput::OrderedValues(values)
    }
}

/// Interpret command line text as a JSON scalar when it is one.
///
/// `12`, `4.5`, `true`, `null` and `"quoted"` become typed values; anything
/// else, including JSON lists and objects, stays a plain string.
pub fn parse_scalar(text: &str) -> Value {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) if !value.is_array() && !value.is_object() => value,
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mapping_needs_no_columns() {
        let row = json!({"id": 1, "date": 20}).as_object().unwrap().clone();
        let resolved = RowInput::from(row.clone()).into_row(None, ";").unwrap();
        assert_eq!(resolved, row);
    }

    #[test]
    fn test_text_is_split_and_trimmed() {
        let row = RowInput::from("1 ; 2024-01-01")
            .into_row(Some(&cols(&["id", "date"])), ";")
            .unwrap();
        assert_eq!(row.get("id"), Some(&json!("1")));
        assert_eq!(row.get("date"), Some(&json!("2024-01-01")));
    }

    #[test]
    fn test_sequence_is_zipped() {
        let row = RowInput::from(vec![json!(2), json!("2024-02-01")])
            .into_row(Some(&cols(&["id", "date"])), ";")
            .unwrap();
        assert_eq!(row.get("id"), Some(&json!(2)));
    }

    #[test]
    fn test_columns_required() {
        let err = RowInput::from("1;2").into_row(None, ";").unwrap_err();
        assert!(matches!(err, CoreError::ColumnsRequired));

        let err = RowInput::from(vec![json!(1)]).into_row(Some(&[]), ";").unwrap_err();
        assert!(matches!(err, CoreError::ColumnsRequired));
    }

    #[test]
    fn test_length_mismatch() {
        let err = RowInput::from("1;2;3")
            .into_row(Some(&cols(&["id", "date"])), ";")
            .unwrap_err();
        assert!(matches!(err, CoreError::LengthMismatch { values: 3, columns: 2 }));
    }

    #[test]
    fn test_try_from_value() {
        assert!(matches!(RowInput::try_from(json!({"a": 1})), Ok(RowInput::FieldMap(_))));
        assert!(matches!(RowInput::try_from(json!("a;b")), Ok(RowInput::DelimitedText(_))));
        assert!(matches!(RowInput::try_from(json!([1, 2])), Ok(RowInput::OrderedValues(_))));
        assert!(matches!(
            RowInput::try_from(json!(42)),
            Err(CoreError::UnsupportedInput { .. })
        ));
        assert!(matches!(
            RowInput::try_from(Value::Null),
            Err(CoreError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("12"), json!(12));
        assert_eq!(parse_scalar("4.5"), json!(4.5));
        assert_eq!(parse_scalar("true"), json!(true));
        assert_eq!(parse_scalar("null"), Value::Null);
        assert_eq!(parse_scalar("\"12\""), json!("12"));
        assert_eq!(parse_scalar("snack"), json!("snack"));
        assert_eq!(parse_scalar("[1]"), json!("[1]"));
    }
}
