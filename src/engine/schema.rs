use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::errors::{Error, Result};

/// Table definitions used by the optimizer, keyed by lower-cased table name.
///
/// Accepts `{table: {column: type}}` or `{db: {table: {column: type}}}`.
/// Column order follows the JSON document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Schema {
    tables: HashMap<String, Vec<String>>,
}

impl Schema {
    pub fn from_json(value: Option<&Value>) -> Result<Self> {
        let mut schema = Schema::default();
        let entries = match value {
            None | Some(Value::Null) => return Ok(schema),
            Some(Value::Object(entries)) => entries,
            Some(other) => return Err(invalid("expected an object", other)),
        };

        for (name, definition) in entries {
            let Value::Object(fields) = definition else {
                return Err(invalid(&format!("table '{}' is not an object", name), definition));
            };
            if fields.values().all(Value::is_object) && !fields.is_empty() {
                for (table, columns) in fields {
                    let columns = column_names(table, columns)?;
                    schema.insert(&format!("{}.{}", name, table), columns.clone());
                    schema.insert(table, columns);
                }
            } else {
                let columns = column_names(name, definition)?;
                schema.insert(name, columns);
            }
        }
        Ok(schema)
    }

    fn insert(&mut self, table: &str, columns: Vec<String>) {
        self.tables.insert(table.to_ascii_lowercase(), columns);
    }

    /// Columns of `table`, if known.
    pub fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables
            .get(&table.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn column_names(table: &str, definition: &Value) -> Result<Vec<String>> {
    let columns: &Map<String, Value> = match definition {
        Value::Object(columns) => columns,
        other => return Err(invalid(&format!("table '{}' is not an object", table), other)),
    };
    columns
        .iter()
        .map(|(column, kind)| match kind {
            Value::String(_) => Ok(column.clone()),
            other => Err(invalid(
                &format!("column '{}.{}' must have a type name", table, column),
                other,
            )),
        })
        .collect()
}

fn invalid(reason: &str, found: &Value) -> Error {
    Error::Unexpected(format!("Invalid schema: {}, found {}", reason, found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_schema_keeps_column_order() {
        let value = json!({"Users": {"id": "INT", "name": "TEXT", "age": "INT"}});
        let schema = Schema::from_json(Some(&value)).unwrap();
        assert_eq!(
            schema.columns("users").unwrap(),
            &["id".to_string(), "name".to_string(), "age".to_string()]
        );
    }

    #[test]
    fn test_nested_schema() {
        let value = json!({"shop": {"orders": {"id": "INT", "total": "DOUBLE"}}});
        let schema = Schema::from_json(Some(&value)).unwrap();
        assert_eq!(schema.columns("orders").unwrap().len(), 2);
        assert_eq!(schema.columns("shop.orders").unwrap().len(), 2);
        assert!(schema.columns("shop").is_none());
    }

    #[test]
    fn test_missing_schema_is_empty() {
        assert!(Schema::from_json(None).unwrap().is_empty());
        assert!(Schema::from_json(Some(&Value::Null)).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_column_type() {
        let value = json!({"users": {"id": 5}});
        let err = Schema::from_json(Some(&value)).unwrap_err();
        assert!(err.to_string().starts_with("Invalid schema: column 'users.id'"));
    }
}
