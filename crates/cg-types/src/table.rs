//! Column-oriented tables as exchanged with the service.
//!
//! On the wire a table is a JSON object keyed by column name, each column
//! being an object keyed by row index:
//!
//! ```json
//! {"x:[0,1]": {"0": 0.5, "1": 0.9}, "metric:mean": {"0": 10.0, "1": 20.0}}
//! ```
//!
//! Column order and row order are kept as they appear in the document.

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::errors::{CgError, CgResult};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> CgResult<()> {
        if row.len() != self.columns.len() {
            return Err(CgError::Table(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by row position and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        for (col, name) in self.columns.iter().enumerate() {
            let cells: Map<String, Value> = self
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| (i.to_string(), row[col].clone()))
                .collect();
            doc.insert(name.clone(), Value::Object(cells));
        }
        Value::Object(doc)
    }

    pub fn to_json_string(&self) -> CgResult<String> {
        Ok(serde_json::to_string(&self.to_value())?)
    }

    pub fn from_value(doc: &Value) -> CgResult<Self> {
        let doc = doc
            .as_object()
            .ok_or_else(|| CgError::Table(format!("expected a JSON object, got {doc}")))?;

        let columns: Vec<String> = doc.keys().cloned().collect();

        // Row labels in order of first appearance across all columns.
        let mut labels: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut cells = Vec::with_capacity(columns.len());
        for (name, column) in doc {
            let column = column.as_object().ok_or_else(|| {
                CgError::Table(format!("column '{name}' is not an object of cells"))
            })?;
            for label in column.keys() {
                if seen.insert(label.as_str()) {
                    labels.push(label);
                }
            }
            cells.push(column);
        }

        let rows = labels
            .iter()
            .map(|label| {
                cells
                    .iter()
                    .map(|column| column.get(*label).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn from_json_str(text: &str) -> CgResult<Self> {
        let doc: Value = serde_json::from_str(text)?;
        Self::from_value(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["x:[0,1]".into(), "metric:mean".into(), "metric:se".into()]);
        table.push_row(vec![json!(0.5), json!(10.0), json!("none")]).unwrap();
        table.push_row(vec![json!(0.9), json!(20.0), json!(0.1)]).unwrap();
        table
    }

    #[test]
    fn serializes_column_oriented() {
        let value = sample_table().to_value();
        assert_eq!(
            value,
            json!({
                "x:[0,1]": {"0": 0.5, "1": 0.9},
                "metric:mean": {"0": 10.0, "1": 20.0},
                "metric:se": {"0": "none", "1": 0.1},
            })
        );
    }

    #[test]
    fn keeps_column_order_on_the_wire() {
        let text = sample_table().to_json_string().unwrap();
        let x = text.find("x:[0,1]").unwrap();
        let mean = text.find("metric:mean").unwrap();
        let se = text.find("metric:se").unwrap();
        assert!(x < mean && mean < se, "{text}");
    }

    #[test]
    fn empty_table_still_lists_columns() {
        let table = Table::new(vec!["x:[0,1]".into(), "metric:mean".into()]);
        assert_eq!(
            table.to_json_string().unwrap(),
            r#"{"x:[0,1]":{},"metric:mean":{}}"#
        );
    }

    #[test]
    fn parses_server_tables_in_document_order() {
        let table = Table::from_json_str(
            r#"{"y:{0,1,2}": {"3": 2, "0": 1}, "x:[0,1]": {"3": 0.1, "0": 0.7}, "metric_est": {"3": 5.0}}"#,
        )
        .unwrap();

        assert_eq!(table.columns(), ["y:{0,1,2}", "x:[0,1]", "metric_est"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0).unwrap(), [json!(2), json!(0.1), json!(5.0)]);
        assert_eq!(table.row(1).unwrap(), [json!(1), json!(0.7), Value::Null]);
        assert_eq!(table.get(0, "metric_est"), Some(&json!(5.0)));
        assert_eq!(table.get(0, "missing"), None);
    }

    #[test]
    fn wide_tables_keep_every_row_once() {
        let labels: Vec<String> = (0..5000).rev().map(|i| i.to_string()).collect();
        let column = |offset: i64| -> Value {
            Value::Object(
                labels
                    .iter()
                    .map(|l| (l.clone(), json!(l.parse::<i64>().unwrap() + offset)))
                    .collect(),
            )
        };
        let doc = json!({"a": column(0), "b": column(1), "c": column(2)});

        let table = Table::from_value(&doc).unwrap();
        assert_eq!(table.len(), 5000);
        assert_eq!(table.row(0).unwrap(), [json!(4999), json!(5000), json!(5001)]);
        assert_eq!(table.row(4999).unwrap(), [json!(0), json!(1), json!(2)]);
    }

    #[test]
    fn parses_empty_tables() {
        let table = Table::from_json_str(r#"{"x:[0,1]": {}}"#).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 1);

        assert!(Table::from_json_str("{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_tabular_documents() {
        assert!(matches!(Table::from_json_str("[1, 2]"), Err(CgError::Table(_))));
        assert!(matches!(
            Table::from_json_str(r#"{"x": 3}"#),
            Err(CgError::Table(_))
        ));
        assert!(matches!(
            Table::from_json_str("not json"),
            Err(CgError::Serialization(_))
        ));
    }

    #[test]
    fn push_row_checks_width() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        assert!(table.push_row(vec![json!(1)]).is_err());
        assert!(table.is_empty());
    }
}
