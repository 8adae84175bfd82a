//! Log Analytics query result models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for the workspace query endpoint
#[derive(Serialize, Debug)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub timespan: &'a str,
}

/// Response of a KQL query
#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueryResult {
    #[serde(default)]
    pub tables: Vec<QueryTable>,
}

impl QueryResult {
    /// The first table (`PrimaryResult`), if any
    pub fn primary(&self) -> Option<&QueryTable> {
        self.tables.first()
    }
}

/// Column metadata
#[derive(Deserialize, Debug, Clone)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: Option<String>,
}

/// One result table
#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueryTable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<QueryColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl QueryTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with access by column name
    pub fn records(&self) -> impl Iterator<Item = QueryRecord<'_>> {
        self.rows.iter().map(move |row| QueryRecord { table: self, row })
    }
}

/// A row paired with its table's columns
#[derive(Debug, Clone, Copy)]
pub struct QueryRecord<'a> {
    table: &'a QueryTable,
    row: &'a [Value],
}

impl<'a> QueryRecord<'a> {
    /// Raw value; `None` for unknown columns, short rows and nulls
    pub fn value(&self, column: &str) -> Option<&'a Value> {
        self.table
            .column_index(column)
            .and_then(|i| self.row.get(i))
            .filter(|v| !v.is_null())
    }

    pub fn str(&self, column: &str) -> Option<&'a str> {
        self.value(column)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Numeric value; numbers sent as strings are accepted
    pub fn f64(&self, column: &str) -> Option<f64> {
        match self.value(column)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Non-negative integer value
    pub fn u64(&self, column: &str) -> Option<u64> {
        match self.value(column)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> QueryTable {
        serde_json::from_value(serde_json::json!({
            "name": "PrimaryResult",
            "columns": [
                { "name": "AlertName", "type": "string" },
                { "name": "AlertCount", "type": "long" },
                { "name": "TruePositiveRate", "type": "real" },
                { "name": "Severity", "type": "string" }
            ],
            "rows": [
                ["Brute force", 12, 41.67, "High"],
                ["Odd login", "3", null, ""]
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let table = table();
        let rows: Vec<_> = table.records().collect();

        assert_eq!(rows[0].str("AlertName"), Some("Brute force"));
        assert_eq!(rows[0].u64("AlertCount"), Some(12));
        assert_eq!(rows[0].f64("TruePositiveRate"), Some(41.67));
        assert_eq!(rows[1].u64("AlertCount"), Some(3));
    }

    #[test]
    fn test_nulls_blanks_and_unknown_columns_are_none() {
        let table = table();
        let row = table.records().nth(1).unwrap();
        assert_eq!(row.f64("TruePositiveRate"), None);
        assert_eq!(row.str("Severity"), None);
        assert_eq!(row.str("NoSuchColumn"), None);
    }

    #[test]
    fn test_primary_table() {
        let result: QueryResult = serde_json::from_value(serde_json::json!({
            "tables": [{ "name": "PrimaryResult", "columns": [], "rows": [] }]
        }))
        .unwrap();
        let primary = result.primary().unwrap();
        assert_eq!(primary.name, "PrimaryResult");
        assert!(primary.is_empty());
        assert!(QueryResult::default().primary().is_none());
    }
}
