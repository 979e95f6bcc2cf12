use std::cmp::Ordering;

use serde::{Serialize, Serializer, ser::SerializeMap};

use super::category::{ChartCategory, columns::POSITION};

/// Scalar cell of a normalized record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Text(String),
    /// Absent value, rendered as `null`
    Missing,
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Display ordering: integers numerically, text lexicographically,
    /// missing values after everything else.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Missing, Value::Missing) => Ordering::Equal,
            (Value::Missing, _) => Ordering::Greater,
            (_, Value::Missing) => Ordering::Less,
            (Value::Integer(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Integer(_)) => Ordering::Greater,
        }
    }

    /// Text shown in a table cell, `None` for missing values.
    pub fn display(&self) -> Option<String> {
        match self {
            Value::Integer(n) => Some(n.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Missing => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

/// Flat row of a chart: column name to scalar, in the category's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    cells: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn new(cells: Vec<(&'static str, Value)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn position(&self) -> Option<i64> {
        self.get(POSITION).and_then(Value::as_integer)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(name, _)| *name)
    }

    pub fn cells(&self) -> &[(&'static str, Value)] {
        &self.cells
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Normalized records of one category, in upstream ranking order.
#[derive(Debug, Clone)]
pub struct ChartTable {
    pub category: ChartCategory,
    pub records: Vec<Record>,
}

impl ChartTable {
    pub fn new(category: ChartCategory, records: Vec<Record>) -> Self {
        Self { category, records }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.category.columns()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.records.iter().filter_map(move |r| r.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sorts_last_both_ways() {
        let text = Value::Text("a".into());
        assert_eq!(Value::Missing.sort_cmp(&text), Ordering::Greater);
        assert_eq!(text.sort_cmp(&Value::Missing), Ordering::Less);
        assert_eq!(
            Value::Integer(2).sort_cmp(&Value::Integer(10)),
            Ordering::Less
        );
    }

    #[test]
    fn test_record_serializes_in_column_order() -> anyhow::Result<()> {
        let record = Record::new(vec![
            (POSITION, Value::Integer(1)),
            ("Title", Value::Text("Song".into())),
            ("PreviewUrl", Value::Missing),
        ]);

        let json = serde_json::to_string(&record)?;

        assert_eq!(json, r#"{"Position":1,"Title":"Song","PreviewUrl":null}"#);
        Ok(())
    }
}
