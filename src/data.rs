use crate::error::{ChartError, Result};
use serde_json::Value;
use std::fmt;
use std::io::Read;

/// A single cell of a raw query result
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Interpret a raw text field: empty is null, anything else is kept as
    /// trimmed text so labels like `007` and `7` stay distinct
    pub fn parse_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Scalar::Null;
        }
        Scalar::Text(trimmed.to_string())
    }

    /// Numeric view of the cell; text is parsed, non-finite values are rejected
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(Scalar::Number)
                .ok_or_else(|| ChartError::resource_load(format!("Number {} is out of range", n))),
            Value::String(s) => Ok(Scalar::Text(s.clone())),
            _ => Err(ChartError::resource_load(
                "Nested arrays and objects are not valid cell values",
            )),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// Row-oriented query results
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl ResultSet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        Self { headers, rows }
    }

    /// Read a CSV document whose first record holds the column names
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ChartError::resource_load(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| {
                ChartError::resource_load(format!("Failed to read CSV record {}: {}", idx + 1, e))
            })?;
            rows.push(record.iter().map(Scalar::parse_field).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Create a ResultSet from a JSON array of arrays or a JSON array of objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| ChartError::resource_load("Input data must be a JSON array"))?;

        let Some(first) = array.first() else {
            return Ok(Self::default());
        };

        if first.is_array() {
            let mut rows = Vec::with_capacity(array.len());
            for item in array {
                let cells = item.as_array().ok_or_else(|| {
                    ChartError::resource_load("Items in array must all be arrays")
                })?;
                rows.push(cells.iter().map(Scalar::from_json).collect::<Result<Vec<_>>>()?);
            }
            return Ok(Self { headers: Vec::new(), rows });
        }

        // Extract headers from the first object
        let first_obj = first
            .as_object()
            .ok_or_else(|| ChartError::resource_load("Items in array must be arrays or objects"))?;
        let headers: Vec<String> = first_obj.keys().cloned().collect();

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| ChartError::resource_load("Items in array must all be objects"))?;
            let mut row = Vec::with_capacity(headers.len());
            for header in &headers {
                row.push(match obj.get(header) {
                    Some(v) => Scalar::from_json(v)?,
                    None => Scalar::Null,
                });
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Look up a column by header name (case-insensitive) or by numeric position
    pub fn column_index(&self, selector: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(selector))
            .or_else(|| selector.parse::<usize>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_field() {
        assert_eq!(Scalar::parse_field("10"), Scalar::Text("10".to_string()));
        assert_eq!(Scalar::parse_field(" 2.5 "), Scalar::Text("2.5".to_string()));
        assert_eq!(Scalar::parse_field("  "), Scalar::Null);
        assert_eq!(Scalar::parse_field(" East "), Scalar::Text("East".to_string()));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Scalar::parse_field("10").as_number(), Some(10.0));
        assert_eq!(Scalar::parse_field(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(Scalar::Number(-1.0).as_number(), Some(-1.0));
        assert_eq!(Scalar::parse_field("East").as_number(), None);
        assert_eq!(Scalar::parse_field("NaN").as_number(), None);
        assert_eq!(Scalar::parse_field("inf").as_number(), None);
        assert_eq!(Scalar::Null.as_number(), None);
        assert_eq!(Scalar::Bool(true).as_number(), None);
    }

    #[test]
    fn test_numeric_looking_fields_keep_their_text() {
        let csv = "amount,zip\n1,02134\n2,2134\n4,1.0\n8,1\n16,007\n";
        let data = ResultSet::from_csv(csv.as_bytes()).unwrap();
        let labels: Vec<String> = data.rows.iter().map(|r| r[1].to_string()).collect();
        assert_eq!(labels, vec!["02134", "2134", "1.0", "1", "007"]);
        assert_eq!(data.rows[4][0].as_number(), Some(16.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::Null.to_string(), "null");
        assert_eq!(Scalar::Number(10.0).to_string(), "10");
        assert_eq!(Scalar::Number(2.5).to_string(), "2.5");
        assert_eq!(Scalar::Text("Q1".into()).to_string(), "Q1");
    }

    #[test]
    fn test_from_csv() {
        let csv = "amount,region,quarter\n10,East,Q1\n20,West,\n";
        let data = ResultSet::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.headers, vec!["amount", "region", "quarter"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[1][0].as_number(), Some(20.0));
        assert_eq!(data.rows[1][2], Scalar::Null);
    }

    #[test]
    fn test_from_csv_ragged_record() {
        let csv = "a,b\n1,2\n3\n";
        assert!(ResultSet::from_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_from_json_arrays() {
        let value = json!([[10, "East", null], [5.5, "West", "Q2"]]);
        let data = ResultSet::from_json(&value).unwrap();
        assert!(data.headers.is_empty());
        assert_eq!(data.rows[0][2], Scalar::Null);
        assert_eq!(data.rows[1][0], Scalar::Number(5.5));
    }

    #[test]
    fn test_from_json_objects() {
        let value = json!([{"amount": 1, "region": "A"}, {"region": "B"}]);
        let data = ResultSet::from_json(&value).unwrap();
        assert_eq!(data.headers.len(), 2);
        let amount = data.column_index("amount").unwrap();
        assert_eq!(data.rows[1][amount], Scalar::Null);
    }

    #[test]
    fn test_from_json_rejects_scalar_root() {
        assert!(ResultSet::from_json(&json!({"a": 1})).is_err());
        assert!(ResultSet::from_json(&json!([[{"nested": true}]])).is_err());
    }

    #[test]
    fn test_column_index() {
        let data = ResultSet::new(vec!["Amount".into(), "Region".into()], vec![]);
        assert_eq!(data.column_index("region"), Some(1));
        assert_eq!(data.column_index("0"), Some(0));
        assert_eq!(data.column_index("missing"), None);
    }
}
