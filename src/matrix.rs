//! Aggregation Matrix Builder
//!
//! Pivots row-oriented query results into a dense domain × category grid.
//! Rows are grouped by the string form of their domain and category cells,
//! and the range cells of rows sharing a (domain, category) pair are summed.
//!
//! ```text
//! [10, East, Q1]          Q1
//! [20, West, Q1]   =>  East  15
//! [ 5, East, Q1]       West  20
//! ```

use crate::data::Scalar;
use crate::error::{ChartError, Result};
use std::collections::{BTreeMap, BTreeSet};

pub const DUMMY_DOMAIN: &str = "dummyDomain";
pub const DUMMY_CATEGORY: &str = "dummyCategory";
pub const NULL_LABEL: &str = "null";

/// Row metadata key carrying each row's domain label
pub const ROW_NAME: &str = "row-name";

/// Which column of a result row plays which role in the pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    /// Numeric measure
    pub range: usize,
    /// Row-grouping key; `None` puts every row in the dummy domain
    pub domain: Option<usize>,
    /// Column-grouping key; `None` puts every row in the dummy category
    pub category: Option<usize>,
}

impl ColumnRoles {
    pub fn new(range: usize, domain: Option<usize>, category: Option<usize>) -> Self {
        Self { range, domain, category }
    }

    /// Positional convention: column 0 is the range, column 1 the domain and
    /// column 2 the category, each only when the first row is wide enough.
    pub fn infer(rows: &[Vec<Scalar>]) -> Self {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        Self {
            range: 0,
            domain: (width > 1).then_some(1),
            category: (width > 2).then_some(2),
        }
    }
}

/// Dense numeric grid indexed by sorted domain (rows) and category (columns) labels
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationMatrix {
    domains: Vec<String>,
    categories: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
    row_metadata: Vec<BTreeMap<String, String>>,
}

impl AggregationMatrix {
    fn empty(domains: Vec<String>, categories: Vec<String>) -> Self {
        let cells = vec![vec![None; categories.len()]; domains.len()];
        let row_metadata = domains
            .iter()
            .map(|d| BTreeMap::from([(ROW_NAME.to_string(), d.clone())]))
            .collect();
        Self { domains, categories, cells, row_metadata }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn row_count(&self) -> usize {
        self.domains.len()
    }

    pub fn column_count(&self) -> usize {
        self.categories.len()
    }

    pub fn row_name(&self, row: usize) -> Option<&str> {
        self.domains.get(row).map(String::as_str)
    }

    pub fn column_name(&self, column: usize) -> Option<&str> {
        self.categories.get(column).map(String::as_str)
    }

    pub fn row_metadata(&self, row: usize, key: &str) -> Option<&str> {
        self.row_metadata.get(row)?.get(key).map(String::as_str)
    }

    /// Cell value; `None` when no row contributed to it
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get(row)?.get(column).copied().flatten()
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, column: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|r| r.get(column).copied().flatten()).collect()
    }

    /// Sum of the set cells of one row
    pub fn row_total(&self, row: usize) -> f64 {
        self.cells
            .get(row)
            .map(|r| r.iter().flatten().sum())
            .unwrap_or(0.0)
    }

    /// Sum of every set cell
    pub fn total(&self) -> f64 {
        (0..self.row_count()).map(|r| self.row_total(r)).sum()
    }

    /// Add `value` to a cell, returning the new sum
    fn accumulate(&mut self, row: usize, column: usize, value: f64) -> f64 {
        let cell = &mut self.cells[row][column];
        let sum = match *cell {
            Some(existing) => existing + value,
            None => value,
        };
        *cell = Some(sum);
        sum
    }
}

fn cell<'a>(row: &'a [Scalar], row_idx: usize, column: usize) -> Result<&'a Scalar> {
    row.get(column).ok_or_else(|| {
        ChartError::invalid_input(format!(
            "Row {} has {} columns, column {} was requested",
            row_idx + 1,
            row.len(),
            column
        ))
    })
}

fn label_of(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Null => NULL_LABEL.to_string(),
        other => other.to_string(),
    }
}

fn group_label(row: &[Scalar], row_idx: usize, column: Option<usize>, dummy: &str) -> Result<String> {
    match column {
        Some(c) => Ok(label_of(cell(row, row_idx, c)?)),
        None => Ok(dummy.to_string()),
    }
}

fn sorted_labels(rows: &[Vec<Scalar>], column: Option<usize>, dummy: &str) -> Result<Vec<String>> {
    let mut labels = BTreeSet::new();
    if let Some(c) = column {
        for (row_idx, row) in rows.iter().enumerate() {
            labels.insert(label_of(cell(row, row_idx, c)?));
        }
    }
    let mut labels: Vec<String> = labels.into_iter().collect();
    if labels.is_empty() {
        labels.push(dummy.to_string());
    }
    Ok(labels)
}

/// Pivot `rows` into an aggregation matrix according to `roles`
pub fn build_matrix(rows: &[Vec<Scalar>], roles: ColumnRoles) -> Result<AggregationMatrix> {
    // 1. Distinct, sorted label sets (dummy label when an axis is absent or empty)
    let domains = sorted_labels(rows, roles.domain, DUMMY_DOMAIN)?;
    let categories = sorted_labels(rows, roles.category, DUMMY_CATEGORY)?;
    let mut matrix = AggregationMatrix::empty(domains, categories);

    // 2. Accumulate range values into their cells
    for (row_idx, row) in rows.iter().enumerate() {
        let domain = group_label(row, row_idx, roles.domain, DUMMY_DOMAIN)?;
        let category = group_label(row, row_idx, roles.category, DUMMY_CATEGORY)?;

        let range_cell = cell(row, row_idx, roles.range)?;
        let value = range_cell.as_number().ok_or_else(|| {
            ChartError::invalid_input(format!(
                "Row {} has non-numeric range value '{}' in column {}",
                row_idx + 1,
                range_cell,
                roles.range
            ))
        })?;

        // Labels were collected from these same rows, so the lookups always hit
        let (Ok(r), Ok(c)) = (
            matrix.domains.binary_search(&domain),
            matrix.categories.binary_search(&category),
        ) else {
            return Err(ChartError::invalid_input(format!(
                "Row {} changed while pivoting",
                row_idx + 1
            )));
        };
        if !matrix.accumulate(r, c, value).is_finite() {
            return Err(ChartError::invalid_input(format!(
                "Row {} overflows the sum for ({}, {})",
                row_idx + 1,
                domain,
                category
            )));
        }
    }

    log::debug!(
        "pivoted {} rows into a {}x{} matrix",
        rows.len(),
        matrix.row_count(),
        matrix.column_count()
    );

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: Vec<Scalar>) -> Vec<Scalar> {
        values
    }

    fn sales_rows() -> Vec<Vec<Scalar>> {
        vec![
            row(vec![10.into(), "East".into(), "Q1".into()]),
            row(vec![20.into(), "West".into(), "Q1".into()]),
            row(vec![5.into(), "East".into(), "Q1".into()]),
        ]
    }

    #[test]
    fn test_duplicate_pairs_are_summed() {
        let matrix = build_matrix(&sales_rows(), ColumnRoles::new(0, Some(1), Some(2))).unwrap();
        assert_eq!(matrix.domains(), &["East".to_string(), "West".to_string()]);
        assert_eq!(matrix.categories(), &["Q1".to_string()]);
        assert_eq!(matrix.value(0, 0), Some(15.0));
        assert_eq!(matrix.value(1, 0), Some(20.0));
    }

    #[test]
    fn test_row_metadata_carries_domain() {
        let matrix = build_matrix(&sales_rows(), ColumnRoles::new(0, Some(1), Some(2))).unwrap();
        assert_eq!(matrix.row_metadata(1, ROW_NAME), Some("West"));
        assert_eq!(matrix.row_name(0), Some("East"));
        assert_eq!(matrix.column_name(0), Some("Q1"));
    }

    #[test]
    fn test_absent_axes_collapse_to_single_cell() {
        let matrix = build_matrix(&sales_rows(), ColumnRoles::new(0, None, None)).unwrap();
        assert_eq!(matrix.domains(), &[DUMMY_DOMAIN.to_string()]);
        assert_eq!(matrix.categories(), &[DUMMY_CATEGORY.to_string()]);
        assert_eq!(matrix.value(0, 0), Some(35.0));
        assert_eq!(matrix.total(), 35.0);
    }

    #[test]
    fn test_empty_rows_yield_unset_dummy_cell() {
        let matrix = build_matrix(&[], ColumnRoles::new(0, Some(1), Some(2))).unwrap();
        assert_eq!(matrix.row_count(), 1);
        assert_eq!(matrix.column_count(), 1);
        assert_eq!(matrix.value(0, 0), None);
    }

    #[test]
    fn test_null_labels() {
        let rows = vec![
            row(vec![1.into(), Scalar::Null, "b".into()]),
            row(vec![2.into(), "a".into(), Scalar::Null]),
        ];
        let matrix = build_matrix(&rows, ColumnRoles::new(0, Some(1), Some(2))).unwrap();
        assert_eq!(matrix.domains(), &["a".to_string(), "null".to_string()]);
        assert_eq!(matrix.categories(), &["b".to_string(), "null".to_string()]);
        assert_eq!(matrix.value(1, 0), Some(1.0));
        assert_eq!(matrix.value(0, 1), Some(2.0));
        // Nothing contributed to (a, b)
        assert_eq!(matrix.value(0, 0), None);
    }

    #[test]
    fn test_labels_sorted_and_unique() {
        let rows = vec![
            row(vec![1.into(), "b".into(), "z".into()]),
            row(vec![1.into(), "a".into(), "y".into()]),
            row(vec![1.into(), "c".into(), "z".into()]),
            row(vec![1.into(), "a".into(), "x".into()]),
        ];
        let matrix = build_matrix(&rows, ColumnRoles::new(0, Some(1), Some(2))).unwrap();
        assert!(matrix.domains().windows(2).all(|w| w[0] < w[1]));
        assert!(matrix.categories().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.column_count(), 3);
    }

    #[test]
    fn test_permutation_invariance() {
        let mut rows = vec![
            row(vec![1.5.into(), "x".into(), "p".into()]),
            row(vec![2.into(), "y".into(), "p".into()]),
            row(vec![4.into(), "x".into(), "p".into()]),
            row(vec![8.into(), "x".into(), "q".into()]),
        ];
        let roles = ColumnRoles::new(0, Some(1), Some(2));
        let forward = build_matrix(&rows, roles).unwrap();
        rows.reverse();
        let backward = build_matrix(&rows, roles).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.value(0, 0), Some(5.5));
    }

    #[test]
    fn test_numeric_labels_sort_as_strings() {
        let rows = vec![
            row(vec![1.into(), 10.into()]),
            row(vec![1.into(), 9.into()]),
        ];
        let matrix = build_matrix(&rows, ColumnRoles::infer(&rows)).unwrap();
        assert_eq!(matrix.domains(), &["10".to_string(), "9".to_string()]);
    }

    #[test]
    fn test_infer_roles() {
        assert_eq!(ColumnRoles::infer(&[]), ColumnRoles::new(0, None, None));
        assert_eq!(ColumnRoles::infer(&[vec![1.into()]]), ColumnRoles::new(0, None, None));
        assert_eq!(
            ColumnRoles::infer(&[vec![1.into(), "a".into()]]),
            ColumnRoles::new(0, Some(1), None)
        );
        assert_eq!(ColumnRoles::infer(&sales_rows()), ColumnRoles::new(0, Some(1), Some(2)));
    }

    #[test]
    fn test_non_numeric_range_is_rejected() {
        let rows = vec![row(vec!["ten".into(), "East".into()])];
        let result = build_matrix(&rows, ColumnRoles::new(0, Some(1), None));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("non-numeric"));
    }

    #[test]
    fn test_column_out_of_bounds_is_rejected() {
        let rows = vec![row(vec![1.into(), "East".into()])];
        let result = build_matrix(&rows, ColumnRoles::new(0, Some(1), Some(5)));
        assert!(matches!(result, Err(ChartError::InvalidInput(_))));
    }

    #[test]
    fn test_overflowing_sum_is_rejected() {
        let rows = vec![
            row(vec![1e308.into(), "a".into()]),
            row(vec![1e308.into(), "a".into()]),
        ];
        let err = build_matrix(&rows, ColumnRoles::infer(&rows)).unwrap_err();
        assert!(matches!(err, ChartError::InvalidInput(_)));
        assert!(err.to_string().contains("Row 2 overflows"));
    }

    #[test]
    fn test_csv_labels_are_not_normalized() {
        let fields = [("1", "02134"), ("2", "2134"), ("4", "1.0"), ("8", "1"), ("16", "007")];
        let rows: Vec<Vec<Scalar>> = fields
            .iter()
            .map(|(amount, zip)| vec![Scalar::parse_field(amount), Scalar::parse_field(zip)])
            .collect();
        let matrix = build_matrix(&rows, ColumnRoles::infer(&rows)).unwrap();
        assert_eq!(matrix.domains(), ["007", "02134", "1", "1.0", "2134"]);
        assert_eq!(matrix.column_values(0), vec![Some(16.0), Some(1.0), Some(8.0), Some(4.0), Some(2.0)]);
    }

    #[test]
    fn test_column_values_and_totals() {
        let rows = vec![
            row(vec![1.into(), "a".into(), "p".into()]),
            row(vec![2.into(), "b".into(), "q".into()]),
        ];
        let matrix = build_matrix(&rows, ColumnRoles::new(0, Some(1), Some(2))).unwrap();
        assert_eq!(matrix.column_values(1), vec![None, Some(2.0)]);
        assert_eq!(matrix.row_total(0), 1.0);
        assert_eq!(matrix.total(), 3.0);
    }
}
