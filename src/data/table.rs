//! Table presentation: per-column parsers, stable multi-column sort,
//! and row filtering.
//!
//! A [`TableSpec`] describes how one dashboard table is presented: which
//! columns carry a registered [`CellParser`] (the chronological columns),
//! the sort list, and the styling flags the renderer honours (zebra
//! striping, fixed column widths). Presentation is fully re-derived on
//! every refresh; there is no incremental patching of a previous order.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::fragment::TableModel;

/// Sort direction for one column of the sort list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering key for one cell.
///
/// Keys from different domains never mix meaningfully, so the ordering is
/// by kind first (time, then number, then text) and by value within a kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKey {
    /// Key produced by a registered cell parser.
    Time(i64),
    /// Default comparison for cells that parse as a finite number.
    Number(f64),
    /// Default comparison for everything else, lowercased.
    Text(String),
}

impl Eq for CellKey {}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellKey::*;
        match (self, other) {
            (Time(a), Time(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Time(_), _) => Ordering::Less,
            (_, Time(_)) => Ordering::Greater,
            (Number(_), Text(_)) => Ordering::Less,
            (Text(_), Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pluggable per-column cell parsing strategy.
///
/// A parser is registered against a column index in a [`TableSpec`]. The
/// presenter only calls [`CellParser::key`] for cells the parser
/// [`recognizes`](CellParser::recognizes); everything else takes the
/// default lexical/numeric key.
pub trait CellParser: Send {
    fn recognizes(&self, cell: &str) -> bool;
    fn key(&self, cell: &str) -> Option<CellKey>;
}

/// One row filter: a needle matched case-insensitively against a single
/// column, or against every column when no column is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: Option<usize>,
    pub needle: String,
}

impl RowFilter {
    fn matches(&self, row: &[String]) -> bool {
        let needle = self.needle.to_lowercase();
        match self.column {
            Some(col) => {
                row.get(col).is_some_and(|cell| cell.to_lowercase().contains(&needle))
            }
            None => row.iter().any(|cell| cell.to_lowercase().contains(&needle)),
        }
    }
}

/// Presentation rules for one dashboard table.
pub struct TableSpec {
    parsers: HashMap<usize, Box<dyn CellParser>>,
    sort: Vec<(usize, SortDirection)>,
    zebra: bool,
    filtering: bool,
    fixed_widths: bool,
}

impl TableSpec {
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
            sort: Vec::new(),
            zebra: false,
            filtering: false,
            fixed_widths: false,
        }
    }

    /// Register a cell parser for a column.
    pub fn parser(mut self, column: usize, parser: impl CellParser + 'static) -> Self {
        self.parsers.insert(column, Box::new(parser));
        self
    }

    /// Append a column to the sort list. Columns sort in registration
    /// order: the first call is the primary key.
    pub fn sort(mut self, column: usize, direction: SortDirection) -> Self {
        self.sort.push((column, direction));
        self
    }

    /// Enable alternating row striping in the renderer.
    pub fn zebra(mut self, on: bool) -> Self {
        self.zebra = on;
        self
    }

    /// Enable operator row filtering.
    pub fn filtering(mut self, on: bool) -> Self {
        self.filtering = on;
        self
    }

    /// Render with per-column fixed widths instead of proportional fills.
    pub fn fixed_widths(mut self, on: bool) -> Self {
        self.fixed_widths = on;
        self
    }

    pub fn has_zebra(&self) -> bool {
        self.zebra
    }

    pub fn has_filtering(&self) -> bool {
        self.filtering
    }

    pub fn has_fixed_widths(&self) -> bool {
        self.fixed_widths
    }

    /// Derive the presented row order: filter, then stable-sort by the
    /// sort list. Returns indices into `table.rows`.
    pub fn present(&self, table: &TableModel, filters: &[RowFilter]) -> Vec<usize> {
        let mut order: Vec<usize> = table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                !self.filtering || filters.iter().all(|f| f.matches(row))
            })
            .map(|(i, _)| i)
            .collect();

        // Precompute keys per retained row for each sort column.
        let keys: Vec<Vec<CellKey>> = order
            .iter()
            .map(|&row| {
                self.sort
                    .iter()
                    .map(|&(col, _)| self.key_for(col, cell(table, row, col)))
                    .collect()
            })
            .collect();
        let key_by_row: HashMap<usize, Vec<CellKey>> =
            order.iter().copied().zip(keys).collect();

        order.sort_by(|&a, &b| {
            for (i, &(_, direction)) in self.sort.iter().enumerate() {
                let ord = key_by_row[&a][i].cmp(&key_by_row[&b][i]);
                let ord = match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        order
    }

    fn key_for(&self, column: usize, cell: &str) -> CellKey {
        if let Some(parser) = self.parsers.get(&column) {
            if parser.recognizes(cell) {
                if let Some(key) = parser.key(cell) {
                    return key;
                }
            }
        }
        default_key(cell)
    }
}

impl Default for TableSpec {
    fn default() -> Self {
        Self::new()
    }
}

fn cell<'a>(table: &'a TableModel, row: usize, column: usize) -> &'a str {
    table.rows[row].get(column).map_or("", String::as_str)
}

/// Default comparison key: numeric when the cell parses as a finite
/// number, otherwise case-insensitive text.
fn default_key(cell: &str) -> CellKey {
    match cell.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => CellKey::Number(n),
        _ => CellKey::Text(cell.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::timestamp::GatewayTimestamp;

    fn model(rows: &[&[&str]]) -> TableModel {
        TableModel {
            headers: Vec::new(),
            rows: rows.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect(),
        }
    }

    fn sms_spec() -> TableSpec {
        TableSpec::new()
            .parser(0, GatewayTimestamp)
            .sort(0, SortDirection::Ascending)
            .sort(1, SortDirection::Ascending)
            .filtering(true)
    }

    #[test]
    fn sorts_chronological_column_by_timestamp() {
        let table = model(&[
            &["2024-03-07 14:02:05.0", "b"],
            &["2024-03-07 09:30:00.0", "a"],
            &["2024-12-01 00:00:00.0", "c"],
        ]);
        let order = sms_spec().present(&table, &[]);
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn secondary_column_breaks_ties() {
        let table = model(&[
            &["2024-03-07 14:02:05.0", "zz"],
            &["2024-03-07 14:02:05.0", "aa"],
        ]);
        let order = sms_spec().present(&table, &[]);
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn unrecognized_cells_fall_back_to_default_comparison() {
        // None of these match the timestamp pattern, so the chronological
        // column compares lexically; the parser key is never consulted.
        let table = model(&[&["pending", "x"], &["delivered", "x"], &["PENDING", "y"]]);
        let order = sms_spec().present(&table, &[]);
        // "delivered" < "pending" == "pending" (case-insensitive, stable).
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn numeric_cells_compare_numerically() {
        let spec = TableSpec::new().sort(0, SortDirection::Ascending);
        let table = model(&[&["10"], &["9"], &["100"]]);
        assert_eq!(spec.present(&table, &[]), vec![1, 0, 2]);
    }

    #[test]
    fn descending_direction_reverses() {
        let spec = TableSpec::new()
            .parser(0, GatewayTimestamp)
            .sort(0, SortDirection::Descending);
        let table = model(&[
            &["2024-03-07 09:30:00.0"],
            &["2024-03-07 14:02:05.0"],
        ]);
        assert_eq!(spec.present(&table, &[]), vec![1, 0]);
    }

    #[test]
    fn presentation_is_idempotent() {
        let table = model(&[
            &["2024-03-07 14:02:05.0", "b"],
            &["2024-03-07 09:30:00.0", "a"],
            &["2024-03-07 09:30:00.0", "a"],
        ]);
        let spec = sms_spec();
        let first = spec.present(&table, &[]);
        // Re-presenting rows already in sorted order keeps that order.
        let resorted = TableModel {
            headers: Vec::new(),
            rows: first.iter().map(|&i| table.rows[i].clone()).collect(),
        };
        let second = spec.present(&resorted, &[]);
        assert_eq!(second, vec![0, 1, 2]);
    }

    #[test]
    fn column_filter_restricts_rows() {
        let table = model(&[
            &["2024-03-07 09:30:00.0", "+491701111111"],
            &["2024-03-07 14:02:05.0", "+491702222222"],
        ]);
        let filters = [RowFilter { column: Some(1), needle: "1111".to_string() }];
        assert_eq!(sms_spec().present(&table, &filters), vec![0]);

        // A needle scoped to the wrong column matches nothing.
        let filters = [RowFilter { column: Some(0), needle: "1111".to_string() }];
        assert!(sms_spec().present(&table, &filters).is_empty());
    }

    #[test]
    fn any_column_filter_matches_across_columns() {
        let table = model(&[&["a", "FOO"], &["b", "bar"]]);
        let filters = [RowFilter { column: None, needle: "foo".to_string() }];
        assert_eq!(sms_spec().present(&table, &filters), vec![0]);
    }

    #[test]
    fn filters_ignored_when_filtering_disabled() {
        let spec = TableSpec::new().sort(0, SortDirection::Ascending);
        let table = model(&[&["b"], &["a"]]);
        let filters = [RowFilter { column: None, needle: "zzz".to_string() }];
        assert_eq!(spec.present(&table, &filters), vec![1, 0]);
    }

    #[test]
    fn ragged_rows_present_without_panic() {
        let table = model(&[&["2024-03-07 14:02:05.0"], &["2024-03-07 09:30:00.0", "extra"]]);
        let order = sms_spec().present(&table, &[]);
        assert_eq!(order, vec![1, 0]);
    }
}
