// src/pivot/table.rs

/// Rows of string cells under an ordered list of column headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Builds a table from rows given as `(column, value)` pairs.
    ///
    /// Columns are the union of all keys in first-seen order; cells a row
    /// lacks are left empty.
    pub fn from_keyed_rows<K, V>(rows: Vec<Vec<(K, V)>>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for (key, _) in row {
                let key: &str = key.as_ref();
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }

        let mut table = OutputTable::new(columns);
        for row in rows {
            let mut cells = vec![String::new(); table.columns.len()];
            for (key, value) in row {
                let key: &str = key.as_ref();
                if let Some(idx) = table.columns.iter().position(|c| c == key) {
                    cells[idx] = value.into();
                }
            }
            table.rows.push(cells);
        }
        table
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of `row` under `column`, if both exist.
    #[cfg(test)]
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }
}

/// A table together with the tab name it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    pub name: String,
    pub table: OutputTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_rows_union_columns_in_first_seen_order() {
        let table = OutputTable::from_keyed_rows(vec![
            vec![("Company Name", "A"), ("ROE_TTM", "9%")],
            vec![("Company Name", "B"), ("CAGR_1 Year", "5%")],
        ]);
        assert_eq!(table.columns, vec!["Company Name", "ROE_TTM", "CAGR_1 Year"]);
        assert_eq!(table.rows[1], vec!["B", "", "5%"]);
        assert_eq!(table.cell(0, "ROE_TTM"), Some("9%"));
        assert_eq!(table.cell(0, "Missing"), None);
    }
}
