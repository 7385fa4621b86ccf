// src/storage/workbook.rs
use crate::pivot::table::NamedTable;
use crate::utils::error::StorageError;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};

// Excel limits sheet names to 31 characters
const MAX_SHEET_NAME_LEN: usize = 31;
const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

const ERROR_SHEET: &str = "Error_Log";
const ERROR_MESSAGE: &str = "Data processing failed";

/// Result of writing the run's workbook.
#[derive(Debug)]
pub enum WorkbookOutcome {
    Written(PathBuf),
    /// The workbook failed; a single-tab error workbook was written instead.
    Fallback { backup: PathBuf, cause: StorageError },
}

/// `company_data_<YYYYmmdd_HHMMSS>.xlsx` inside `output_dir`.
pub fn timestamped_path(output_dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    output_dir.join(format!("company_data_{}.xlsx", timestamp))
}

/// Replaces characters Excel rejects and truncates to the length limit.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes one tab per table, header row first, keeping row and column order.
/// Empty tables are skipped.
pub fn write_workbook(path: &Path, sheets: &[NamedTable]) -> Result<(), StorageError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets.iter().filter(|sheet| !sheet.table.is_empty()) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sanitize_sheet_name(&sheet.name))?;
        write_table(worksheet, sheet, &header_format)?;
        tracing::debug!("Wrote sheet {} ({} rows)", sheet.name, sheet.table.rows.len());
    }

    workbook.save(path)?;
    tracing::info!("Data written to {}", path.display());
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, sheet: &NamedTable, header_format: &Format) -> Result<(), StorageError> {
    for (col, column) in sheet.table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, column, header_format)?;
    }
    for (row_idx, row) in sheet.table.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1)
            .map_err(|_| StorageError::SerializationError(format!("too many rows in {}", sheet.name)))?;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row_num, column_index(col)?, value)?;
            }
        }
    }
    Ok(())
}

fn column_index(col: usize) -> Result<u16, StorageError> {
    u16::try_from(col).map_err(|_| StorageError::SerializationError(format!("column {} out of range", col)))
}

/// `<stem>_backup.xlsx` next to the intended workbook.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("company_data");
    path.with_file_name(format!("{}_backup.xlsx", stem))
}

/// Writes the workbook; if that fails, writes a one-tab error workbook next
/// to it and hands back the original cause.
///
/// Only returns `Err` when the error workbook cannot be written either.
pub fn write_with_fallback(path: &Path, sheets: &[NamedTable]) -> Result<WorkbookOutcome, StorageError> {
    let cause = match write_workbook(path, sheets) {
        Ok(()) => return Ok(WorkbookOutcome::Written(path.to_path_buf())),
        Err(e) => e,
    };
    tracing::error!("Excel write failed: {}", cause);

    let backup = backup_path(path);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(ERROR_SHEET)?;
    worksheet.write_string_with_format(0, 0, "Error", &Format::new().set_bold())?;
    worksheet.write_string(1, 0, ERROR_MESSAGE)?;
    workbook.save(&backup)?;
    tracing::warn!("Error log written to {}", backup.display());

    Ok(WorkbookOutcome::Fallback { backup, cause })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::table::OutputTable;
    use crate::storage::tests::tmp_dir;

    fn sheet(name: &str) -> NamedTable {
        let mut table = OutputTable::new(vec!["Company Name".into(), "Sales".into()]);
        table.rows.push(vec!["Acme".into(), "".into()]);
        NamedTable { name: name.to_string(), table }
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sanitize_sheet_name("Annual_2023"), "Annual_2023");
        assert_eq!(sanitize_sheet_name("Q1/Q2: [draft]?"), "Q1_Q2_ _draft__");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sanitize_sheet_name("''"), "Sheet");
    }

    #[test]
    fn workbook_is_written() {
        let dir = tmp_dir("workbook_ok");
        let path = dir.join("out.xlsx");
        let outcome = write_with_fallback(&path, &[sheet("Company_Info"), sheet("Annual_2023")]).unwrap();

        assert!(matches!(outcome, WorkbookOutcome::Written(ref p) if p == &path));
        assert!(path.is_file());
    }

    #[test]
    fn failed_write_leaves_an_error_workbook() {
        let dir = tmp_dir("workbook_fallback");
        // A directory where the file should go makes the save fail
        let path = dir.join("company_data.xlsx");
        std::fs::create_dir_all(&path).unwrap();

        let outcome = write_with_fallback(&path, &[sheet("Annual_2023")]).unwrap();
        match outcome {
            WorkbookOutcome::Fallback { backup, .. } => {
                assert_eq!(backup, dir.join("company_data_backup.xlsx"));
                assert!(backup.is_file());
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn timestamped_name_shape() {
        let path = timestamped_path(Path::new("out"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("company_data_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(name.len(), "company_data_20240101_120000.xlsx".len());
    }
}
