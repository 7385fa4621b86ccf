// src/pivot/organizer.rs
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::extractors::page::CollectedSheets;
use crate::extractors::record::{EntityInfo, EntityRecord};
use crate::extractors::sheets::{SheetDefinition, COMPANY_INFO_SHEET, MAIN_METRICS};
use crate::pivot::table::{NamedTable, OutputTable};
use crate::pivot::year::{base_metric, year_of_field};

/// Identity columns leading every per-year row.
const YEAR_TABLE_ID_COLUMNS: [&str; 3] = ["Company Name", "BSE Tag", "NSE Tag"];

/// year -> entity name -> metric -> value
type YearBucket = BTreeMap<u16, HashMap<String, HashMap<String, String>>>;

/// Distinct entities in first-seen order, later pages replacing earlier
/// identity fields of the same name.
pub fn entity_roster(entities: &[EntityInfo]) -> Vec<EntityInfo> {
    let mut roster: Vec<EntityInfo> = Vec::new();
    for entity in entities {
        match roster.iter_mut().find(|known| known.name == entity.name) {
            Some(known) => *known = entity.clone(),
            None => roster.push(entity.clone()),
        }
    }
    roster
}

/// Pivots one sheet category into one table per canonical year, newest first.
///
/// Every roster entity gets a row in every year table; metrics it has no
/// value for are empty strings.
pub fn pivot_by_year(
    sheet: &SheetDefinition,
    records: &[EntityRecord],
    roster: &[EntityInfo],
) -> Vec<(u16, NamedTable)> {
    // Phase 1: bucket every parseable field by year and entity
    let mut bucket: YearBucket = BTreeMap::new();
    let mut metrics: BTreeSet<String> = BTreeSet::new();

    for record in records {
        for (field, value) in record.fields.iter() {
            let Some(metric) = base_metric(field) else {
                continue;
            };
            let Some(year) = year_of_field(field) else {
                tracing::trace!("{}: skipping field without a year: {}", sheet.name, field);
                continue;
            };
            metrics.insert(metric.to_string());
            bucket
                .entry(year)
                .or_default()
                .entry(record.entity.name.clone())
                .or_default()
                .insert(metric.to_string(), value.to_string());
        }
    }

    // Phase 2: emit full-roster tables once the metric set is known
    let mut columns: Vec<String> = YEAR_TABLE_ID_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(metrics.iter().cloned());

    let empty = HashMap::new();
    bucket
        .iter()
        .rev()
        .map(|(year, by_entity)| {
            let mut table = OutputTable::new(columns.clone());
            for entity in roster {
                let values = by_entity.get(&entity.name).unwrap_or(&empty);
                let mut row = vec![entity.name.clone(), entity.bse_tag.clone(), entity.nse_tag.clone()];
                row.extend(metrics.iter().map(|m| values.get(m).cloned().unwrap_or_default()));
                table.rows.push(row);
            }
            (*year, NamedTable { name: format!("{}_{}", sheet.label, year), table })
        })
        .collect()
}

/// Builds every output table: the two static sheets followed by the per-year
/// sheets, ordered by category label then year, both descending.
pub fn organize_sheets(collected: &CollectedSheets) -> Vec<NamedTable> {
    let roster = entity_roster(&collected.company_info);
    tracing::info!("Organizing sheets for {} companies", roster.len());

    let company_info = OutputTable::from_keyed_rows(
        collected.company_info.iter().map(|entity| entity.columns().to_vec()).collect(),
    );
    let main_metrics = OutputTable::from_keyed_rows(
        collected
            .main_metrics
            .iter()
            .map(|record| {
                let mut row: Vec<(&str, &str)> = record.entity.columns().to_vec();
                row.extend(record.fields.iter());
                row
            })
            .collect(),
    );

    let mut year_tables: Vec<(&'static str, u16, NamedTable)> = Vec::new();
    for (sheet, records) in collected.detail_sheets() {
        if records.is_empty() {
            continue;
        }
        for (year, table) in pivot_by_year(sheet, records, &roster) {
            year_tables.push((sheet.label, year, table));
        }
    }
    year_tables.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

    let mut sheets = vec![
        NamedTable { name: COMPANY_INFO_SHEET.to_string(), table: company_info },
        NamedTable { name: MAIN_METRICS.name.to_string(), table: main_metrics },
    ];
    sheets.extend(year_tables.into_iter().map(|(_, _, table)| table));
    sheets.retain(|sheet| !sheet.table.is_empty());

    tracing::debug!(
        "Organized sheets: {:?}",
        sheets.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
    );
    sheets
}
