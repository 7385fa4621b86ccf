// src/extractors/tables.rs

// --- Imports ---
use crate::extractors::dom::{enclosing, text_of};
use crate::extractors::record::{FieldRecord, PLACEHOLDER};
use crate::extractors::sheets::{SheetDefinition, TableLocator, DATA_TABLE_CLASS, MAIN_METRICS};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// --- Constants ---
// Rows read from a ranges table after its heading row
const HEADLINE_ROWS: usize = 4;

// Expand buttons render as "Sales&nbsp;+"
const EXPAND_MARKER: &str = "\u{a0}+";

// --- CSS Selectors (Lazy Static) ---
static DATA_TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(&format!("table.{}", DATA_TABLE_CLASS))
        .expect("Failed to compile DATA_TABLE_SELECTOR")
});

static TH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("th").expect("Failed to compile TH_SELECTOR")
});

static THEAD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("thead").expect("Failed to compile THEAD_SELECTOR")
});

static TBODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tbody").expect("Failed to compile TBODY_SELECTOR")
});

static TR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile TR_SELECTOR")
});

static TD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("td").expect("Failed to compile TD_SELECTOR")
});

static BUTTON_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("button").expect("Failed to compile BUTTON_SELECTOR")
});

// --- Regex (Lazy Static) ---
// Headline table titles, matched against heading cell text
static HEADLINE_TITLE_RE: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    MAIN_METRICS
        .metrics
        .iter()
        .map(|title| (*title, Regex::new(title).expect("Failed to compile HEADLINE_TITLE_RE")))
        .collect()
});

/// Extracts the fields of one sheet from a parsed company page.
pub fn extract_sheet(document: &Html, sheet: &SheetDefinition) -> FieldRecord {
    match sheet.locator {
        TableLocator::Heading => extract_headline_tables(document),
        TableLocator::Section(_) | TableLocator::Document => extract_detail_table(document, sheet),
    }
}

/// Reads the ranges tables (growth, CAGR, ROE) headed by each headline title.
pub fn extract_headline_tables(document: &Html) -> FieldRecord {
    let mut record = FieldRecord::new();

    for (title, pattern) in HEADLINE_TITLE_RE.iter() {
        let Some(table) = document
            .select(&TH_SELECTOR)
            .find(|th| pattern.is_match(&text_of(*th)))
            .and_then(|th| enclosing(th, "table"))
        else {
            tracing::debug!("Headline table '{}' not found", title);
            continue;
        };

        for row in table.select(&TR_SELECTOR).skip(1).take(HEADLINE_ROWS) {
            let cells: Vec<ElementRef> = row.select(&TD_SELECTOR).collect();
            if cells.len() < 2 {
                continue;
            }
            let period = text_of(cells[0]).replace(':', "");
            record.insert(format!("{}_{}", title, period), text_of(cells[1]));
        }
    }

    record
}

/// Finds the data table for a sheet according to its locator.
pub fn locate_data_table<'a>(document: &'a Html, sheet: &SheetDefinition) -> Option<ElementRef<'a>> {
    let section_id = match sheet.locator {
        TableLocator::Section(id) => Some(id),
        _ => None,
    };

    if let Some(id) = section_id {
        let section_selector = Selector::parse(&format!("section#{}", id)).ok()?;
        if let Some(section) = document.select(&section_selector).next() {
            // A present section without a data table means no data for this sheet
            return section.select(&DATA_TABLE_SELECTOR).next();
        }
        tracing::trace!("Section '{}' missing, falling back to first data table", id);
    }

    document.select(&DATA_TABLE_SELECTOR).next()
}

/// Reads every configured metric of a sheet from its data table.
///
/// A metric matches the first body row whose label contains it; later rows
/// with the same label are ignored. Unmatched metrics are left out.
pub fn extract_detail_table(document: &Html, sheet: &SheetDefinition) -> FieldRecord {
    let mut record = FieldRecord::new();

    let Some(table) = locate_data_table(document, sheet) else {
        tracing::debug!("No data table for sheet {}", sheet.name);
        return record;
    };

    let (Some(thead), Some(tbody)) = (
        table.select(&THEAD_SELECTOR).next(),
        table.select(&TBODY_SELECTOR).next(),
    ) else {
        tracing::warn!("Data table for sheet {} has no thead/tbody", sheet.name);
        return record;
    };

    let headers: Vec<String> = thead.select(&TH_SELECTOR).map(text_of).collect();
    let rows: Vec<Vec<ElementRef>> = tbody
        .select(&TR_SELECTOR)
        .map(|row| row.select(&TD_SELECTOR).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    for metric in sheet.metrics {
        let matched = rows.iter().find(|cells| row_label(cells[0]).contains(metric));
        let Some(cells) = matched else {
            tracing::trace!("Metric '{}' not found in {}", metric, sheet.name);
            continue;
        };

        for (i, header) in headers.iter().enumerate().skip(1) {
            let value = cells
                .get(i)
                .map(|cell| text_of(*cell))
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            record.insert(format!("{}_{}", metric, header), value);
        }
    }

    record
}

/// Label of a body row: the expand button's caption when it has one,
/// otherwise the first cell's text, without the "+" expand marker.
fn row_label(first_cell: ElementRef) -> String {
    let button_label = first_cell
        .select(&BUTTON_SELECTOR)
        .next()
        .map(|button| clean_label(&text_of(button)))
        .filter(|label| !label.is_empty());

    button_label.unwrap_or_else(|| clean_label(&text_of(first_cell)))
}

fn clean_label(text: &str) -> String {
    text.replace(EXPAND_MARKER, "")
        .trim()
        .trim_end_matches('+')
        .trim()
        .to_string()
}
