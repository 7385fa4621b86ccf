// src/extractors/page.rs
use crate::extractors::company::extract_entity;
use crate::extractors::record::{EntityInfo, EntityRecord, FieldRecord};
use crate::extractors::sheets::{SheetDefinition, DETAIL_SHEETS, MAIN_METRICS};
use crate::extractors::tables::extract_sheet;
use crate::storage::{self, PageStore};
use crate::utils::error::{ExtractError, StorageError};
use scraper::Html;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Everything extracted from one saved company page.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyPage {
    pub entity: EntityInfo,
    /// Headline ranges fields; may be empty.
    pub headline: FieldRecord,
    /// Non-empty detail records keyed by sheet name, in registry order.
    pub sheets: Vec<(&'static str, FieldRecord)>,
}

#[derive(Debug, Default)]
pub struct PageExtractor;

impl PageExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Parses a company page and runs every sheet definition against it.
    ///
    /// Fails only when the page has no company name.
    pub fn extract(&self, html_content: &str) -> Result<CompanyPage, ExtractError> {
        let document = Html::parse_document(html_content);

        let entity = extract_entity(&document)?;
        let headline = extract_sheet(&document, &MAIN_METRICS);

        let mut sheets = Vec::new();
        for sheet in DETAIL_SHEETS.iter().copied() {
            let record = extract_sheet(&document, sheet);
            if record.is_empty() {
                tracing::debug!("{}: no {} data", entity.name, sheet.name);
                continue;
            }
            tracing::trace!("{}: {} fields for {}", entity.name, record.len(), sheet.name);
            sheets.push((sheet.name, record));
        }

        Ok(CompanyPage { entity, headline, sheets })
    }
}

/// Per-sheet record lists accumulated across all parsed pages.
#[derive(Debug)]
pub struct CollectedSheets {
    /// One entry per parsed page, in parse order.
    pub company_info: Vec<EntityInfo>,
    pub main_metrics: Vec<EntityRecord>,
    detail: Vec<(&'static SheetDefinition, Vec<EntityRecord>)>,
}

impl CollectedSheets {
    pub fn new() -> Self {
        Self {
            company_info: Vec::new(),
            main_metrics: Vec::new(),
            detail: DETAIL_SHEETS.iter().map(|sheet| (*sheet, Vec::new())).collect(),
        }
    }

    pub fn add(&mut self, page: CompanyPage) {
        let CompanyPage { entity, headline, sheets } = page;

        for (name, fields) in sheets {
            if let Some((_, records)) = self.detail.iter_mut().find(|(sheet, _)| sheet.name == name) {
                records.push(EntityRecord { entity: entity.clone(), fields });
            }
        }
        self.main_metrics.push(EntityRecord { entity: entity.clone(), fields: headline });
        self.company_info.push(entity);
    }

    /// Detail sheets with their records, in registry order.
    pub fn detail_sheets(&self) -> impl Iterator<Item = (&'static SheetDefinition, &[EntityRecord])> {
        self.detail.iter().map(|(sheet, records)| (*sheet, records.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.company_info.is_empty()
    }
}

impl Default for CollectedSheets {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Extracts every saved page in the store and accumulates the results.
///
/// A page that cannot be read or has no company name is logged, counted as
/// failed and skipped. With `debug_dir` set, each extracted page is also
/// dumped there as JSON.
pub fn collect_pages(
    store: &PageStore,
    debug_dir: Option<&Path>,
) -> Result<(CollectedSheets, ParseSummary), StorageError> {
    let pages = store.list_pages()?;
    tracing::info!("Processing {} files...", pages.len());

    let extractor = PageExtractor::new();
    let mut collected = CollectedSheets::new();
    let mut summary = ParseSummary::default();

    for (index, path) in pages.iter().enumerate() {
        tracing::info!("Processing file {}/{}: {}", index + 1, pages.len(), path.display());

        let content = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::error!("Error reading {}: {}", path.display(), e);
                summary.failed += 1;
                continue;
            }
        };

        match extractor.extract(&content) {
            Ok(page) => {
                if let Some(debug_dir) = debug_dir {
                    if let Err(e) = storage::save_extraction_json(debug_dir, path, &page) {
                        tracing::warn!("Failed to save extraction dump: {}", e);
                    }
                }
                collected.add(page);
                summary.succeeded += 1;
            }
            Err(e) => {
                tracing::error!("Error processing {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        "Processing finished. Success: {}, Failures: {}",
        summary.succeeded,
        summary.failed
    );
    Ok((collected, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::organize_sheets;
    use crate::storage::tests::tmp_dir;

    const PAGE: &str = r#"<html><body>
        <h1 class="margin-0">Acme Ltd</h1>
        <span>BSE: 111</span><span>NSE: ACME</span>
        <table class="ranges-table"><tr><th>Stock Price CAGR</th></tr>
          <tr><td>1 Year:</td><td>5%</td></tr></table>
        <section id="quarters">
          <table class="data-table"><thead><tr><th></th><th>Jun 2023</th></tr></thead>
          <tbody><tr><td>Sales</td><td>10</td></tr></tbody></table>
        </section>
        <section id="balance-sheet">
          <table class="data-table"><thead><tr><th></th><th>Mar 2023</th></tr></thead>
          <tbody><tr><td>Reserves</td><td>40</td></tr></tbody></table>
        </section>
    </body></html>"#;

    #[test]
    fn extracts_all_sheets_from_one_page() {
        let page = PageExtractor::new().extract(PAGE).unwrap();
        assert_eq!(page.entity.name, "Acme Ltd");
        assert_eq!(page.headline.get("Stock Price CAGR_1 Year"), Some("5%"));

        let names: Vec<_> = page.sheets.iter().map(|(name, _)| *name).collect();
        // Profit_Loss falls back to the quarters table and finds Sales there;
        // the other fallbacks find none of their metrics
        assert_eq!(names, vec!["Quarterly_Results", "Profit_Loss", "Balance_Sheet"]);
        let balance = &page.sheets[2].1;
        assert_eq!(balance.get("Reserves_Mar 2023"), Some("40"));
    }

    #[test]
    fn collected_sheets_keep_one_company_row_per_page() {
        let extractor = PageExtractor::new();
        let mut collected = CollectedSheets::new();
        collected.add(extractor.extract(PAGE).unwrap());
        collected.add(extractor.extract(PAGE).unwrap());

        assert_eq!(collected.company_info.len(), 2);
        assert_eq!(collected.main_metrics.len(), 2);
        let (sheet, records) = collected.detail_sheets().next().unwrap();
        assert_eq!(sheet.name, "Quarterly_Results");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn page_without_name_is_rejected() {
        let result = PageExtractor::new().extract("<html><body><p>Not found</p></body></html>");
        assert!(matches!(result, Err(ExtractError::MissingCompanyName)));
    }

    #[test]
    fn unusable_page_does_not_stop_the_batch() {
        let dir = tmp_dir("collect_mixed");
        fs::write(dir.join("ACME.html"), PAGE).unwrap();
        fs::write(dir.join("BROKEN.html"), "<html><body><p>Page not found</p></body></html>").unwrap();
        let store = PageStore::open(&dir).unwrap();

        let (collected, summary) = collect_pages(&store, None).unwrap();
        assert_eq!(summary, ParseSummary { succeeded: 1, failed: 1 });
        assert_eq!(collected.company_info.len(), 1);
        assert_eq!(collected.company_info[0].name, "Acme Ltd");

        let names: Vec<_> = organize_sheets(&collected).into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["Company_Info", "Main_Metrics", "Quarterly_2023", "Balance_2023", "Annual_2023"]
        );
    }

    #[test]
    fn debug_dumps_only_extracted_pages() {
        let dir = tmp_dir("collect_debug");
        let pages = dir.join("pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("ACME.html"), PAGE).unwrap();
        fs::write(pages.join("BROKEN.html"), "<html></html>").unwrap();
        let store = PageStore::open(&pages).unwrap();

        let debug_dir = dir.join("debug");
        let (_, summary) = collect_pages(&store, Some(&debug_dir)).unwrap();
        assert_eq!(summary.failed, 1);
        assert!(debug_dir.join("ACME_extracted.json").exists());
        assert!(!debug_dir.join("BROKEN_extracted.json").exists());
    }

    #[test]
    fn empty_store_collects_nothing() {
        let store = PageStore::open(tmp_dir("collect_empty")).unwrap();
        let (collected, summary) = collect_pages(&store, None).unwrap();
        assert!(collected.is_empty());
        assert_eq!(summary, ParseSummary::default());
    }
}
