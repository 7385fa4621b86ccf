// src/storage/links.rs
// URL lists on disk and the download status report.
use crate::screener::models::{company_slug, UrlFormat};
use crate::storage::PageStore;
use crate::utils::error::StorageError;
use std::fs;
use std::io::Write;
use std::path::Path;

const URL_COLUMN: &str = "URL";

/// Reads company URLs from a `.txt` (one per line) or `.csv` (`URL` column) file.
pub fn read_url_list(path: &Path) -> Result<Vec<String>, StorageError> {
    match UrlFormat::from_path(path) {
        UrlFormat::Txt => {
            let content = fs::read_to_string(path)?;
            Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect())
        }
        UrlFormat::Csv => {
            let mut reader = csv::Reader::from_path(path)?;
            let column = reader
                .headers()?
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(URL_COLUMN))
                .ok_or_else(|| StorageError::MissingUrlColumn(path.display().to_string()))?;

            let mut urls = Vec::new();
            for record in reader.records() {
                if let Some(url) = record?.get(column).map(str::trim).filter(|u| !u.is_empty()) {
                    urls.push(url.to_string());
                }
            }
            Ok(urls)
        }
    }
}

/// Writes a URL list in the given format.
pub fn write_url_list(path: &Path, urls: &[String], format: UrlFormat) -> Result<(), StorageError> {
    match format {
        UrlFormat::Txt => {
            let mut file = fs::File::create(path)?;
            for url in urls {
                writeln!(file, "{}", url)?;
            }
        }
        UrlFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            writer.write_record([URL_COLUMN])?;
            for url in urls {
                writer.write_record([url])?;
            }
            writer.flush()?;
        }
    }
    tracing::info!("Saved {} URLs to {}", urls.len(), path.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStatus {
    pub url: String,
    pub downloaded: bool,
}

/// Marks each distinct company in `urls` as downloaded or pending, based on
/// whether a page with its slug is saved.
pub fn link_statuses(urls: &[String], store: &PageStore) -> Result<Vec<LinkStatus>, StorageError> {
    let saved = store.page_stems()?;
    let mut seen: Vec<String> = Vec::new();
    let mut statuses = Vec::new();

    for url in urls {
        let Some(slug) = company_slug(url) else {
            tracing::warn!("Cannot derive a page name from {}", url);
            continue;
        };
        if seen.contains(&slug) {
            continue;
        }
        statuses.push(LinkStatus { url: url.clone(), downloaded: saved.contains(&slug) });
        seen.push(slug);
    }
    Ok(statuses)
}

/// Writes `<url> - Downloaded|Pending` lines and returns (downloaded, pending).
pub fn write_status_report(path: &Path, statuses: &[LinkStatus]) -> Result<(usize, usize), StorageError> {
    let mut file = fs::File::create(path)?;
    let mut downloaded = 0;
    for status in statuses {
        let label = if status.downloaded {
            downloaded += 1;
            "Downloaded"
        } else {
            "Pending"
        };
        writeln!(file, "{} - {}", status.url, label)?;
    }
    Ok((downloaded, statuses.len() - downloaded))
}
