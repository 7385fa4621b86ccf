// src/storage/mod.rs
pub mod links;
pub mod workbook;

use crate::extractors::page::CompanyPage;
use crate::utils::error::StorageError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const PAGE_EXTENSION: &str = "html";

/// What to do when the page directory already holds saved pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OnExisting {
    /// Delete the saved pages, then fetch everything again
    Clear,
    /// Write over pages with the same name
    Overwrite,
    /// Keep existing pages and save new ones as `<name>_<n>.html`
    Suffix,
}

/// Directory of saved company pages, one `<slug>.html` per company.
pub struct PageStore {
    base_dir: PathBuf,
}

impl PageStore {
    /// Opens the page directory, creating it if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Opens an existing page directory without creating it.
    pub fn open<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();
        if !base_path.is_dir() {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("page directory {} does not exist", base_path.display()),
            )));
        }
        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saved pages, sorted by file name.
    pub fn list_pages(&self) -> Result<Vec<PathBuf>, StorageError> {
        let mut pages = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let is_page = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(PAGE_EXTENSION));
            if is_page && path.is_file() {
                pages.push(path);
            }
        }
        pages.sort();
        Ok(pages)
    }

    /// File stems of all saved pages.
    pub fn page_stems(&self) -> Result<HashSet<String>, StorageError> {
        Ok(self
            .list_pages()?
            .iter()
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()))
            .map(str::to_string)
            .collect())
    }

    /// Deletes every saved page, returning how many were removed.
    pub fn clear_pages(&self) -> Result<usize, StorageError> {
        let pages = self.list_pages()?;
        for page in &pages {
            fs::remove_file(page)?;
        }
        tracing::info!("Removed {} saved pages from {}", pages.len(), self.base_dir.display());
        Ok(pages.len())
    }

    /// Where the page for `slug` is written under the given policy.
    pub fn page_path(&self, slug: &str, policy: OnExisting) -> PathBuf {
        let plain = self.base_dir.join(format!("{}.{}", slug, PAGE_EXTENSION));
        if policy != OnExisting::Suffix || !plain.exists() {
            return plain;
        }

        (1..)
            .map(|n| self.base_dir.join(format!("{}_{}.{}", slug, n, PAGE_EXTENSION)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(plain)
    }

    /// Writes a downloaded page.
    pub fn save_page(&self, slug: &str, html: &str, policy: OnExisting) -> Result<PathBuf, StorageError> {
        let file_path = self.page_path(slug, policy);
        fs::write(&file_path, html)?;
        tracing::debug!("Saved page to {}", file_path.display());
        Ok(file_path)
    }
}

/// Dumps what was extracted from one page as JSON, for debugging the selectors.
pub fn save_extraction_json(
    debug_dir: &Path,
    page_file: &Path,
    page: &CompanyPage,
) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(debug_dir)?;

    let stem = page_file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("page");
    let file_path = debug_dir.join(format!("{}_extracted.json", stem));

    let metadata = serde_json::json!({
        "source_file": page_file.display().to_string(),
        "company": page.entity,
        "main_metrics": page.headline,
        "sheets": page.sheets,
        "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
    });

    let metadata_str = serde_json::to_string_pretty(&metadata)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(&file_path, metadata_str)?;

    tracing::debug!("Saved extraction dump to {}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::extractors::record::{EntityInfo, FieldRecord};

    pub(crate) fn tmp_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("screener_extractor_{}", name));
        let _ = fs::remove_dir_all(&p);
        fs::create_dir_all(&p).unwrap();
        p
    }

    #[test]
    fn suffix_policy_keeps_both_pages() {
        let dir = tmp_dir("suffix");
        let store = PageStore::new(&dir).unwrap();

        let first = store.save_page("TCS", "<html>1</html>", OnExisting::Suffix).unwrap();
        let second = store.save_page("TCS", "<html>2</html>", OnExisting::Suffix).unwrap();
        let third = store.save_page("TCS", "<html>3</html>", OnExisting::Suffix).unwrap();

        assert!(first.ends_with("TCS.html"));
        assert!(second.ends_with("TCS_1.html"));
        assert!(third.ends_with("TCS_2.html"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "<html>1</html>");
        assert_eq!(store.list_pages().unwrap().len(), 3);
    }

    #[test]
    fn overwrite_policy_replaces_in_place() {
        let dir = tmp_dir("overwrite");
        let store = PageStore::new(&dir).unwrap();

        store.save_page("INFY", "old", OnExisting::Overwrite).unwrap();
        let path = store.save_page("INFY", "new", OnExisting::Overwrite).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "new");
        assert_eq!(store.list_pages().unwrap().len(), 1);
    }

    #[test]
    fn clear_removes_only_pages() {
        let dir = tmp_dir("clear");
        let store = PageStore::new(&dir).unwrap();
        store.save_page("A", "a", OnExisting::Overwrite).unwrap();
        store.save_page("B", "b", OnExisting::Overwrite).unwrap();
        fs::write(dir.join("notes.txt"), "keep").unwrap();

        assert_eq!(store.clear_pages().unwrap(), 2);
        assert!(store.list_pages().unwrap().is_empty());
        assert!(dir.join("notes.txt").exists());
    }

    #[test]
    fn open_requires_existing_directory() {
        let dir = tmp_dir("open").join("missing");
        assert!(PageStore::open(&dir).is_err());
    }

    #[test]
    fn extraction_dump_is_json() {
        let dir = tmp_dir("dump");
        let page = CompanyPage {
            entity: EntityInfo {
                name: "Acme".into(),
                bse_tag: "1".into(),
                nse_tag: "ACME".into(),
                market_cap: "-".into(),
            },
            headline: FieldRecord::new(),
            sheets: vec![("Ratios", [("ROCE %_Mar 2023", "12")].into_iter().collect())],
        };

        let path = save_extraction_json(&dir.join("debug"), Path::new("pages/ACME.html"), &page).unwrap();
        assert!(path.ends_with("ACME_extracted.json"));

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["company"]["name"], "Acme");
        assert_eq!(value["sheets"][0][0], "Ratios");
        assert_eq!(value["sheets"][0][1]["ROCE %_Mar 2023"], "12");
    }
}
