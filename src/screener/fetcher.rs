// src/screener/fetcher.rs
use crate::screener::client::download_page;
use crate::screener::models::company_slug;
use crate::storage::{OnExisting, PageStore};
use crate::utils::error::StorageError;
use std::time::Duration;

/// Pacing between groups of requests.
#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    pub batch_size: usize,
    pub batch_delay: Duration,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub saved: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl FetchSummary {
    /// True when every attempted download failed.
    pub fn nothing_saved(&self) -> bool {
        self.saved == 0 && self.failed > 0
    }
}

/// Applies the collision policy to the page directory before a fetch run.
pub fn prepare_destination(store: &PageStore, policy: OnExisting) -> Result<(), StorageError> {
    let existing = store.list_pages()?.len();
    if existing == 0 {
        return Ok(());
    }
    tracing::info!(
        "{} already holds {} pages, policy: {:?}",
        store.base_dir().display(),
        existing,
        policy
    );
    if policy == OnExisting::Clear {
        store.clear_pages()?;
    }
    Ok(())
}

/// Downloads every URL into the store, one file per company.
///
/// Failures are logged and counted; they never stop the batch.
pub async fn fetch_pages(
    client: &reqwest::Client,
    urls: &[String],
    store: &PageStore,
    policy: OnExisting,
    politeness: Politeness,
) -> FetchSummary {
    let mut summary = FetchSummary::default();
    let batch_size = politeness.batch_size.max(1);
    let total = urls.len();

    for (batch_idx, batch) in urls.chunks(batch_size).enumerate() {
        if batch_idx > 0 {
            tracing::debug!("Pausing {:?} between batches", politeness.batch_delay);
            tokio::time::sleep(politeness.batch_delay).await;
        }

        for (offset, url) in batch.iter().enumerate() {
            let index = batch_idx * batch_size + offset + 1;
            let Some(slug) = company_slug(url) else {
                tracing::warn!("Skipping {}: cannot derive a page name", url);
                summary.skipped += 1;
                continue;
            };

            tracing::info!("Fetching {}/{}: {}", index, total, url);
            let html = match download_page(client, url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Failed to download {}: {}", url, e);
                    summary.failed += 1;
                    continue;
                }
            };

            match store.save_page(&slug, &html, policy) {
                Ok(path) => {
                    tracing::info!("Saved {} to {}", slug, path.display());
                    summary.saved += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to save page for {}: {}", slug, e);
                    summary.failed += 1;
                }
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::tmp_dir;

    #[test]
    fn clear_policy_empties_the_destination() {
        let dir = tmp_dir("fetch_clear");
        let store = PageStore::new(&dir).unwrap();
        store.save_page("A", "a", OnExisting::Overwrite).unwrap();

        prepare_destination(&store, OnExisting::Suffix).unwrap();
        assert_eq!(store.list_pages().unwrap().len(), 1);

        prepare_destination(&store, OnExisting::Clear).unwrap();
        assert!(store.list_pages().unwrap().is_empty());
    }

    #[test]
    fn unusable_urls_are_skipped_without_network() {
        let dir = tmp_dir("fetch_skip");
        let store = PageStore::new(&dir).unwrap();
        let client = reqwest::Client::new();
        let urls = vec!["https://www.screener.in/company/".to_string()];
        let politeness = Politeness { batch_size: 5, batch_delay: Duration::from_millis(0) };

        let summary = tokio_test::block_on(fetch_pages(
            &client,
            &urls,
            &store,
            OnExisting::Overwrite,
            politeness,
        ));
        assert_eq!(summary, FetchSummary { saved: 0, failed: 0, skipped: 1 });
    }

    #[test]
    fn run_fails_only_when_nothing_was_saved() {
        let all_failed = FetchSummary { saved: 0, failed: 3, skipped: 0 };
        let partial = FetchSummary { saved: 1, failed: 2, skipped: 0 };
        let only_skipped = FetchSummary { saved: 0, failed: 0, skipped: 2 };

        assert!(all_failed.nothing_saved());
        assert!(!partial.nothing_saved());
        assert!(!only_skipped.nothing_saved());
    }
}
