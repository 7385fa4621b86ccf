// src/screener/discovery.rs
use crate::screener::client::download_page;
use crate::screener::models::{UrlFormat, SCREENS_ROOT, SITE_ROOT};
use crate::utils::error::FetchError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;

static PAGINATION_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.pagination a").expect("Failed to compile PAGINATION_LINK_SELECTOR")
});

static COMPANY_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href^="/company/"]"#).expect("Failed to compile COMPANY_LINK_SELECTOR")
});

/// Turns user input into a screen base URL ending in `/`, without any page query.
///
/// Full URLs are kept, `screener.in/...` gets a scheme, and anything else is
/// taken as a screen path under [`SCREENS_ROOT`].
pub fn normalize_screen_url(input: &str) -> String {
    let input = input.trim();
    let mut base = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else if input.starts_with("screener.in") {
        format!("https://{}", input)
    } else {
        format!("{}{}", SCREENS_ROOT, input)
    };

    if let Some(idx) = base.find("?page=") {
        base.truncate(idx);
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

pub fn page_url(base: &str, page: u32) -> String {
    format!("{}?page={}", base, page)
}

/// Highest numbered pagination link on a screen page, or 1.
pub fn total_pages(html: &str) -> u32 {
    let document = Html::parse_document(html);
    document
        .select(&PAGINATION_LINK_SELECTOR)
        .filter_map(|a| a.text().collect::<String>().trim().parse::<u32>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Absolute URLs of every company link on a screen page, in page order.
pub fn company_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&COMPANY_LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| format!("{}{}", SITE_ROOT, href))
        .collect()
}

/// File name for the URL list of a screen: its last path segment plus extension.
pub fn output_file_name(base: &str, format: UrlFormat) -> String {
    let stem = base
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("screen");
    format!("{}.{}", stem, format.extension())
}

/// Walks the first `requested` pages of a screen (all pages when `None`)
/// and collects company URLs, without duplicates.
pub async fn discover_company_urls(
    client: &reqwest::Client,
    base: &str,
    requested: Option<u32>,
    page_delay: Duration,
) -> Result<Vec<String>, FetchError> {
    reqwest::Url::parse(base).map_err(|_| FetchError::InvalidUrl(base.to_string()))?;

    let first_page = download_page(client, &page_url(base, 1)).await?;
    let total = total_pages(&first_page);
    let pages = requested.unwrap_or(total).clamp(1, total);
    tracing::info!("Total pages found: {}, processing {}", total, pages);

    let mut urls: Vec<String> = Vec::new();
    for page in 1..=pages {
        let html = if page == 1 {
            first_page.clone()
        } else {
            tokio::time::sleep(page_delay).await;
            download_page(client, &page_url(base, page)).await?
        };

        let found = company_links(&html);
        tracing::info!("Collected {} URLs from page {}", found.len(), page);
        for url in found {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }

    Ok(urls)
}
