// src/extractors/company.rs

// --- Imports ---
use crate::extractors::dom::{own_text, text_of};
use crate::extractors::record::{EntityInfo, PLACEHOLDER};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static COMPANY_NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1.margin-0").expect("Failed to compile COMPANY_NAME_SELECTOR")
});

static SPAN_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span").expect("Failed to compile SPAN_SELECTOR")
});

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

// Exchange links wrap the ticker in a muted span
static EXCHANGE_LINK_SPAN_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.ink-700").expect("Failed to compile EXCHANGE_LINK_SPAN_SELECTOR")
});

static MARKET_CAP_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.font-size-18").expect("Failed to compile MARKET_CAP_SELECTOR")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Bse,
    Nse,
}

impl Exchange {
    /// Label prefix used in the page header, e.g. `BSE: 500325`.
    fn marker(self) -> &'static str {
        match self {
            Exchange::Bse => "BSE:",
            Exchange::Nse => "NSE:",
        }
    }

    fn domain(self) -> &'static str {
        match self {
            Exchange::Bse => "bseindia.com",
            Exchange::Nse => "nseindia.com",
        }
    }
}

/// Reads the identity block of a company page.
///
/// The company name heading is mandatory; every other field falls back to
/// [`PLACEHOLDER`].
pub fn extract_entity(document: &Html) -> Result<EntityInfo, ExtractError> {
    let name = document
        .select(&COMPANY_NAME_SELECTOR)
        .next()
        .map(text_of)
        .filter(|name| !name.is_empty())
        .ok_or(ExtractError::MissingCompanyName)?;

    let entity = EntityInfo {
        bse_tag: extract_exchange_tag(document, Exchange::Bse),
        nse_tag: extract_exchange_tag(document, Exchange::Nse),
        market_cap: extract_market_cap(document),
        name,
    };
    tracing::debug!("Company identity: {:?}", entity);
    Ok(entity)
}

/// Finds the ticker for an exchange, first from a labelled span, then from
/// the link to the exchange's own site.
pub fn extract_exchange_tag(document: &Html, exchange: Exchange) -> String {
    let marker = exchange.marker();

    // Method 1: span whose own text carries the label
    if let Some(text) = document
        .select(&SPAN_SELECTOR)
        .map(own_text)
        .find(|text| text.contains(marker))
    {
        return after_colon(&text).unwrap_or_default();
    }

    // Method 2: first link pointing at the exchange domain
    let link = document.select(&LINK_SELECTOR).find(|a| {
        a.value()
            .attr("href")
            .is_some_and(|href| href.contains(exchange.domain()))
    });
    if let Some(tag) = link
        .and_then(|a| a.select(&EXCHANGE_LINK_SPAN_SELECTOR).next())
        .and_then(|span| after_colon(&text_of(span)))
    {
        return tag;
    }

    tracing::debug!("No {} tag found, using placeholder", marker);
    PLACEHOLDER.to_string()
}

fn extract_market_cap(document: &Html) -> String {
    document
        .select(&MARKET_CAP_SELECTOR)
        .next()
        .and_then(|div| div.select(&SPAN_SELECTOR).next())
        .map(text_of)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Text between the first and second colon, trimmed.
fn after_colon(text: &str) -> Option<String> {
    text.split(':').nth(1).map(|tag| tag.trim().to_string())
}
