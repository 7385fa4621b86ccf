// src/screener/models.rs
use std::path::Path;

/// Root of the site; company links on screen pages are relative to it.
pub const SITE_ROOT: &str = "https://www.screener.in";

/// Prefix for bare screen names given on the command line.
pub const SCREENS_ROOT: &str = "https://screener.in/screens/";

/// On-disk format of a URL list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum UrlFormat {
    /// One URL per line
    Txt,
    /// A `URL` header followed by one URL per row
    Csv,
}

impl UrlFormat {
    /// Guesses the format from a file extension, defaulting to plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => UrlFormat::Csv,
            _ => UrlFormat::Txt,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            UrlFormat::Txt => "txt",
            UrlFormat::Csv => "csv",
        }
    }
}

/// Stable file stem for a company URL: the path segment after `/company/`,
/// or the last non-empty segment for other URLs.
///
/// `https://www.screener.in/company/RELIANCE/consolidated/` → `RELIANCE`
pub fn company_slug(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = if url.contains("://") {
        reqwest::Url::parse(url).ok()?
    } else {
        reqwest::Url::parse(&format!("https://{}", url)).ok()?
    };

    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let slug = match segments.iter().position(|segment| *segment == "company") {
        Some(idx) => segments.get(idx + 1),
        None => segments.last(),
    }?;
    Some(slug.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_company_urls() {
        assert_eq!(
            company_slug("https://www.screener.in/company/RELIANCE/consolidated/").as_deref(),
            Some("RELIANCE")
        );
        assert_eq!(
            company_slug("https://www.screener.in/company/TCS/").as_deref(),
            Some("TCS")
        );
        assert_eq!(
            company_slug("www.screener.in/company/INFY").as_deref(),
            Some("INFY")
        );
        assert_eq!(
            company_slug("https://example.com/stocks/acme/").as_deref(),
            Some("acme")
        );
        assert_eq!(company_slug("https://www.screener.in/company/"), None);
        assert_eq!(company_slug("not a url at all"), None);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(UrlFormat::from_path(Path::new("links.CSV")), UrlFormat::Csv);
        assert_eq!(UrlFormat::from_path(Path::new("links.txt")), UrlFormat::Txt);
        assert_eq!(UrlFormat::from_path(Path::new("links")), UrlFormat::Txt);
    }
}
