use crate::error::PipelineError;
use crate::ingest::session::{Transport, PAGE_TIMEOUT, SITE_ROOT};
use scraper::{Html, Selector};
use url::Url;

pub const REPORT_PAGE_URL: &str = "https://www.nseindia.com/report-detail/eq_security";

/// Preferred links mention one of these (case-insensitive).
const LINK_KEYWORDS: [&str; 2] = ["deliver", "security"];

/// Where the deliverable CSV should come from. `override_url` wins when set.
#[derive(Debug, Clone)]
pub struct DiscoveryTarget<'a> {
    pub override_url: Option<&'a str>,
    pub site_root: &'a str,
    pub listing_url: &'a str,
}

impl Default for DiscoveryTarget<'_> {
    fn default() -> Self {
        Self {
            override_url: None,
            site_root: SITE_ROOT,
            listing_url: REPORT_PAGE_URL,
        }
    }
}

pub async fn discover_report_url(
    transport: &dyn Transport,
    target: &DiscoveryTarget<'_>,
) -> Result<String, PipelineError> {
    if let Some(url) = target.override_url.filter(|s| !s.trim().is_empty()) {
        tracing::info!(%url, "using REPORT_CSV_URL override");
        return Ok(url.to_string());
    }

    // Warm-up: the origin hands out session cookies on the root page.
    let warm = transport
        .get(target.site_root, PAGE_TIMEOUT)
        .await
        .map_err(|err| PipelineError::fetch(target.site_root, &err))?;
    tracing::debug!(status = warm.status, "warm-up request done");

    let res = transport
        .get(target.listing_url, PAGE_TIMEOUT)
        .await
        .map_err(|err| PipelineError::fetch(target.listing_url, &err))?;
    if !res.is_success() {
        return Err(PipelineError::Fetch {
            url: target.listing_url.to_string(),
            detail: format!("HTTP {}", res.status),
        });
    }

    let base = Url::parse(target.site_root).map_err(|err| {
        PipelineError::Discovery(format!("invalid site root {}: {err}", target.site_root))
    })?;
    let links = extract_csv_links(&res.body, &base);
    tracing::debug!(candidates = links.len(), "csv links on listing page");

    select_report_link(&links)
}

/// Every `<a href>` containing ".csv", resolved against `base`.
///
/// Links that already start with `http` are kept as written.
pub fn extract_csv_links(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    doc.select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.to_lowercase().contains(".csv"))
        .filter_map(|href| {
            if href.starts_with("http") {
                Some(href.to_string())
            } else {
                base.join(href).ok().map(String::from)
            }
        })
        .collect()
}

/// Keyword match first, then the first link on the page.
pub fn select_report_link(links: &[String]) -> Result<String, PipelineError> {
    if let Some(link) = links.iter().find(|l| {
        let low = l.to_lowercase();
        LINK_KEYWORDS.iter().any(|k| low.contains(k))
    }) {
        return Ok(link.clone());
    }

    match links.first() {
        Some(link) => {
            tracing::warn!(
                %link,
                candidates = links.len(),
                "no CSV link matched deliver/security keywords; falling back to first link"
            );
            Ok(link.clone())
        }
        None => Err(PipelineError::Discovery(
            "could not discover CSV link on report page; provide REPORT_CSV_URL".to_string(),
        )),
    }
}
