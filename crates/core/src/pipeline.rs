use crate::error::PipelineError;
use crate::export::{filter, xlsx};
use crate::ingest::discovery::{self, DiscoveryTarget, REPORT_PAGE_URL};
use crate::ingest::session::{Transport, SITE_ROOT};
use crate::ingest::{download, normalize, reference};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunOptions<'a> {
    pub reference_url: &'a str,
    pub report_override: Option<&'a str>,
    pub site_root: &'a str,
    pub listing_url: &'a str,
    pub out_path: &'a Path,
    /// Substituted when the CSV has no date column; also stamps the workbook.
    pub run_date: NaiveDate,
}

impl<'a> RunOptions<'a> {
    pub fn new(out_path: &'a Path, run_date: NaiveDate) -> Self {
        Self {
            reference_url: reference::NIFTY50_LIST_URL,
            report_override: None,
            site_root: SITE_ROOT,
            listing_url: REPORT_PAGE_URL,
            out_path,
            run_date,
        }
    }

    pub fn with_report_override(mut self, url: Option<&'a str>) -> Self {
        self.report_override = url;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub report_url: String,
    pub reference_symbols: usize,
    pub parsed_rows: usize,
    pub written_rows: usize,
    pub out_path: PathBuf,
}

/// Fetch, discover, download, parse, filter and write, in that order.
///
/// The output file is only touched once the CSV has parsed.
pub async fn run(
    transport: &dyn Transport,
    opts: &RunOptions<'_>,
) -> Result<RunSummary, PipelineError> {
    tracing::info!(url = %opts.reference_url, "fetching reference list");
    let symbols = reference::fetch_reference_symbols(transport, opts.reference_url).await?;

    tracing::info!("discovering deliverable CSV link");
    let target = DiscoveryTarget {
        override_url: opts.report_override,
        site_root: opts.site_root,
        listing_url: opts.listing_url,
    };
    let report_url = discovery::discover_report_url(transport, &target).await?;
    tracing::info!(url = %report_url, "CSV link");

    let csv_text = download::download_report_csv(transport, &report_url).await?;

    tracing::info!("parsing CSV");
    let rows = normalize::normalize_report(&csv_text, opts.run_date)?;
    let parsed_rows = rows.len();

    let kept = filter::filter_to_reference(rows, &symbols);
    let written_rows = xlsx::write_report(&kept, opts.out_path, opts.run_date)?;

    Ok(RunSummary {
        report_url,
        reference_symbols: symbols.len(),
        parsed_rows,
        written_rows,
        out_path: opts.out_path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::universe::ReferenceSymbolSet;
    use crate::ingest::session::fake::FakeTransport;

    const REFERENCE: &str = "Company Name,Industry,Symbol,Series,ISIN Code\n\
        Tata Consultancy Services Ltd.,Information Technology,TCS,EQ,INE467B01029\n\
        Infosys Ltd.,Information Technology,INFY,EQ,INE009A01021\n";

    const REPORT: &str = "Symbol,Series,Date,Total Traded Quantity,Deliverable Qty,% Dly Qt to Traded Qty\n\
        TCS,EQ,16-Oct-2026,1000,400,40.00\n\
        WIPRO,EQ,16-Oct-2026,500,250,50.00\n\
        INFY,EQ,16-Oct-2026,0,0,-\n";

    const REPORT_URL: &str = "https://www.nseindia.com/api/reports/security_deliverable.csv";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn listing() -> String {
        r#"<html><body>
            <a href="/api/reports/bhav.csv">Bhavcopy</a>
            <a href="/api/reports/security_deliverable.csv">Security-wise</a>
        </body></html>"#
            .to_string()
    }

    fn transport(report_body: &str) -> FakeTransport {
        FakeTransport::new()
            .route(reference::NIFTY50_LIST_URL, 200, REFERENCE)
            .route(SITE_ROOT, 200, "<html></html>")
            .route(REPORT_PAGE_URL, 200, &listing())
            .route(REPORT_URL, 200, report_body)
    }

    #[tokio::test]
    async fn end_to_end_filters_to_reference() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(xlsx::OUTPUT_FILE);
        let t = transport(REPORT);

        let summary = run(&t, &RunOptions::new(&out, day())).await.unwrap();

        assert_eq!(summary.report_url, REPORT_URL);
        assert_eq!(summary.reference_symbols, 2);
        assert_eq!(summary.parsed_rows, 3);
        assert_eq!(summary.written_rows, 2);
        assert!(out.exists());
        assert_eq!(
            t.requested(),
            vec![reference::NIFTY50_LIST_URL, SITE_ROOT, REPORT_PAGE_URL, REPORT_URL]
        );
    }

    #[tokio::test]
    async fn override_bypasses_listing_page() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(xlsx::OUTPUT_FILE);
        let t = FakeTransport::new()
            .route(reference::NIFTY50_LIST_URL, 200, REFERENCE)
            .route("https://mirror.test/deliv.csv", 200, REPORT);

        let opts = RunOptions::new(&out, day())
            .with_report_override(Some("https://mirror.test/deliv.csv"));
        let summary = run(&t, &opts).await.unwrap();

        assert_eq!(summary.report_url, "https://mirror.test/deliv.csv");
        assert_eq!(summary.written_rows, 2);
        assert!(!t.requested().iter().any(|u| u == SITE_ROOT));
    }

    #[tokio::test]
    async fn no_matches_still_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(xlsx::OUTPUT_FILE);
        let report = "Symbol,Traded Qty,Deliverable Qty\nWIPRO,500,250\nHCLTECH,800,200\n";
        let t = transport(report);

        let summary = run(&t, &RunOptions::new(&out, day())).await.unwrap();
        assert_eq!(summary.parsed_rows, 2);
        assert_eq!(summary.written_rows, 0);
        assert!(out.exists());
    }

    #[tokio::test]
    async fn schema_error_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(xlsx::OUTPUT_FILE);
        let report = "Symbol,Total Traded Quantity,Del. Amount\nTCS,1000,400\nINFY,200,100\n";
        let t = transport(report);

        let err = run(&t, &RunOptions::new(&out, day())).await.unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn download_failure_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(xlsx::OUTPUT_FILE);
        let t = FakeTransport::new()
            .route(reference::NIFTY50_LIST_URL, 200, REFERENCE)
            .route(SITE_ROOT, 200, "")
            .route(REPORT_PAGE_URL, 200, &listing())
            .route(REPORT_URL, 403, "Access Denied");

        let err = run(&t, &RunOptions::new(&out, day())).await.unwrap_err();
        assert!(matches!(err, PipelineError::Http { status: 403, .. }));
        assert!(!out.exists());
    }

    #[test]
    fn normalize_then_filter_is_deterministic() {
        let reference: ReferenceSymbolSet = ["TCS", "INFY"].into_iter().collect();
        let once = filter::filter_to_reference(
            normalize::normalize_report(REPORT, day()).unwrap(),
            &reference,
        );
        let twice = filter::filter_to_reference(
            normalize::normalize_report(REPORT, day()).unwrap(),
            &reference,
        );
        assert_eq!(once, twice);

        let summary: Vec<_> = once
            .iter()
            .map(|r| (r.symbol.as_str(), r.delivery_pct))
            .collect();
        assert_eq!(summary, vec![("TCS", 40.0), ("INFY", 0.0)]);
    }
}
