use crate::error::PipelineError;
use crate::ingest::session::{Transport, DOWNLOAD_TIMEOUT};

/// Bodies shorter than this are treated as error pages, not data.
pub const MIN_CSV_CHARS: usize = 50;

pub async fn download_report_csv(
    transport: &dyn Transport,
    url: &str,
) -> Result<String, PipelineError> {
    let res = transport
        .get(url, DOWNLOAD_TIMEOUT)
        .await
        .map_err(|err| PipelineError::fetch(url, &err))?;

    if res.status != 200 {
        return Err(PipelineError::Http {
            status: res.status,
            url: url.to_string(),
        });
    }

    let len = res.body.chars().count();
    if len < MIN_CSV_CHARS {
        return Err(PipelineError::EmptyResponse {
            url: url.to_string(),
            len,
        });
    }

    tracing::info!(%url, chars = len, "downloaded deliverable CSV");
    Ok(res.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::session::fake::FakeTransport;

    const URL: &str = "https://www.nseindia.com/r/security_deliverable.csv";
    const BODY: &str = "Symbol,Series,Date,Total Traded Quantity,Deliverable Qty\n\
        TCS,EQ,16-Oct-2026,1000,400\n";

    #[tokio::test]
    async fn returns_body_on_200() {
        let transport = FakeTransport::new().route(URL, 200, BODY);
        let text = download_report_csv(&transport, URL).await.unwrap();
        assert_eq!(text, BODY);
        assert_eq!(transport.timeout_for(URL), Some(DOWNLOAD_TIMEOUT));
    }

    #[tokio::test]
    async fn any_other_status_is_http_error() {
        for status in [204, 302, 403, 500] {
            let transport = FakeTransport::new().route(URL, status, BODY);
            let err = download_report_csv(&transport, URL).await.unwrap_err();
            match err {
                PipelineError::Http { status: got, .. } => assert_eq!(got, status),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn short_body_is_empty_response() {
        let transport = FakeTransport::new().route(URL, 200, "<html>denied</html>");
        let err = download_report_csv(&transport, URL).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyResponse { len: 19, .. }));

        let transport = FakeTransport::new().route(URL, 200, "");
        let err = download_report_csv(&transport, URL).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyResponse { len: 0, .. }));
    }

    #[tokio::test]
    async fn threshold_is_inclusive_at_fifty_chars() {
        let body = "x".repeat(MIN_CSV_CHARS);
        let transport = FakeTransport::new().route(URL, 200, &body);
        assert_eq!(download_report_csv(&transport, URL).await.unwrap(), body);
    }
}
