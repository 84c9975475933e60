use crate::domain::universe::ReferenceSymbolSet;
use crate::error::PipelineError;
use crate::ingest::session::{Transport, PAGE_TIMEOUT};

pub const NIFTY50_LIST_URL: &str =
    "https://www.niftyindices.com/IndexConstituent/ind_nifty50list.csv";

/// Download the constituent list and collect its symbol column.
pub async fn fetch_reference_symbols(
    transport: &dyn Transport,
    url: &str,
) -> Result<ReferenceSymbolSet, PipelineError> {
    let res = transport
        .get(url, PAGE_TIMEOUT)
        .await
        .map_err(|err| PipelineError::fetch(url, &err))?;

    if !res.is_success() {
        return Err(PipelineError::Fetch {
            url: url.to_string(),
            detail: format!("HTTP {}", res.status),
        });
    }

    let symbols = parse_reference_symbols(&res.body)?;
    tracing::info!(%url, symbols = symbols.len(), "loaded reference list");
    Ok(symbols)
}

/// Uses the first column whose header mentions "symbol", wherever it sits.
pub fn parse_reference_symbols(csv_text: &str) -> Result<ReferenceSymbolSet, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    let idx = headers
        .iter()
        .position(|h| h.to_lowercase().contains("symbol"))
        .ok_or_else(|| {
            PipelineError::Schema(format!(
                "couldn't find symbol column in reference list. Found: {}",
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(v) = record.get(idx) {
            values.push(v.to_string());
        }
    }

    Ok(values.into_iter().collect())
}
