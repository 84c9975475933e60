use thiserror::Error;

/// Everything that can stop a run. Each stage fails fast with one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transport failure, or a non-2xx answer from the reference list,
    /// warm-up or listing page.
    #[error("fetch failed for {url}: {detail}")]
    Fetch { url: String, detail: String },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("discovery error: {0}")]
    Discovery(String),

    /// Non-200 on the main CSV download.
    #[error("failed to download CSV: HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("downloaded CSV from {url} appears empty or too small ({len} chars)")]
    EmptyResponse { url: String, len: usize },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write spreadsheet: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

impl PipelineError {
    pub fn fetch(url: &str, err: &anyhow::Error) -> Self {
        Self::Fetch {
            url: url.to_string(),
            detail: format!("{err:#}"),
        }
    }

    /// Stable short name, used as a structured log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Schema(_) => "schema",
            Self::Discovery(_) => "discovery",
            Self::Http { .. } => "http",
            Self::EmptyResponse { .. } => "empty_response",
            Self::Csv(_) => "csv",
            Self::Export(_) => "export",
        }
    }

    pub const fn exit_code(&self) -> u8 {
        2
    }
}
