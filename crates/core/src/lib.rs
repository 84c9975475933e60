pub mod domain;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pipeline;

pub use error::PipelineError;

pub mod config {
    /// Environment name of the operator override for the deliverable CSV URL.
    pub const REPORT_CSV_ENV: &str = "REPORT_CSV_URL";

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub report_csv_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                report_csv_url: std::env::var(REPORT_CSV_ENV).ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// The override only counts when it has non-whitespace content.
        pub fn report_csv_override(&self) -> Option<&str> {
            self.report_csv_url
                .as_deref()
                .filter(|s| !s.trim().is_empty())
        }
    }

}
