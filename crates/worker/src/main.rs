use clap::Parser;
use delivery_core::ingest::session::HttpSession;
use delivery_core::pipeline::{self, RunOptions};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the NIFTY-50 security-wise delivery report (Nifty50_Delivery.xlsx).
///
/// Set REPORT_CSV_URL to skip link discovery and download that CSV directly.
#[derive(Debug, Parser)]
#[command(name = "delivery_worker", version)]
struct Args {}

#[tokio::main]
async fn main() -> ExitCode {
    let _args = Args::parse();
    dotenvy::dotenv().ok();

    let settings = match delivery_core::config::Settings::from_env() {
        Ok(s) => s,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            return ExitCode::from(2);
        }
    };
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let session = match HttpSession::new() {
        Ok(s) => s,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "failed to build http session");
            eprintln!("ERROR: {err:#}");
            return ExitCode::from(2);
        }
    };

    let run_date = chrono::Utc::now().date_naive();
    let opts = RunOptions::new(Path::new(delivery_core::export::xlsx::OUTPUT_FILE), run_date)
        .with_report_override(settings.report_csv_override());

    match pipeline::run(&session, &opts).await {
        Ok(summary) => {
            tracing::info!(
                path = %summary.out_path.display(),
                rows = summary.written_rows,
                parsed = summary.parsed_rows,
                reference = summary.reference_symbols,
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code();
            let kind = err.kind();
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(kind, error = %err, "delivery report run failed");
            eprintln!("ERROR: {err}");
            ExitCode::from(code)
        }
    }
}

fn init_sentry(settings: &delivery_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
