use std::sync::Arc;

use catalog_app::cli::{run_options, Cli, Command};
use catalog_app::logging::{self, LogDestination};
use catalog_app::run::{self, CrawlOutcome};
use catalog_app::settings::Settings;
use catalog_engine::HttpSessionProvider;
use clap::Parser;
use engine_logging::{engine_info, engine_warn, FacadeSink, LogSink};
use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(
        LogDestination::from_flag(cli.logfile, chrono::Local::now().naive_local()),
        level,
    );

    let settings = Settings::load(&cli.settings)?;
    let sink: Arc<dyn LogSink> = Arc::new(FacadeSink);
    let provider = Arc::new(HttpSessionProvider::new(settings.fetch.request_timeout())?);

    match cli.command {
        Command::Crawl {
            series,
            search_all,
            pages,
        } => {
            let options = run_options(series, search_all, pages);
            match run::crawl(&settings, provider, options, interrupted(), sink).await? {
                CrawlOutcome::Completed(summary) => {
                    engine_info!(
                        "Visited {} items ({} already decided)",
                        summary.visited,
                        summary.skipped
                    );
                }
                CrawlOutcome::Interrupted => engine_info!("Progress saved, run again to resume"),
            }
        }
        Command::VerifySeries => {
            let verification = run::verify_series(&settings, provider, sink).await?;
            engine_info!("{} series kept", verification.kept.len());
        }
        Command::Export => run::export(&settings, sink)?,
    }
    Ok(())
}

/// Resolves on Ctrl-C. Without a signal handler it never resolves.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        engine_warn!("cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}
