use std::path::PathBuf;

use catalog_core::RunMode;
use catalog_engine::{PageWindow, RunOptions};
use clap::{Parser, Subcommand};

/// Incremental, filtered crawler for a paginated catalog
#[derive(Parser, Debug)]
#[command(
    name = "catalog-crawl",
    version,
    about = "Finds new catalog items worth bookmarking"
)]
pub struct Cli {
    /// Settings file (RON)
    #[arg(short, long, default_value = "settings.ron")]
    pub settings: PathBuf,

    /// Log to logs/log-<timestamp>.txt instead of the terminal
    #[arg(long)]
    pub logfile: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Crawl the listing and export what passed the filters
    Crawl {
        /// Only look for items of this series
        #[arg(long, conflicts_with = "search_all")]
        series: Option<String>,

        /// Walk the whole listing instead of stopping at the checkpoint
        #[arg(long)]
        search_all: bool,

        /// Restrict the run to listing pages A-B (1-based, inclusive)
        #[arg(long, value_name = "A-B")]
        pages: Option<PageWindow>,
    },

    /// Drop seen series whose listing no longer resolves
    VerifySeries,

    /// Export the accepted lists of the last run again
    Export,
}

/// Run options for a `crawl` invocation.
pub fn run_options(
    series: Option<String>,
    search_all: bool,
    pages: Option<PageWindow>,
) -> RunOptions {
    let mode = match series {
        Some(series) => RunMode::SingleSeries(series),
        None if search_all => RunMode::SearchAll,
        None => RunMode::Full,
    };
    RunOptions {
        mode,
        window: pages,
    }
}
