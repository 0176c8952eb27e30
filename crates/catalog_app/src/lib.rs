//! Command line front end of the catalog crawler.
pub mod cli;
pub mod logging;
pub mod run;
pub mod settings;
