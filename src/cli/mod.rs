//! Command-line interface.
//!
//! Every stage is a subcommand with no runtime parameters; tuning lives in
//! `config.toml` and secrets in the environment.

mod commands;

use clap::{Parser, Subcommand};

/// IMDb ETL pipeline: retrieval, filtered loading, OMDb enrichment, exploration
#[derive(Parser)]
#[command(name = "imdb-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the configured dataset archives
    Fetch,

    /// Decompress downloaded archives in the data directory
    Decompress,

    /// Download and decompress in one step
    Prepare,

    /// Load the filtered title subset and its connected people
    Load,

    /// Enrich pending titles with OMDb metadata
    Enrich,

    /// Print counts, samples and relationship checks
    #[command(alias = "stats")]
    Explore,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
