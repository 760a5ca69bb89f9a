pub mod cli;
pub mod clients;
pub mod config;
pub mod dataset;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;

use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load()?;

    init_tracing(&config);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists, leaving it untouched.");
        }
        return Ok(());
    }

    config.validate()?;
    info!(data_dir = %config.general.data_dir, "Configuration loaded");

    match command {
        Commands::Fetch => cli::cmd_fetch(&config).await,
        Commands::Decompress => cli::cmd_decompress(&config).await,
        Commands::Prepare => cli::cmd_prepare(&config).await,
        Commands::Load => cli::cmd_load(&config).await,
        Commands::Enrich => cli::cmd_enrich(&config).await,
        Commands::Explore => cli::cmd_explore(&config).await,
        Commands::Init => Ok(()),
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
