use std::time::Duration;

use crate::clients::datasets::DatasetClient;
use crate::config::Config;
use crate::services::retrieval::{DecompressReport, FetchReport, RetrievalService};

fn retrieval_service(config: &Config) -> anyhow::Result<RetrievalService> {
    let client = DatasetClient::new(
        config.data_dir(),
        Duration::from_secs(config.retrieval.request_timeout_seconds),
    )?;
    Ok(RetrievalService::new(client, config.retrieval.force_download))
}

pub async fn cmd_fetch(config: &Config) -> anyhow::Result<()> {
    let service = retrieval_service(config)?;
    let report = service.fetch_all(&config.retrieval.sources).await;
    print_fetch_report(&report);
    Ok(())
}

pub async fn cmd_decompress(config: &Config) -> anyhow::Result<()> {
    let service = retrieval_service(config)?;
    let report = service.decompress_all(&config.data_dir()).await?;
    print_decompress_report(&report);
    Ok(())
}

pub async fn cmd_prepare(config: &Config) -> anyhow::Result<()> {
    let service = retrieval_service(config)?;

    let fetched = service.fetch_all(&config.retrieval.sources).await;
    print_fetch_report(&fetched);

    let decompressed = service.decompress_all(&config.data_dir()).await?;
    print_decompress_report(&decompressed);

    Ok(())
}

fn print_fetch_report(report: &FetchReport) {
    println!();
    println!("{:-<70}", "");
    println!("Fetch complete!");
    println!("  Downloaded: {}", report.downloaded.len());
    for path in &report.downloaded {
        println!("    {}", path.display());
    }
    println!("  Skipped:    {} (already present)", report.skipped.len());
    println!("  Failed:     {}", report.failed.len());
    for (name, err) in &report.failed {
        println!("    {name}: {err}");
    }
}

fn print_decompress_report(report: &DecompressReport) {
    println!();
    println!("{:-<70}", "");
    println!("Decompression complete!");
    println!("  Decompressed: {}", report.decompressed.len());
    for path in &report.decompressed {
        println!("    {}", path.display());
    }
    println!("  Failed:       {}", report.failed.len());
    for (path, err) in &report.failed {
        println!("    {}: {err}", path.display());
    }
}
