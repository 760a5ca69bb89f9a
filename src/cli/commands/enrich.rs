use crate::config::Config;
use crate::services::EnrichmentService;

use super::with_store;

pub async fn cmd_enrich(config: &Config) -> anyhow::Result<()> {
    let batch_size = config.enrichment.batch_size;

    let report = with_store(config, |store| async move {
        let service = EnrichmentService::from_config(store, &config.enrichment)?;
        Ok(service.enrich_batch(batch_size).await?)
    })
    .await?;

    println!();
    println!("{:-<70}", "");
    if report.selected == 0 {
        println!("Nothing to enrich.");
        return Ok(());
    }

    println!("Enrichment complete!");
    println!("  Selected:  {}", report.selected);
    println!("  Enriched:  {}", report.enriched);
    println!("  Not found: {}", report.not_found);
    println!("  Failed:    {}", report.failed);

    Ok(())
}
