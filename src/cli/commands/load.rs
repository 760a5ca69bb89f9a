use crate::config::Config;
use crate::services::load_titles_and_people;

use super::with_store;

pub async fn cmd_load(config: &Config) -> anyhow::Result<()> {
    let data_dir = config.data_dir();

    println!(
        "Loading up to {} titles from {} (startYear >= {})",
        config.loader.subset_size,
        data_dir.join(&config.loader.titles_file).display(),
        config.loader.min_start_year
    );

    let report = with_store(config, |store| async move {
        let report = load_titles_and_people(&store, &config.loader, &data_dir).await?;
        Ok(report)
    })
    .await?;

    println!();
    println!("{:-<70}", "");
    println!("Load complete!");
    println!(
        "  Titles: {} kept, {} inserted ({} chunks, {} rows read)",
        report.titles.retained.len(),
        report.titles.inserted,
        report.titles.chunks_read,
        report.titles.rows_scanned
    );
    println!(
        "  People: {} kept, {} inserted ({} rows read)",
        report.people.kept, report.people.inserted, report.people.rows_scanned
    );

    Ok(())
}
