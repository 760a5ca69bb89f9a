use crate::config::Config;
use crate::services::ExplorationService;

use super::with_store;

pub async fn cmd_explore(config: &Config) -> anyhow::Result<()> {
    let settings = &config.exploration;
    let strategy = settings.relation_match;

    with_store(config, |store| async move {
        let service = ExplorationService::new(store);

        let counts = service.counts().await?;
        println!("Collection counts");
        println!("{:-<70}", "");
        println!("  movies:  {} ({} enriched)", counts.movies, counts.enriched_movies);
        println!("  people:  {}", counts.people);
        println!("  reviews: {}", counts.reviews);

        println!();
        println!("Sample movies");
        println!("{:-<70}", "");
        for movie in service.sample_movies(settings.sample_limit).await? {
            println!("{}", serde_json::to_string(&movie)?);
        }

        println!();
        println!("Sample people");
        println!("{:-<70}", "");
        for person in service.sample_people(settings.sample_limit).await? {
            println!("{}", serde_json::to_string(&person)?);
        }

        println!();
        println!("People related to the first movie ({strategy:?} match)");
        println!("{:-<70}", "");
        match service.sample_relationship(strategy).await? {
            Some(sample) => println!("{}", serde_json::to_string_pretty(&sample)?),
            None => println!("No movies loaded."),
        }

        println!();
        println!("Movies with related people ({strategy:?} match)");
        println!("{:-<70}", "");
        for joined in service
            .movies_with_people(strategy, settings.join_limit)
            .await?
        {
            println!(
                "{} {}: {} people",
                joined.movie.tconst,
                joined.movie.primary_title.as_deref().unwrap_or("?"),
                joined.related_people.len()
            );
        }

        println!();
        println!("Related people counts ({strategy:?} match)");
        println!("{:-<70}", "");
        for row in service
            .relationship_counts(strategy, settings.count_limit)
            .await?
        {
            println!(
                "  {:<12} {:<40} {}",
                row.tconst,
                row.primary_title.as_deref().unwrap_or("?"),
                row.related_people_count
            );
        }

        Ok(())
    })
    .await
}
