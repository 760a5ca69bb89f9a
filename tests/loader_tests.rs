//! Integration tests for the filtered bulk loader.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use imdb_etl::dataset::{DatasetError, Row};
use imdb_etl::db::Store;
use imdb_etl::services::{
    AcceptAll, FilteredBulkLoader, LoaderError, MinYearFilter, PersonSink, RecordSink,
    RetainedIds, TitleSink,
};

#[derive(Default)]
struct MemorySink {
    rows: Mutex<Vec<Row>>,
    calls: Mutex<usize>,
}

impl MemorySink {
    fn ids(&self, column: &str) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.get(column).map(str::to_string))
            .collect()
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl RecordSink for MemorySink {
    fn collection(&self) -> &str {
        "memory"
    }

    async fn insert_many(&self, rows: &[Row]) -> anyhow::Result<u64> {
        *self.calls.lock().unwrap() += 1;
        self.rows.lock().unwrap().extend_from_slice(rows);
        Ok(rows.len() as u64)
    }
}

fn write_fixture(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("imdb-etl-{name}-{}.tsv", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).unwrap();
    path
}

fn titles_fixture(rows: &[(&str, &str)]) -> PathBuf {
    let mut content = String::from("tconst\ttitleType\tstartYear\n");
    for (id, year) in rows {
        content.push_str(&format!("{id}\tmovie\t{year}\n"));
    }
    write_fixture("titles", &content)
}

fn retained(ids: &[&str]) -> RetainedIds {
    ids.iter().map(|s| (*s).to_string()).collect()
}

async fn load_primary(
    path: &Path,
    chunk_size: usize,
    target: usize,
) -> (imdb_etl::services::PrimaryLoad, MemorySink) {
    let sink = MemorySink::default();
    let load = FilteredBulkLoader::new(chunk_size)
        .load_filtered_primary(
            path,
            &sink,
            target,
            &["tconst", "startYear"],
            "tconst",
            &MinYearFilter::start_year(2000),
        )
        .await
        .unwrap();
    (load, sink)
}

#[tokio::test]
async fn test_year_filter_scenario_keeps_first_qualifying_rows() {
    let path = titles_fixture(&[("t1", "1999"), ("t2", "2001"), ("t3", "2005")]);

    let (load, sink) = load_primary(&path, 10_000, 2).await;

    assert_eq!(load.retained, retained(&["t2", "t3"]));
    assert_eq!(load.inserted, 2);
    assert_eq!(sink.ids("tconst"), ["t2", "t3"]);
    assert_eq!(sink.calls(), 1);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_primary_load_is_chunk_size_invariant() {
    let rows: Vec<(String, String)> = (0..25)
        .map(|i| (format!("tt{i:07}"), (1990 + i % 20).to_string()))
        .collect();
    let borrowed: Vec<(&str, &str)> = rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let path = titles_fixture(&borrowed);

    let (baseline, baseline_sink) = load_primary(&path, 10_000, 6).await;
    assert_eq!(baseline.retained.len(), 6);

    for chunk_size in 1..=7 {
        let (load, sink) = load_primary(&path, chunk_size, 6).await;
        assert_eq!(load.retained, baseline.retained, "chunk size {chunk_size}");
        assert_eq!(
            sink.ids("tconst"),
            baseline_sink.ids("tconst"),
            "chunk size {chunk_size}"
        );
    }

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_primary_load_never_exceeds_target() {
    let path = titles_fixture(&[
        ("t1", "2001"),
        ("t2", "2002"),
        ("t3", "2003"),
        ("t4", "2004"),
    ]);

    let (load, sink) = load_primary(&path, 3, 2).await;
    assert_eq!(sink.ids("tconst"), ["t1", "t2"]);
    assert_eq!(load.retained.len(), 2);

    let (load, sink) = load_primary(&path, 3, 10).await;
    assert_eq!(sink.ids("tconst"), ["t1", "t2", "t3", "t4"]);
    assert_eq!(load.inserted, 4);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_primary_load_stops_reading_once_target_is_reached() {
    let path = titles_fixture(&[
        ("t1", "2001"),
        ("t2", "2002"),
        ("t3", "2003"),
        ("t4", "2004"),
        ("t5", "2005"),
        ("t6", "2006"),
    ]);

    let (load, _) = load_primary(&path, 2, 2).await;
    assert_eq!(load.chunks_read, 1);
    assert_eq!(load.rows_scanned, 2);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_missing_and_malformed_years_are_filtered_out() {
    let path = titles_fixture(&[("t1", "\\N"), ("t2", "abc"), ("t3", "2010")]);

    let (load, sink) = load_primary(&path, 1, 5).await;
    assert_eq!(load.retained, retained(&["t3"]));
    assert_eq!(sink.ids("tconst"), ["t3"]);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_rows_without_key_are_skipped() {
    let path = titles_fixture(&[("\\N", "2001"), ("t2", "2002")]);

    let sink = MemorySink::default();
    let load = FilteredBulkLoader::new(10)
        .load_filtered_primary(&path, &sink, 5, &["tconst"], "tconst", &AcceptAll)
        .await
        .unwrap();

    assert_eq!(load.retained, retained(&["t2"]));

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_empty_fields_never_become_ids() {
    let titles = titles_fixture(&[("", "2001"), ("t2", "2002")]);
    let sink = MemorySink::default();
    let loader = FilteredBulkLoader::new(10);

    let load = loader
        .load_filtered_primary(&titles, &sink, 5, &["tconst"], "tconst", &AcceptAll)
        .await
        .unwrap();
    assert_eq!(load.retained, retained(&["t2"]));
    assert_eq!(sink.ids("tconst"), ["t2"]);

    let people = people_fixture(&[("p1", ""), ("p2", "t9")]);
    let people_sink = MemorySink::default();
    let secondary = loader
        .load_connected_secondary(
            &people,
            &people_sink,
            &load.retained,
            &["nconst", "knownForTitles"],
            "knownForTitles",
        )
        .await
        .unwrap();

    assert_eq!(secondary.kept, 0);
    assert_eq!(people_sink.calls(), 0);

    std::fs::remove_file(&titles).ok();
    std::fs::remove_file(&people).ok();
}

#[tokio::test]
async fn test_empty_result_skips_insert() {
    let path = titles_fixture(&[("t1", "1950"), ("t2", "1960")]);

    let (load, sink) = load_primary(&path, 10, 5).await;
    assert!(load.retained.is_empty());
    assert_eq!(load.inserted, 0);
    assert_eq!(sink.calls(), 0);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_invalid_inputs_are_rejected() {
    let path = titles_fixture(&[("t1", "2001")]);
    let loader = FilteredBulkLoader::new(10);
    let sink = MemorySink::default();

    let err = loader
        .load_filtered_primary(&path, &sink, 0, &["tconst"], "tconst", &AcceptAll)
        .await
        .unwrap_err();
    assert!(matches!(err, LoaderError::InvalidTarget));

    let err = loader
        .load_filtered_primary(&path, &sink, 1, &["tconst", "genres"], "tconst", &AcceptAll)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Dataset(DatasetError::MissingColumn { ref column, .. }) if column == "genres"
    ));

    let missing = std::env::temp_dir().join(format!("imdb-etl-absent-{}.tsv", uuid::Uuid::new_v4()));
    let err = loader
        .load_filtered_primary(&missing, &sink, 1, &["tconst"], "tconst", &AcceptAll)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoaderError::Dataset(DatasetError::SourceUnavailable { .. })
    ));

    std::fs::remove_file(&path).ok();
}

fn people_fixture(rows: &[(&str, &str)]) -> PathBuf {
    let mut content = String::from("nconst\tprimaryName\tknownForTitles\n");
    for (id, known_for) in rows {
        content.push_str(&format!("{id}\tName {id}\t{known_for}\n"));
    }
    write_fixture("people", &content)
}

#[tokio::test]
async fn test_secondary_keeps_only_connected_people() {
    let path = people_fixture(&[("p1", "t2,t9"), ("p2", "t5"), ("p3", "\\N")]);
    let sink = MemorySink::default();

    let load = FilteredBulkLoader::new(1)
        .load_connected_secondary(
            &path,
            &sink,
            &retained(&["t2", "t3"]),
            &["nconst", "knownForTitles"],
            "knownForTitles",
        )
        .await
        .unwrap();

    assert_eq!(sink.ids("nconst"), ["p1"]);
    assert_eq!(load.kept, 1);
    assert_eq!(load.rows_scanned, 3);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_secondary_matches_whole_ids_only() {
    let path = people_fixture(&[("p1", "tt0000002"), ("p2", "tt0000001,tt00000")]);
    let sink = MemorySink::default();

    FilteredBulkLoader::new(10)
        .load_connected_secondary(
            &path,
            &sink,
            &retained(&["tt00000"]),
            &["nconst", "knownForTitles"],
            "knownForTitles",
        )
        .await
        .unwrap();

    assert_eq!(sink.ids("nconst"), ["p2"]);

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_titles_and_people_reach_the_store() {
    let db_path =
        std::env::temp_dir().join(format!("imdb-etl-test-{}.db", uuid::Uuid::new_v4()));
    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .unwrap();

    let titles = write_fixture(
        "store-titles",
        "tconst\tprimaryTitle\tstartYear\tgenres\truntimeMinutes\n\
         t1\tOld\t1999\tDrama\t90\n\
         t2\tNew\t2001\tComedy,Drama\t\\N\n\
         t3\tNewer\t2005\t\\N\t101\n",
    );
    let people = people_fixture(&[("p1", "t2,t9"), ("p2", "t5")]);

    let loader = FilteredBulkLoader::new(2);
    let primary = loader
        .load_filtered_primary(
            &titles,
            &TitleSink::new(store.clone()),
            2,
            imdb_etl::models::title::TITLE_COLUMNS,
            "tconst",
            &MinYearFilter::start_year(2000),
        )
        .await
        .unwrap();

    loader
        .load_connected_secondary(
            &people,
            &PersonSink::new(store.clone()),
            &primary.retained,
            &["nconst", "primaryName", "knownForTitles"],
            "knownForTitles",
        )
        .await
        .unwrap();

    assert_eq!(store.count_movies().await.unwrap(), 2);
    assert_eq!(store.count_people().await.unwrap(), 1);

    let t2 = store.get_movie("t2").await.unwrap().unwrap();
    assert_eq!(t2.primary_title.as_deref(), Some("New"));
    assert_eq!(t2.start_year, Some(2001));
    assert_eq!(t2.runtime_minutes, None);
    assert_eq!(t2.omdb_loaded, None);

    let t3 = store.get_movie("t3").await.unwrap().unwrap();
    assert_eq!(t3.genres, None);

    store.close().await.unwrap();
    std::fs::remove_file(&titles).ok();
    std::fs::remove_file(&people).ok();
    std::fs::remove_file(&db_path).ok();
}
