pub mod enrichment;
pub use enrichment::{EnrichmentError, EnrichmentReport, EnrichmentService};

pub mod exploration;
pub use exploration::{CollectionCounts, ExplorationService, MovieWithPeople};

pub mod filter;
pub use filter::{AcceptAll, MinYearFilter, RowFilter};

pub mod loader;
pub use loader::{
    FilteredBulkLoader, LoadReport, LoaderError, PrimaryLoad, RetainedIds, SecondaryLoad,
    load_titles_and_people,
};

pub mod retrieval;
pub use retrieval::{DecompressReport, FetchReport, RetrievalService};

pub mod sink;
pub use sink::{PersonSink, RecordSink, TitleSink};
