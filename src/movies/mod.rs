pub mod fetcher;
pub mod latest;
pub mod terms;

pub use fetcher::{BatchFetcher, FetchOptions, PageStrategy, DEFAULT_COUNT, MAX_RANDOM_PAGE};
pub use latest::{LatestBatch, Snapshot, Ticket};
pub use terms::{shuffle_terms, SEARCH_TERMS};
