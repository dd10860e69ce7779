use async_trait::async_trait;

use super::error::OmdbResult;
use super::types::{MovieDetail, MovieSummary};

/// Keyword search and id lookup against the external catalog.
#[async_trait]
pub trait MovieOracle: Send + Sync {
    fn has_credential(&self) -> bool;

    /// Raw results for one page, posters unfiltered.
    async fn search(&self, term: &str, page: u32) -> OmdbResult<Vec<MovieSummary>>;

    async fn lookup(&self, id: &str) -> OmdbResult<Option<MovieDetail>>;
}
