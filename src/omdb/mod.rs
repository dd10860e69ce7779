pub mod client;
pub mod error;
pub mod oracle;
pub mod types;

pub use client::{OmdbClient, DEFAULT_BASE_URL};
pub use error::{OmdbError, OmdbResult};
pub use oracle::MovieOracle;
pub use types::{MovieDetail, MovieSummary, Rating, NO_POSTER};
