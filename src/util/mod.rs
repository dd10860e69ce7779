mod query;

pub use query::{parse_count, QueryParams};
