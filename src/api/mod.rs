pub mod error;
pub mod favorites;
pub mod health;
pub mod movies;
pub mod types;

pub use error::ApiError;
pub use favorites::*;
pub use health::*;
pub use movies::*;
pub use types::*;
