pub mod client;
pub mod error;
pub mod types;

pub use client::ProductsClient;
pub use error::ClientError;
pub use types::UpdateOutcome;
