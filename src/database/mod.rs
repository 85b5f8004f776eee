pub mod audit;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod snapshot;

pub use audit::{Change, Provenance};
pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::PartialUpdate;
pub use snapshot::{Depth, Snapshot};
