pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileListingStore, MemoryListingStore};
pub use config::EngineConfig;
pub use core::{engine::DirectoryEngine, filter::ListingQuery};
pub use domain::model::{Listing, ListingDetail, ListingView, QueryResponse, Tier};
pub use utils::error::{DirectoryError, Result};
