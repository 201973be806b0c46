pub mod engine;
pub mod entitlements;
pub mod filter;
pub mod photo_gate;
pub mod query;
pub mod ranking;

pub use crate::domain::model::{Entitlements, Listing, ListingView, QueryResponse, Tier};
pub use crate::domain::ports::ListingStore;
pub use crate::utils::error::Result;
