// Adapters layer: concrete listing stores behind the `ListingStore` port.

pub mod storage;

pub use storage::{FileListingStore, MemoryListingStore, SnapshotFormat};
