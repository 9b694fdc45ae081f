// Adapters layer: concrete implementations for external systems (tourism API, storage, bookmarks).

pub mod bookmark_store;
pub mod envelope;
pub mod storage;
pub mod tour_api;

pub use bookmark_store::{JsonBookmarkStore, MemoryBookmarkStore};
pub use storage::LocalStorage;
pub use tour_api::TourApiClient;
