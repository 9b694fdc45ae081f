pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{JsonBookmarkStore, LocalStorage, MemoryBookmarkStore, TourApiClient};
pub use config::AppConfig;
pub use crate::core::{
    detail::fetch_detail_view, geo, pagination::InfiniteScroll, retry::RetryPolicy,
};
pub use utils::error::{Result, TourError};
