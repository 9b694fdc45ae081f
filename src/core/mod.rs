pub mod detail;
pub mod export;
pub mod geo;
pub mod pagination;
pub mod retry;
pub mod stats;

pub use crate::domain::model::{Page, PageRequest};
pub use crate::domain::ports::{BookmarkStore, ConfigProvider, Storage, TourApi};
pub use crate::utils::error::Result;
