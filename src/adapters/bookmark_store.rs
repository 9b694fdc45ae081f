use crate::domain::model::Bookmark;
use crate::domain::ports::{BookmarkStore, Storage};
use crate::utils::error::{Result, TourError};
use crate::utils::validation::{validate_non_empty_string, validate_numeric_id};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const BOOKMARK_FILE: &str = "bookmarks.json";
const DOCUMENT_VERSION: u32 = 1;

fn validate_key(user_id: &str, content_id: &str) -> Result<()> {
    validate_non_empty_string("user_id", user_id)?;
    validate_numeric_id("content_id", content_id)
}

/// 收藏清單的共用操作，(user_id, content_id) 唯一
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BookmarkTable {
    version: u32,
    bookmarks: Vec<Bookmark>,
}

impl BookmarkTable {
    fn position(&self, user_id: &str, content_id: &str) -> Option<usize> {
        self.bookmarks
            .iter()
            .position(|b| b.user_id == user_id && b.content_id == content_id)
    }

    fn insert(
        &mut self,
        user_id: &str,
        content_id: &str,
        title: Option<String>,
    ) -> Result<Bookmark> {
        if self.position(user_id, content_id).is_some() {
            return Err(TourError::AlreadyBookmarked {
                user_id: user_id.to_string(),
                content_id: content_id.to_string(),
            });
        }

        let bookmark = Bookmark {
            user_id: user_id.to_string(),
            content_id: content_id.to_string(),
            title,
            created_at: Utc::now(),
        };
        self.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    fn delete(&mut self, user_id: &str, content_id: &str) -> Result<()> {
        match self.position(user_id, content_id) {
            Some(index) => {
                self.bookmarks.remove(index);
                Ok(())
            }
            None => Err(TourError::BookmarkNotFound {
                user_id: user_id.to_string(),
                content_id: content_id.to_string(),
            }),
        }
    }

    /// 新的在前；同一時間建立的以後加入者在前
    fn for_user(&self, user_id: &str) -> Vec<Bookmark> {
        let mut owned: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned
    }
}

#[derive(Debug, Default)]
pub struct MemoryBookmarkStore {
    table: Mutex<BookmarkTable>,
}

impl MemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkStore for MemoryBookmarkStore {
    async fn add(
        &self,
        user_id: &str,
        content_id: &str,
        title: Option<String>,
    ) -> Result<Bookmark> {
        validate_key(user_id, content_id)?;
        self.table.lock().await.insert(user_id, content_id, title)
    }

    async fn remove(&self, user_id: &str, content_id: &str) -> Result<()> {
        validate_key(user_id, content_id)?;
        self.table.lock().await.delete(user_id, content_id)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        validate_non_empty_string("user_id", user_id)?;
        Ok(self.table.lock().await.for_user(user_id))
    }

    async fn contains(&self, user_id: &str, content_id: &str) -> Result<bool> {
        validate_key(user_id, content_id)?;
        Ok(self.table.lock().await.position(user_id, content_id).is_some())
    }
}

/// 以單一 JSON 文件保存收藏，讀改寫整個流程都在鎖內完成
pub struct JsonBookmarkStore<S: Storage> {
    storage: S,
    file_name: String,
    lock: Mutex<()>,
}

impl<S: Storage> JsonBookmarkStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_file_name(storage, BOOKMARK_FILE)
    }

    pub fn with_file_name(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BookmarkTable> {
        match self.storage.read_file(&self.file_name).await? {
            Some(data) => {
                let table: BookmarkTable = serde_json::from_slice(&data)?;
                if table.version > DOCUMENT_VERSION {
                    return Err(TourError::ConfigError {
                        message: format!(
                            "{} was written by a newer version (v{})",
                            self.file_name, table.version
                        ),
                    });
                }
                Ok(table)
            }
            None => Ok(BookmarkTable {
                version: DOCUMENT_VERSION,
                bookmarks: Vec::new(),
            }),
        }
    }

    async fn save(&self, table: &BookmarkTable) -> Result<()> {
        let data = serde_json::to_vec_pretty(table)?;
        self.storage.write_file(&self.file_name, &data).await
    }
}

#[async_trait]
impl<S: Storage> BookmarkStore for JsonBookmarkStore<S> {
    async fn add(
        &self,
        user_id: &str,
        content_id: &str,
        title: Option<String>,
    ) -> Result<Bookmark> {
        validate_key(user_id, content_id)?;
        let _guard = self.lock.lock().await;

        let mut table = self.load().await?;
        let bookmark = table.insert(user_id, content_id, title)?;
        self.save(&table).await?;

        tracing::info!("🔖 {} bookmarked {}", user_id, content_id);
        Ok(bookmark)
    }

    async fn remove(&self, user_id: &str, content_id: &str) -> Result<()> {
        validate_key(user_id, content_id)?;
        let _guard = self.lock.lock().await;

        let mut table = self.load().await?;
        table.delete(user_id, content_id)?;
        self.save(&table).await?;

        tracing::info!("🗑️ {} removed bookmark {}", user_id, content_id);
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        validate_non_empty_string("user_id", user_id)?;
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.for_user(user_id))
    }

    async fn contains(&self, user_id: &str, content_id: &str) -> Result<bool> {
        validate_key(user_id, content_id)?;
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.position(user_id, content_id).is_some())
    }
}
