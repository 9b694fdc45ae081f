use crate::core::geo::GeoPoint;
use crate::domain::model::{
    AreaCode, AttractionDetail, AttractionImage, AttractionSummary, Bookmark, ContentType,
    ListQuery, OperatingInfo, Page, PageRequest, PetInfo,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// 檔案不存在時回傳 `Ok(None)`
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn service_key(&self) -> Option<&str>;
    fn mobile_app(&self) -> &str;
    fn mobile_os(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_base_delay(&self) -> Duration;
    fn retry_max_delay(&self) -> Duration;
    fn data_dir(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
}

/// 公開觀光 API 的讀取操作
#[async_trait]
pub trait TourApi: Send + Sync {
    /// `parent` 為 None 時回傳市道層級，否則回傳該市道下的市郡區
    async fn area_codes(&self, parent: Option<&str>) -> Result<Vec<AreaCode>>;

    async fn list_attractions(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<AttractionSummary>>;

    async fn nearby(
        &self,
        center: GeoPoint,
        radius_m: u32,
        content_type: Option<ContentType>,
        page: PageRequest,
    ) -> Result<Page<AttractionSummary>>;

    async fn detail(&self, content_id: &str) -> Result<AttractionDetail>;

    async fn operating_info(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> Result<Option<OperatingInfo>>;

    async fn images(&self, content_id: &str) -> Result<Vec<AttractionImage>>;

    async fn pet_info(&self, content_id: &str) -> Result<Option<PetInfo>>;
}

/// 使用者收藏；同一使用者對同一景點只能有一筆
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn add(&self, user_id: &str, content_id: &str, title: Option<String>) -> Result<Bookmark>;
    async fn remove(&self, user_id: &str, content_id: &str) -> Result<()>;
    async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>>;
    async fn contains(&self, user_id: &str, content_id: &str) -> Result<bool>;
}
