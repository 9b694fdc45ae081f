use crate::domain::model::{Page, PageRequest};
use crate::utils::error::Result;
use std::future::Future;

/// 載入中旗標；future 被中途丟棄時也會清除
struct LoadingGuard<'a> {
    loading: &'a mut bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(loading: &'a mut bool) -> Self {
        *loading = true;
        Self { loading }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.loading = false;
    }
}

/// 無限捲動的累積狀態
///
/// 每次 `load_next` 成功會把結果接在後面並推進頁碼；失敗時完全不改動狀態，
/// 因此 `has_more` 維持原值，使用者可以直接重試。
#[derive(Debug, Clone)]
pub struct InfiniteScroll<T> {
    items: Vec<T>,
    next_page: u32,
    page_size: u32,
    total_count: Option<u32>,
    has_more: bool,
    loading: bool,
}

impl<T> InfiniteScroll<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            next_page: 1,
            page_size: page_size.max(1),
            total_count: None,
            has_more: true,
            loading: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn total_count(&self) -> Option<u32> {
        self.total_count
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 哨兵元素進入可視範圍時是否該載入下一頁
    pub fn should_load(&self, sentinel_visible: bool) -> bool {
        sentinel_visible && self.has_more && !self.loading
    }

    pub fn reset(&mut self) {
        self.items.clear();
        self.next_page = 1;
        self.total_count = None;
        self.has_more = true;
        self.loading = false;
    }

    /// 載入下一頁，回傳本次新增的筆數
    pub async fn load_next<F, Fut>(&mut self, fetch: F) -> Result<usize>
    where
        F: FnOnce(PageRequest) -> Fut,
        Fut: Future<Output = Result<Page<T>>>,
    {
        if !self.has_more {
            return Ok(0);
        }

        let request = PageRequest::new(self.next_page, self.page_size);
        let guard = LoadingGuard::new(&mut self.loading);
        let outcome = fetch(request).await;
        drop(guard);

        let page = match outcome {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    "⚠️ Failed to load page {} ({} items kept): {}",
                    request.page_no,
                    self.items.len(),
                    e
                );
                return Err(e);
            }
        };

        let added = page.items.len();
        self.items.extend(page.items);
        self.next_page += 1;
        self.total_count = Some(page.total_count);
        self.has_more = added > 0 && self.items.len() < page.total_count as usize;

        tracing::debug!(
            "Loaded page {}: +{} items ({}/{}), has_more={}",
            request.page_no,
            added,
            self.items.len(),
            page.total_count,
            self.has_more
        );

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TourError;
    use std::time::Duration;

    /// 模擬伺服器：共 `total` 筆，依頁碼切片
    fn serve(total: u32, request: PageRequest) -> Page<u32> {
        let start = (request.page_no - 1) * request.num_of_rows;
        let end = (start + request.num_of_rows).min(total);
        Page {
            items: (start..end).collect(),
            page_no: request.page_no,
            num_of_rows: request.num_of_rows,
            total_count: total,
        }
    }

    #[tokio::test]
    async fn test_three_pages_exhaust_forty_five_items() {
        let mut scroll = InfiniteScroll::new(20);

        assert_eq!(scroll.load_next(|r| async move { Ok(serve(45, r)) }).await.unwrap(), 20);
        assert!(scroll.has_more());
        assert_eq!(scroll.load_next(|r| async move { Ok(serve(45, r)) }).await.unwrap(), 20);
        assert!(scroll.has_more());
        assert_eq!(scroll.load_next(|r| async move { Ok(serve(45, r)) }).await.unwrap(), 5);

        assert!(!scroll.has_more());
        assert_eq!(scroll.items().len(), 45);
        assert_eq!(scroll.next_page(), 4);
        assert_eq!(scroll.total_count(), Some(45));
        assert!(!scroll.should_load(true));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_state_for_retry() {
        let mut scroll = InfiniteScroll::new(20);
        scroll.load_next(|r| async move { Ok(serve(45, r)) }).await.unwrap();

        let failed = scroll
            .load_next(|_| async {
                Err::<Page<u32>, _>(TourError::HttpError {
                    operation: "areaBasedList1".to_string(),
                    status: 500,
                    body: String::new(),
                })
            })
            .await;

        assert!(failed.is_err());
        assert!(scroll.has_more());
        assert_eq!(scroll.items().len(), 20);
        assert_eq!(scroll.next_page(), 2);
        assert!(!scroll.is_loading());

        // 重試時仍然請求第 2 頁
        scroll
            .load_next(|r| async move {
                assert_eq!(r.page_no, 2);
                Ok(serve(45, r))
            })
            .await
            .unwrap();
        assert_eq!(scroll.items()[20], 20);
    }

    #[tokio::test]
    async fn test_cancelled_load_clears_loading_flag() {
        let mut scroll: InfiniteScroll<u32> = InfiniteScroll::new(20);

        let pending = tokio::time::timeout(
            Duration::from_millis(20),
            scroll.load_next(|r| async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(serve(45, r))
            }),
        )
        .await;

        assert!(pending.is_err());
        assert!(!scroll.is_loading());
        assert!(scroll.should_load(true));
        assert_eq!(scroll.next_page(), 1);
        assert!(scroll.items().is_empty());

        // 取消後可以重新載入同一頁
        assert_eq!(scroll.load_next(|r| async move { Ok(serve(45, r)) }).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_empty_page_stops_scrolling() {
        let mut scroll: InfiniteScroll<u32> = InfiniteScroll::new(20);
        let added = scroll
            .load_next(|r| async move {
                Ok(Page {
                    items: vec![],
                    page_no: r.page_no,
                    num_of_rows: r.num_of_rows,
                    total_count: 100,
                })
            })
            .await
            .unwrap();

        assert_eq!(added, 0);
        assert!(!scroll.has_more());
    }

    #[tokio::test]
    async fn test_should_load_requires_visibility() {
        let mut scroll: InfiniteScroll<u32> = InfiniteScroll::new(10);
        assert!(!scroll.should_load(false));
        assert!(scroll.should_load(true));

        scroll.load_next(|r| async move { Ok(serve(5, r)) }).await.unwrap();
        assert!(!scroll.should_load(true));

        scroll.reset();
        assert!(scroll.should_load(true));
        assert!(scroll.items().is_empty());
        assert_eq!(scroll.next_page(), 1);
    }
}
