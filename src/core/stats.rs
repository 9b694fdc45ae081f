use crate::domain::model::{AreaCode, ContentType, ListQuery, PageRequest};
use crate::domain::ports::TourApi;
use crate::utils::error::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaCount {
    pub code: String,
    pub name: String,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaStats {
    pub content_type: Option<String>,
    pub areas: Vec<AreaCount>,
    /// 查詢失敗的地區代碼，不計入統計
    pub failed_areas: Vec<String>,
}

impl AreaStats {
    pub fn total(&self) -> u64 {
        self.areas.iter().map(|a| a.total as u64).sum()
    }

    pub fn share(&self, code: &str) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        self.areas
            .iter()
            .find(|a| a.code == code)
            .map(|a| a.total as f64 * 100.0 / total as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTypeCount {
    pub content_type_id: u16,
    pub label: String,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentTypeStats {
    pub area_code: Option<String>,
    pub types: Vec<ContentTypeCount>,
    /// 查詢失敗的 contentTypeId
    pub failed_types: Vec<u16>,
}

impl ContentTypeStats {
    pub fn total(&self) -> u64 {
        self.types.iter().map(|t| t.total as u64).sum()
    }
}

/// 只取一筆資料，讀回應中的 totalCount
async fn count_matching<A: TourApi + ?Sized>(api: &A, query: &ListQuery) -> Result<u32> {
    api.list_attractions(query, PageRequest::new(1, 1))
        .await
        .map(|page| page.total_count)
}

/// 各市道的景點數量，依數量由多到少排序
pub async fn area_distribution<A: TourApi + ?Sized>(
    api: &A,
    content_type: Option<ContentType>,
    concurrency: usize,
) -> Result<AreaStats> {
    let areas = api.area_codes(None).await?;
    tracing::info!("📊 Counting attractions across {} areas", areas.len());

    let results: Vec<(AreaCode, Result<u32>)> = stream::iter(areas)
        .map(|area| async move {
            let query = ListQuery {
                area_code: Some(area.code.clone()),
                content_type,
                ..Default::default()
            };
            let count = count_matching(api, &query).await;
            (area, count)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut stats = AreaStats {
        content_type: content_type.map(|t| t.to_string()),
        ..Default::default()
    };

    for (area, count) in results {
        match count {
            Ok(total) => stats.areas.push(AreaCount {
                code: area.code,
                name: area.name,
                total,
            }),
            Err(e) => {
                tracing::warn!("⚠️ Could not count area {} ({}): {}", area.code, area.name, e);
                stats.failed_areas.push(area.code);
            }
        }
    }

    stats
        .areas
        .sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.code.cmp(&b.code)));
    stats.failed_areas.sort();

    Ok(stats)
}

/// 指定地區（或全國）各觀光類型的數量
pub async fn content_type_distribution<A: TourApi + ?Sized>(
    api: &A,
    area_code: Option<&str>,
) -> Result<ContentTypeStats> {
    let mut stats = ContentTypeStats {
        area_code: area_code.map(str::to_string),
        ..Default::default()
    };

    for content_type in ContentType::ALL {
        let query = ListQuery {
            area_code: area_code.map(str::to_string),
            content_type: Some(content_type),
            ..Default::default()
        };
        match count_matching(api, &query).await {
            Ok(total) => stats.types.push(ContentTypeCount {
                content_type_id: content_type.id(),
                label: content_type.label().to_string(),
                total,
            }),
            Err(e) => {
                tracing::warn!("⚠️ Could not count content type {}: {}", content_type, e);
                stats.failed_types.push(content_type.id());
            }
        }
    }

    Ok(stats)
}
