use crate::core::geo::{self, GeoPoint};
use crate::domain::model::{
    AttractionDetail, AttractionImage, AttractionSummary, OperatingInfo, PageRequest, PetInfo,
};
use crate::domain::ports::TourApi;
use crate::utils::error::Result;
use crate::utils::validation::validate_numeric_id;
use serde::Serialize;

pub const NEARBY_RADIUS_M: u32 = 2_000;
pub const NEARBY_LIMIT: u32 = 6;

/// 詳細頁需要的全部資料；只有 `detail` 是必要的
#[derive(Debug, Clone, Serialize)]
pub struct AttractionDetailView {
    pub detail: AttractionDetail,
    pub location: Option<GeoPoint>,
    pub operating_info: Option<OperatingInfo>,
    pub images: Vec<AttractionImage>,
    pub pet_info: Option<PetInfo>,
    pub nearby: Vec<AttractionSummary>,
}

fn degrade<T>(source: &str, content_id: &str, result: Result<T>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                "⚠️ {} for {} unavailable, continuing without it: {}",
                source,
                content_id,
                e
            );
            fallback
        }
    }
}

/// 同時抓取共通資訊、圖片與寵物資訊；共通資訊失敗才算整體失敗
pub async fn fetch_detail_view<A: TourApi + ?Sized>(
    api: &A,
    content_id: &str,
) -> Result<AttractionDetailView> {
    validate_numeric_id("content_id", content_id)?;

    let (detail, images, pet_info) = tokio::join!(
        api.detail(content_id),
        api.images(content_id),
        api.pet_info(content_id),
    );
    let detail = detail?;

    let images = degrade("images", content_id, images, Vec::new());
    let pet_info = degrade("pet info", content_id, pet_info, None);

    let location = geo::convert(&detail.summary.mapx, &detail.summary.mapy).ok();

    // 營業資訊需要 contentTypeId，附近景點需要座標，兩者都在共通資訊之後才能發出
    let operating_info = async {
        match detail.summary.content_type() {
            Some(content_type) => degrade(
                "operating info",
                content_id,
                api.operating_info(content_id, content_type).await,
                None,
            ),
            None => None,
        }
    };
    let nearby = async {
        match location {
            Some(center) => {
                let page = api
                    .nearby(center, NEARBY_RADIUS_M, None, PageRequest::new(1, NEARBY_LIMIT + 1))
                    .await
                    .map(|page| {
                        page.items
                            .into_iter()
                            .filter(|item| item.content_id != content_id)
                            .take(NEARBY_LIMIT as usize)
                            .collect::<Vec<_>>()
                    });
                degrade("nearby attractions", content_id, page, Vec::new())
            }
            None => Vec::new(),
        }
    };
    let (operating_info, nearby) = tokio::join!(operating_info, nearby);

    tracing::debug!(
        "Detail view for {}: {} images, operating_info={}, pet_info={}, {} nearby",
        content_id,
        images.len(),
        operating_info.is_some(),
        pet_info.is_some(),
        nearby.len()
    );

    Ok(AttractionDetailView {
        detail,
        location,
        operating_info,
        images,
        pet_info,
        nearby,
    })
}
