use crate::adapters::envelope;
use crate::core::geo::GeoPoint;
use crate::core::retry::RetryPolicy;
use crate::domain::model::{
    AreaCode, AttractionDetail, AttractionImage, AttractionSummary, ContentType, ListQuery,
    OperatingInfo, Page, PageRequest, PetInfo,
};
use crate::domain::ports::{ConfigProvider, TourApi};
use crate::utils::error::{Result, TourError};
use crate::utils::validation::{validate_numeric_id, validate_range, validate_required_field};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub const MAX_ROWS: u32 = 100;
pub const MAX_RADIUS_M: u32 = 20_000;
const ERROR_BODY_LIMIT: usize = 200;

type Params = Vec<(&'static str, String)>;

/// 公開觀光 API（KorService1）的 HTTP 客戶端
pub struct TourApiClient {
    client: Client,
    base_url: String,
    service_key: Option<String>,
    mobile_app: String,
    mobile_os: String,
    retry: RetryPolicy,
}

impl TourApiClient {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            service_key: config.service_key().map(str::to_string),
            mobile_app: config.mobile_app().to_string(),
            mobile_os: config.mobile_os().to_string(),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// 發出請求並解析外層；服務金鑰在第一次請求時才檢查
    async fn fetch_page<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        params: Params,
    ) -> Result<Page<T>> {
        let service_key = validate_required_field("TOUR_API_KEY", &self.service_key)?;
        let url = format!("{}/{}", self.base_url, operation);

        let mut query: Params = vec![
            ("serviceKey", service_key.clone()),
            ("MobileOS", self.mobile_os.clone()),
            ("MobileApp", self.mobile_app.clone()),
            ("_type", "json".to_string()),
        ];
        query.extend(params);

        self.retry
            .run(operation, |attempt| {
                tracing::debug!("📡 GET {} (attempt {})", url, attempt);
                self.send_once(operation, &url, &query)
            })
            .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<Page<T>> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("{} responded {} ({} bytes)", operation, status, body.len());

        if !status.is_success() {
            // 結果代碼不是 0000 就是應用層錯誤，與 HTTP 狀態無關，不可重試
            if let Err(e @ TourError::ApiError { .. }) =
                envelope::parse_page::<T>(operation, &body)
            {
                return Err(e);
            }
            return Err(TourError::HttpError {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        envelope::parse_page(operation, &body)
    }

    async fn fetch_first<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        params: Params,
    ) -> Result<Option<T>> {
        let page = self.fetch_page::<T>(operation, params).await?;
        Ok(page.items.into_iter().next())
    }
}

fn page_params(page: PageRequest) -> Result<Params> {
    validate_range("page_no", page.page_no, 1, u32::MAX)?;
    validate_range("num_of_rows", page.num_of_rows, 1, MAX_ROWS)?;
    Ok(vec![
        ("pageNo", page.page_no.to_string()),
        ("numOfRows", page.num_of_rows.to_string()),
    ])
}

fn push_opt(params: &mut Params, key: &'static str, value: Option<&String>) {
    if let Some(value) = value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        params.push((key, value.to_string()));
    }
}

#[async_trait]
impl TourApi for TourApiClient {
    async fn area_codes(&self, parent: Option<&str>) -> Result<Vec<AreaCode>> {
        let mut params = page_params(PageRequest::new(1, MAX_ROWS))?;
        if let Some(parent) = parent {
            validate_numeric_id("area_code", parent)?;
            params.push(("areaCode", parent.to_string()));
        }

        let page = self.fetch_page::<AreaCode>("areaCode1", params).await?;
        Ok(page.items)
    }

    async fn list_attractions(
        &self,
        query: &ListQuery,
        page: PageRequest,
    ) -> Result<Page<AttractionSummary>> {
        let mut params = page_params(page)?;
        params.push(("listYN", "Y".to_string()));
        params.push(("arrange", query.arrange.code().to_string()));

        if let Some(area) = &query.area_code {
            validate_numeric_id("area_code", area)?;
        }
        if let Some(sigungu) = &query.sigungu_code {
            if query.area_code.is_none() {
                return Err(TourError::validation("sigungu_code requires area_code"));
            }
            validate_numeric_id("sigungu_code", sigungu)?;
        }

        push_opt(&mut params, "areaCode", query.area_code.as_ref());
        push_opt(&mut params, "sigunguCode", query.sigungu_code.as_ref());
        push_opt(&mut params, "cat1", query.cat1.as_ref());
        push_opt(&mut params, "cat2", query.cat2.as_ref());
        push_opt(&mut params, "cat3", query.cat3.as_ref());
        if let Some(content_type) = query.content_type {
            params.push(("contentTypeId", content_type.id().to_string()));
        }

        match query.keyword() {
            Some(keyword) => {
                params.push(("keyword", keyword.to_string()));
                tracing::debug!("🔍 Searching attractions for {:?}", keyword);
                self.fetch_page("searchKeyword1", params).await
            }
            None => self.fetch_page("areaBasedList1", params).await,
        }
    }

    async fn nearby(
        &self,
        center: GeoPoint,
        radius_m: u32,
        content_type: Option<ContentType>,
        page: PageRequest,
    ) -> Result<Page<AttractionSummary>> {
        validate_range("radius_m", radius_m, 1, MAX_RADIUS_M)?;
        let mut params = page_params(page)?;
        params.extend([
            ("listYN", "Y".to_string()),
            ("arrange", "E".to_string()),
            ("mapX", center.lon.to_string()),
            ("mapY", center.lat.to_string()),
            ("radius", radius_m.to_string()),
        ]);
        if let Some(content_type) = content_type {
            params.push(("contentTypeId", content_type.id().to_string()));
        }

        self.fetch_page("locationBasedList1", params).await
    }

    async fn detail(&self, content_id: &str) -> Result<AttractionDetail> {
        validate_numeric_id("content_id", content_id)?;
        let mut params: Params = vec![("contentId", content_id.to_string())];
        for flag in [
            "defaultYN",
            "firstImageYN",
            "areacodeYN",
            "catcodeYN",
            "addrinfoYN",
            "mapinfoYN",
            "overviewYN",
        ] {
            params.push((flag, "Y".to_string()));
        }

        self.fetch_first("detailCommon1", params)
            .await?
            .ok_or_else(|| TourError::NotFound {
                what: format!("Attraction {}", content_id),
            })
    }

    async fn operating_info(
        &self,
        content_id: &str,
        content_type: ContentType,
    ) -> Result<Option<OperatingInfo>> {
        validate_numeric_id("content_id", content_id)?;
        let params: Params = vec![
            ("contentId", content_id.to_string()),
            ("contentTypeId", content_type.id().to_string()),
        ];
        self.fetch_first("detailIntro1", params).await
    }

    async fn images(&self, content_id: &str) -> Result<Vec<AttractionImage>> {
        validate_numeric_id("content_id", content_id)?;
        let params: Params = vec![
            ("contentId", content_id.to_string()),
            ("imageYN", "Y".to_string()),
            ("subImageYN", "Y".to_string()),
        ];
        let page = self.fetch_page::<AttractionImage>("detailImage1", params).await?;
        Ok(page.items)
    }

    async fn pet_info(&self, content_id: &str) -> Result<Option<PetInfo>> {
        validate_numeric_id("content_id", content_id)?;
        let params: Params = vec![("contentId", content_id.to_string())];
        self.fetch_first("detailPetTour1", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::app_config::AppConfig;

    #[tokio::test]
    async fn test_missing_service_key_fails_at_first_request() {
        let config = AppConfig::default();
        assert!(config.api.service_key.is_none());

        // 建立客戶端不需要金鑰
        let client = TourApiClient::new(&config).unwrap();

        let err = client.area_codes(None).await.unwrap_err();
        match err {
            TourError::MissingConfigError { field } => assert_eq!(field, "TOUR_API_KEY"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_page_params_bounds() {
        assert!(page_params(PageRequest::new(1, 100)).is_ok());
        assert!(page_params(PageRequest::new(0, 10)).is_err());
        assert!(page_params(PageRequest::new(1, 101)).is_err());
    }
}
