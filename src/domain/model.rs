use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// TourAPI 的觀光類型代碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    TouristSpot,
    CulturalFacility,
    Festival,
    TravelCourse,
    Leisure,
    Lodging,
    Shopping,
    Restaurant,
    Other(u16),
}

impl ContentType {
    pub const ALL: [ContentType; 8] = [
        ContentType::TouristSpot,
        ContentType::CulturalFacility,
        ContentType::Festival,
        ContentType::TravelCourse,
        ContentType::Leisure,
        ContentType::Lodging,
        ContentType::Shopping,
        ContentType::Restaurant,
    ];

    pub fn id(&self) -> u16 {
        match self {
            ContentType::TouristSpot => 12,
            ContentType::CulturalFacility => 14,
            ContentType::Festival => 15,
            ContentType::TravelCourse => 25,
            ContentType::Leisure => 28,
            ContentType::Lodging => 32,
            ContentType::Shopping => 38,
            ContentType::Restaurant => 39,
            ContentType::Other(id) => *id,
        }
    }

    pub fn from_id(id: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .unwrap_or(ContentType::Other(id))
    }

    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u16>().ok().map(Self::from_id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentType::TouristSpot => "관광지",
            ContentType::CulturalFacility => "문화시설",
            ContentType::Festival => "축제공연행사",
            ContentType::TravelCourse => "여행코스",
            ContentType::Leisure => "레포츠",
            ContentType::Lodging => "숙박",
            ContentType::Shopping => "쇼핑",
            ContentType::Restaurant => "음식점",
            ContentType::Other(_) => "기타",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.id())
    }
}

/// 列表排序方式；O/Q/R 只回傳有代表圖片的資料
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Arrange {
    #[default]
    Title,
    Modified,
    Created,
    TitleWithImage,
    ModifiedWithImage,
    CreatedWithImage,
}

impl Arrange {
    pub fn code(&self) -> &'static str {
        match self {
            Arrange::Title => "A",
            Arrange::Modified => "C",
            Arrange::Created => "D",
            Arrange::TitleWithImage => "O",
            Arrange::ModifiedWithImage => "Q",
            Arrange::CreatedWithImage => "R",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCode {
    pub code: String,
    pub name: String,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub rnum: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttractionSummary {
    #[serde(rename = "contentid")]
    pub content_id: String,
    #[serde(rename = "contenttypeid", default)]
    pub content_type_id: String,
    pub title: String,
    #[serde(default)]
    pub addr1: String,
    #[serde(default)]
    pub addr2: String,
    #[serde(rename = "areacode", default)]
    pub area_code: String,
    #[serde(rename = "sigungucode", default)]
    pub sigungu_code: String,
    #[serde(default)]
    pub cat1: String,
    #[serde(default)]
    pub cat2: String,
    #[serde(default)]
    pub cat3: String,
    #[serde(rename = "firstimage", default)]
    pub first_image: String,
    #[serde(rename = "firstimage2", default)]
    pub first_image_thumb: String,
    #[serde(default)]
    pub mapx: String,
    #[serde(default)]
    pub mapy: String,
    #[serde(default)]
    pub tel: String,
    #[serde(rename = "modifiedtime", default)]
    pub modified_time: String,
    /// 僅在 locationBasedList 結果中出現（公尺）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
}

impl AttractionSummary {
    pub fn content_type(&self) -> Option<ContentType> {
        ContentType::parse(&self.content_type_id)
    }

    pub fn has_image(&self) -> bool {
        !self.first_image.trim().is_empty()
    }

    pub fn address(&self) -> String {
        match (self.addr1.trim(), self.addr2.trim()) {
            (a, "") => a.to_string(),
            (a, b) => format!("{} {}", a, b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttractionDetail {
    #[serde(flatten)]
    pub summary: AttractionSummary,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub zipcode: String,
}

/// detailIntro1 回應；欄位依觀光類型而異，未列出的欄位保留在 `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingInfo {
    #[serde(rename = "contentid", default)]
    pub content_id: String,
    #[serde(rename = "contenttypeid", default)]
    pub content_type_id: String,
    #[serde(rename = "usetime", default, skip_serializing_if = "Option::is_none")]
    pub use_time: Option<String>,
    #[serde(rename = "restdate", default, skip_serializing_if = "Option::is_none")]
    pub rest_date: Option<String>,
    #[serde(rename = "infocenter", default, skip_serializing_if = "Option::is_none")]
    pub info_center: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(rename = "chkbabycarriage", default, skip_serializing_if = "Option::is_none")]
    pub baby_carriage: Option<String>,
    #[serde(rename = "chkpet", default, skip_serializing_if = "Option::is_none")]
    pub pets: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttractionImage {
    #[serde(rename = "originimgurl", default)]
    pub origin_url: String,
    #[serde(rename = "smallimageurl", default)]
    pub small_url: String,
    #[serde(rename = "imgname", default)]
    pub name: String,
    #[serde(rename = "serialnum", default)]
    pub serial_num: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetInfo {
    #[serde(rename = "acmpyTypeCd", default)]
    pub companion_type: String,
    #[serde(rename = "acmpyPsblCpam", default)]
    pub allowed_pets: String,
    #[serde(rename = "acmpyNeedMtr", default)]
    pub requirements: String,
    #[serde(rename = "relaPosesFclty", default)]
    pub facilities: String,
    #[serde(rename = "etcAcmpyInfo", default)]
    pub extra_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub user_id: String,
    pub content_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 一頁查詢結果
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_no: u32,
    pub num_of_rows: u32,
    pub total_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_no: u32,
    pub num_of_rows: u32,
}

impl PageRequest {
    pub fn new(page_no: u32, num_of_rows: u32) -> Self {
        Self {
            page_no,
            num_of_rows,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// 瀏覽 / 搜尋條件；有 keyword 時走 searchKeyword1，否則走 areaBasedList1
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub area_code: Option<String>,
    pub sigungu_code: Option<String>,
    pub content_type: Option<ContentType>,
    pub cat1: Option<String>,
    pub cat2: Option<String>,
    pub cat3: Option<String>,
    pub keyword: Option<String>,
    pub arrange: Arrange,
}

impl ListQuery {
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    /// 數字欄位有時以字串、有時以數字回傳
    pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n),
            Raw::Text(s) if s.trim().is_empty() => Ok(0),
            Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_ids_round_trip() {
        for t in ContentType::ALL {
            assert_eq!(ContentType::from_id(t.id()), t);
        }
        assert_eq!(ContentType::parse("99"), Some(ContentType::Other(99)));
        assert_eq!(ContentType::parse("abc"), None);
    }

    #[test]
    fn test_summary_deserializes_from_api_fields() {
        let raw = serde_json::json!({
            "contentid": "126508",
            "contenttypeid": "12",
            "title": "경복궁",
            "addr1": "서울특별시 종로구 사직로 161",
            "addr2": "",
            "areacode": "1",
            "mapx": "126.9769930325",
            "mapy": "37.5788222356",
            "firstimage": "http://tong.visitkorea.or.kr/cms/resource/33/2678633_image2_1.jpg"
        });

        let summary: AttractionSummary = serde_json::from_value(raw).unwrap();
        assert_eq!(summary.content_id, "126508");
        assert_eq!(summary.content_type(), Some(ContentType::TouristSpot));
        assert_eq!(summary.address(), "서울특별시 종로구 사직로 161");
        assert!(summary.has_image());
        assert!(summary.dist.is_none());
    }

    #[test]
    fn test_operating_info_keeps_type_specific_fields() {
        let raw = serde_json::json!({
            "contentid": "126508",
            "contenttypeid": "12",
            "usetime": "09:00~18:00",
            "restdate": "매주 화요일",
            "expguide": "한복 체험"
        });

        let info: OperatingInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(info.use_time.as_deref(), Some("09:00~18:00"));
        assert_eq!(info.extra.get("expguide").unwrap(), "한복 체험");
    }

    #[test]
    fn test_list_query_ignores_blank_keyword() {
        let query = ListQuery {
            keyword: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.keyword(), None);
    }
}
