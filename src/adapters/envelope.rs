//! TourAPI JSON 回應外層：`response.header` 放結果代碼，`response.body` 放資料。
//!
//! `items` 沒有資料時是空字串，只有一筆時 `item` 可能是物件而不是陣列。
//! 金鑰錯誤等閘道層錯誤則可能直接回傳 XML。

use crate::domain::model::{de, Page};
use crate::utils::error::{Result, TourError};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::LazyLock;

pub const SUCCESS_CODE: &str = "0000";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<ResponseBlock<T>>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock<T> {
    header: Option<Header>,
    body: Option<Body<T>>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body<T> {
    #[serde(default = "Items::empty")]
    items: Items<T>,
    #[serde(rename = "numOfRows", default, deserialize_with = "lenient_opt")]
    num_of_rows: Option<u32>,
    #[serde(rename = "pageNo", default, deserialize_with = "lenient_opt")]
    page_no: Option<u32>,
    #[serde(rename = "totalCount", default, deserialize_with = "lenient_opt")]
    total_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Items<T> {
    Wrapped { item: OneOrMany<T> },
    #[allow(dead_code)]
    Blank(String),
}

impl<T> Items<T> {
    fn empty() -> Self {
        Items::Blank(String::new())
    }

    fn into_vec(self) -> Vec<T> {
        match self {
            Items::Wrapped {
                item: OneOrMany::Many(items),
            } => items,
            Items::Wrapped {
                item: OneOrMany::One(item),
            } => vec![item],
            Items::Blank(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// 沒有 `response` 外層、直接在最上層回報錯誤的格式
#[derive(Debug, Deserialize)]
struct FlatError {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

fn lenient_opt<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    de::lenient_u32(deserializer).map(Some)
}

static XML_REASON_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<returnReasonCode>\s*([^<]+?)\s*</returnReasonCode>").unwrap());
static XML_AUTH_MSG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<returnAuthMsg>\s*([^<]+?)\s*</returnAuthMsg>").unwrap());

fn xml_gateway_error(body: &str) -> Option<TourError> {
    let code = XML_REASON_CODE.captures(body)?.get(1)?.as_str().to_string();
    let message = XML_AUTH_MSG
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "gateway error".to_string());
    Some(TourError::ApiError { code, message })
}

fn snippet(body: &str) -> String {
    body.chars().take(120).collect()
}

/// 解析一頁資料；結果代碼不是 0000 時回傳 `ApiError`
pub fn parse_page<T: DeserializeOwned>(operation: &str, body: &str) -> Result<Page<T>> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            return Err(xml_gateway_error(body).unwrap_or_else(|| {
                TourError::parse(operation, format!("body is not JSON ({}): {}", e, snippet(body)))
            }))
        }
    };

    if value.get("response").is_none() {
        return match serde_json::from_value::<FlatError>(value) {
            Ok(flat) if flat.result_code != SUCCESS_CODE => Err(TourError::ApiError {
                code: flat.result_code,
                message: flat.result_msg,
            }),
            _ => Err(TourError::parse(operation, "missing `response` envelope")),
        };
    }

    let envelope: Envelope<T> = serde_json::from_value(value)
        .map_err(|e| TourError::parse(operation, format!("unexpected envelope shape: {}", e)))?;

    let response = envelope
        .response
        .ok_or_else(|| TourError::parse(operation, "missing `response` envelope"))?;
    let header = response
        .header
        .ok_or_else(|| TourError::parse(operation, "missing `response.header`"))?;

    if header.result_code != SUCCESS_CODE {
        return Err(TourError::ApiError {
            code: header.result_code,
            message: header.result_msg,
        });
    }

    let body = response
        .body
        .ok_or_else(|| TourError::parse(operation, "missing `response.body`"))?;
    let total_count = body
        .total_count
        .ok_or_else(|| TourError::parse(operation, "missing `response.body.totalCount`"))?;
    let items = body.items.into_vec();

    Ok(Page {
        page_no: body.page_no.unwrap_or(1),
        num_of_rows: body.num_of_rows.unwrap_or(items.len() as u32),
        total_count,
        items,
    })
}
