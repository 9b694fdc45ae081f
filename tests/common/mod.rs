#![allow(dead_code)]

use serde_json::{json, Value};
use tour_info::{AppConfig, TourApiClient};

pub const TEST_KEY: &str = "test-service-key";

/// 指向 mock server 的設定，重試等待縮短到毫秒等級
pub fn config_for(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.service_key = Some(TEST_KEY.to_string());
    config.api.timeout_seconds = 5;
    config.retry.attempts = 3;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}

pub fn client_for(base_url: &str) -> TourApiClient {
    TourApiClient::new(&config_for(base_url)).unwrap()
}

pub fn envelope(items: Value, total: u32) -> Value {
    json!({
        "response": {
            "header": {"resultCode": "0000", "resultMsg": "OK"},
            "body": {
                "items": items,
                "numOfRows": 20,
                "pageNo": 1,
                "totalCount": total
            }
        }
    })
}

pub fn api_error(code: &str, message: &str) -> Value {
    json!({
        "response": {
            "header": {"resultCode": code, "resultMsg": message}
        }
    })
}

pub fn attraction(id: u32) -> Value {
    json!({
        "contentid": id.to_string(),
        "contenttypeid": "12",
        "title": format!("관광지 {}", id),
        "addr1": "서울특별시 종로구",
        "areacode": "1",
        "mapx": "126.9769930325",
        "mapy": "37.5788222356"
    })
}
