mod common;

use common::{api_error, attraction, client_for, envelope};
use httpmock::prelude::*;
use serde_json::json;
use tour_info::geo::CoordinateFormat;
use tour_info::{fetch_detail_view, TourError};

fn detail_body() -> serde_json::Value {
    envelope(
        json!({"item": {
            "contentid": "126508",
            "contenttypeid": "12",
            "title": "경복궁",
            "addr1": "서울특별시 종로구 사직로 161",
            "homepage": "<a href=\"http://www.royalpalace.go.kr\">royalpalace.go.kr</a>",
            "overview": "경복궁은 1395년 태조 이성계에 의해서 새로운 조선왕조의 법궁으로 지어졌다.",
            "mapx": "1269769930",
            "mapy": "375788222"
        }}),
        1,
    )
}

#[tokio::test]
async fn test_detail_view_survives_auxiliary_failures() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailCommon1").query_param("contentId", "126508");
            then.status(200).json_body(detail_body());
        })
        .await;
    let images = server
        .mock_async(|when, then| {
            when.method(GET).path("/detailImage1");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailPetTour1");
            then.status(200)
                .json_body(api_error("03", "NODATA_ERROR"));
        })
        .await;
    let intro = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/detailIntro1")
                .query_param("contentTypeId", "12");
            then.status(200).json_body(envelope(
                json!({"item": {
                    "contentid": "126508",
                    "contenttypeid": "12",
                    "usetime": "09:00~18:00",
                    "restdate": "매주 화요일"
                }}),
                1,
            ));
        })
        .await;
    let nearby = server
        .mock_async(|when, then| {
            when.method(GET).path("/locationBasedList1");
            then.status(200).json_body(envelope(
                json!({"item": [attraction(126508), attraction(2), attraction(3)]}),
                3,
            ));
        })
        .await;

    let client = client_for(&server.base_url());
    let view = fetch_detail_view(&client, "126508").await.unwrap();

    // 圖片端點 5xx 會先重試再放棄
    images.assert_hits_async(3).await;
    intro.assert_async().await;
    nearby.assert_async().await;

    assert_eq!(view.detail.summary.title, "경복궁");
    assert!(view.images.is_empty());
    assert!(view.pet_info.is_none());
    assert_eq!(
        view.operating_info.and_then(|i| i.rest_date).as_deref(),
        Some("매주 화요일")
    );

    let location = view.location.expect("fixed-point coordinates should convert");
    assert_eq!(location.format, CoordinateFormat::FixedPoint7);
    assert!((location.lon - 126.976993).abs() < 1e-6);

    let nearby_ids: Vec<&str> = view.nearby.iter().map(|a| a.content_id.as_str()).collect();
    assert_eq!(nearby_ids, vec!["2", "3"]);
}

#[tokio::test]
async fn test_detail_view_fails_when_primary_record_fails() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailCommon1");
            then.status(200)
                .json_body(api_error("30", "SERVICE_KEY_IS_NOT_REGISTERED_ERROR"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailImage1");
            then.status(200).json_body(envelope(json!(""), 0));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailPetTour1");
            then.status(200).json_body(envelope(json!(""), 0));
        })
        .await;
    let nearby = server
        .mock_async(|when, then| {
            when.method(GET).path("/locationBasedList1");
            then.status(200).json_body(envelope(json!(""), 0));
        })
        .await;

    let client = client_for(&server.base_url());
    let err = fetch_detail_view(&client, "126508").await.unwrap_err();

    assert!(matches!(err, TourError::ApiError { .. }));
    nearby.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_unconvertible_location_skips_nearby_lookup() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailCommon1");
            then.status(200).json_body(envelope(
                json!({"item": {"contentid": "7", "contenttypeid": "39", "title": "좌표 없음", "mapx": "0", "mapy": "0"}}),
                1,
            ));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailImage1");
            then.status(200).json_body(envelope(
                json!({"item": [{"originimgurl": "http://example.com/1.jpg", "serialnum": "1"}]}),
                1,
            ));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailPetTour1");
            then.status(200).json_body(envelope(json!(""), 0));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/detailIntro1");
            then.status(200).json_body(envelope(json!(""), 0));
        })
        .await;
    let nearby = server
        .mock_async(|when, then| {
            when.method(GET).path("/locationBasedList1");
            then.status(200).json_body(envelope(json!(""), 0));
        })
        .await;

    let client = client_for(&server.base_url());
    let view = fetch_detail_view(&client, "7").await.unwrap();

    assert!(view.location.is_none());
    assert_eq!(view.images.len(), 1);
    assert!(view.operating_info.is_none());
    nearby.assert_hits_async(0).await;
}
