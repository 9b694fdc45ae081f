//! TourAPI 座標格式偵測與轉換。
//!
//! `mapx` / `mapy` 以字串回傳，可能是十進位經緯度，也可能是省略小數點的
//! 定點數。轉換失敗時回傳錯誤，呼叫端應略過該點（例如不畫地圖標記）。

use crate::domain::model::AttractionSummary;
use serde::Serialize;
use thiserror::Error;

pub const MIN_LON: f64 = 124.0;
pub const MAX_LON: f64 = 132.0;
pub const MIN_LAT: f64 = 33.0;
pub const MAX_LAT: f64 = 43.0;

const FIXED7_THRESHOLD: f64 = 1_000_000.0;
const FIXED7_DIVISOR: f64 = 10_000_000.0;
const FIXED5_THRESHOLD: f64 = 10_000.0;
const FIXED5_DIVISOR: f64 = 100_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("{axis} value {value:?} is not a finite number")]
    NotNumeric { axis: &'static str, value: String },

    #[error("({x}, {y}) does not map into the service area in any known format")]
    OutOfBounds { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinateFormat {
    /// 已經是經緯度
    Degrees,
    /// 隱含 7 位小數
    FixedPoint7,
    /// 隱含 5 位小數
    FixedPoint5,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub format: CoordinateFormat,
}

impl GeoPoint {
    pub fn degrees(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            format: CoordinateFormat::Degrees,
        }
    }
}

pub fn in_bounds(lon: f64, lat: f64) -> bool {
    (MIN_LON..=MAX_LON).contains(&lon) && (MIN_LAT..=MAX_LAT).contains(&lat)
}

fn parse_axis(axis: &'static str, raw: &str) -> Result<f64, CoordinateError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError::NotNumeric {
            axis,
            value: raw.to_string(),
        })
}

/// 依序嘗試：原值 → ÷10^7 → ÷10^5。x 超過 1,000,000 時只嘗試 ÷10^7。
pub fn convert(x: &str, y: &str) -> Result<GeoPoint, CoordinateError> {
    let raw_x = parse_axis("x", x)?;
    let raw_y = parse_axis("y", y)?;

    let candidate = if in_bounds(raw_x, raw_y) {
        Some((raw_x, raw_y, CoordinateFormat::Degrees))
    } else if raw_x > FIXED7_THRESHOLD {
        Some((
            raw_x / FIXED7_DIVISOR,
            raw_y / FIXED7_DIVISOR,
            CoordinateFormat::FixedPoint7,
        ))
    } else if raw_x > FIXED5_THRESHOLD {
        Some((
            raw_x / FIXED5_DIVISOR,
            raw_y / FIXED5_DIVISOR,
            CoordinateFormat::FixedPoint5,
        ))
    } else {
        None
    };

    match candidate {
        Some((lon, lat, format)) if in_bounds(lon, lat) => Ok(GeoPoint { lon, lat, format }),
        _ => {
            tracing::warn!(
                "⚠️ Coordinate ({}, {}) could not be converted into the service area",
                x,
                y
            );
            Err(CoordinateError::OutOfBounds { x: raw_x, y: raw_y })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub content_id: String,
    pub title: String,
    pub position: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerSet {
    pub markers: Vec<MapMarker>,
    /// 沒有座標或轉換失敗而略過的 contentId
    pub skipped: Vec<String>,
}

pub fn map_markers<'a, I>(items: I) -> MarkerSet
where
    I: IntoIterator<Item = &'a AttractionSummary>,
{
    let mut set = MarkerSet::default();

    for item in items {
        if item.mapx.trim().is_empty() || item.mapy.trim().is_empty() {
            set.skipped.push(item.content_id.clone());
            continue;
        }

        match convert(&item.mapx, &item.mapy) {
            Ok(position) => set.markers.push(MapMarker {
                content_id: item.content_id.clone(),
                title: item.title.clone(),
                position,
                thumbnail: Some(item.first_image_thumb.clone()).filter(|t| !t.is_empty()),
            }),
            Err(e) => {
                tracing::debug!("Skipping marker for {}: {}", item.content_id, e);
                set.skipped.push(item.content_id.clone());
            }
        }
    }

    set
}
