use crate::core::geo;
use crate::domain::model::{AttractionSummary, Bookmark};
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct AttractionRow<'a> {
    content_id: &'a str,
    content_type_id: &'a str,
    title: &'a str,
    address: String,
    area_code: &'a str,
    tel: &'a str,
    lon: Option<f64>,
    lat: Option<f64>,
    image: &'a str,
}

/// 景點列表輸出成 CSV；座標無法轉換時 lon/lat 欄位留空
pub fn write_attractions_csv<W: Write>(writer: W, items: &[AttractionSummary]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for item in items {
        let point = geo::convert(&item.mapx, &item.mapy).ok();
        csv_writer.serialize(AttractionRow {
            content_id: &item.content_id,
            content_type_id: &item.content_type_id,
            title: &item.title,
            address: item.address(),
            area_code: &item.area_code,
            tel: &item.tel,
            lon: point.map(|p| p.lon),
            lat: point.map(|p| p.lat),
            image: &item.first_image,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_bookmarks_csv<W: Write>(writer: W, bookmarks: &[Bookmark]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["user_id", "content_id", "title", "created_at"])?;

    for bookmark in bookmarks {
        csv_writer.write_record([
            bookmark.user_id.as_str(),
            bookmark.content_id.as_str(),
            bookmark.title.as_deref().unwrap_or(""),
            bookmark.created_at.to_rfc3339().as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_attractions_csv_leaves_unconvertible_coordinates_blank() {
        let items = vec![
            AttractionSummary {
                content_id: "126508".to_string(),
                content_type_id: "12".to_string(),
                title: "경복궁".to_string(),
                addr1: "서울특별시 종로구 사직로 161".to_string(),
                mapx: "126.9769930325".to_string(),
                mapy: "37.5788222356".to_string(),
                ..Default::default()
            },
            AttractionSummary {
                content_id: "9".to_string(),
                title: "Somewhere, else".to_string(),
                mapx: "0".to_string(),
                mapy: "0".to_string(),
                ..Default::default()
            },
        ];

        let mut buffer = Vec::new();
        write_attractions_csv(&mut buffer, &items).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "content_id,content_type_id,title,address,area_code,tel,lon,lat,image"
        );
        assert!(lines[1].starts_with("126508,12,경복궁,서울특별시 종로구 사직로 161,,,126.9769930325,37.5788222356,"));
        assert_eq!(lines[2], "9,,\"Somewhere, else\",,,,,,");
    }

    #[test]
    fn test_bookmarks_csv() {
        let bookmarks = vec![Bookmark {
            user_id: "alice".to_string(),
            content_id: "126508".to_string(),
            title: None,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap(),
        }];

        let mut buffer = Vec::new();
        write_bookmarks_csv(&mut buffer, &bookmarks).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(
            output,
            "user_id,content_id,title,created_at\nalice,126508,,2026-10-01T09:30:00+00:00\n"
        );
    }
}
