use clap::Parser;
use serde::Serialize;
use std::io::Write;
use tour_info::config::cli::{BookmarkAction, Command, ListArgs, OutputFormat};
use tour_info::core::detail::AttractionDetailView;
use tour_info::core::geo::{self, GeoPoint, MarkerSet};
use tour_info::core::{export, stats, BookmarkStore, ConfigProvider, TourApi};
use tour_info::domain::model::{AttractionSummary, ContentType, PageRequest};
use tour_info::utils::error::ErrorSeverity;
use tour_info::utils::{logger, validation::Validate};
use tour_info::{
    fetch_detail_view, AppConfig, CliConfig, InfiniteScroll, JsonBookmarkStore, LocalStorage,
    Result, TourApiClient, TourError,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(e);
    }

    if let Err(e) = run(&cli, &config).await {
        exit_with(e);
    }
}

fn exit_with(e: TourError) -> ! {
    // 低嚴重度（例如重複收藏）只是提示，不算失敗
    if e.severity() == ErrorSeverity::Low {
        tracing::info!("ℹ️ Nothing changed: {}", e);
        eprintln!("ℹ️ {}", e.user_friendly_message());
    } else {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
    }
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

async fn run(cli: &CliConfig, config: &AppConfig) -> Result<()> {
    let format = cli.format;

    match &cli.command {
        Command::Areas { parent } => {
            let client = TourApiClient::new(config)?;
            let areas = client.area_codes(parent.as_deref()).await?;
            emit(format, &areas, |out| {
                for area in &areas {
                    writeln!(out, "{:>4}  {}", area.code, area.name)?;
                }
                Ok(())
            })
        }
        Command::List(args) => {
            let client = TourApiClient::new(config)?;
            let (items, total) = load_listing(&client, args).await?;
            tracing::info!("📋 {} of {} attractions", items.len(), total);
            print_attractions(format, &items)
        }
        Command::Nearby {
            lon,
            lat,
            radius,
            content_type,
            rows,
        } => {
            if !geo::in_bounds(*lon, *lat) {
                return Err(TourError::validation(format!(
                    "({}, {}) is outside the supported area",
                    lon, lat
                )));
            }
            let client = TourApiClient::new(config)?;
            let page = client
                .nearby(
                    GeoPoint::degrees(*lon, *lat),
                    *radius,
                    content_type.map(ContentType::from_id),
                    PageRequest::new(1, *rows),
                )
                .await?;
            print_attractions(format, &page.items)
        }
        Command::Detail { content_id } => {
            let client = TourApiClient::new(config)?;
            let view = fetch_detail_view(&client, content_id).await?;
            match format {
                OutputFormat::Table => print_detail(&view),
                OutputFormat::Json => print_json(&view),
                OutputFormat::Csv => print_attractions(format, &[view.detail.summary.clone()]),
            }
        }
        Command::Markers(args) => {
            let client = TourApiClient::new(config)?;
            let (items, _) = load_listing(&client, args).await?;
            let set = geo::map_markers(&items);
            if !set.skipped.is_empty() {
                tracing::warn!("⚠️ {} attractions have no usable location", set.skipped.len());
            }
            print_markers(format, &set)
        }
        Command::Convert { x, y } => {
            let point = geo::convert(x, y)?;
            match format {
                OutputFormat::Json => print_json(&point),
                _ => {
                    println!("{:.7},{:.7} ({:?})", point.lon, point.lat, point.format);
                    Ok(())
                }
            }
        }
        Command::Bookmark { user, action } => {
            let store = JsonBookmarkStore::new(LocalStorage::new(config.data_dir()));
            run_bookmark(config, &store, user, action, format).await
        }
        Command::Stats {
            content_type,
            by_type,
            area,
        } => {
            let client = TourApiClient::new(config)?;
            if *by_type {
                let report = stats::content_type_distribution(&client, area.as_deref()).await?;
                if format == OutputFormat::Json {
                    return print_json(&report);
                }
                emit(format, &report.types, |out| {
                    for row in &report.types {
                        writeln!(
                            out,
                            "{:>3}  {:<8} {:>7}",
                            row.content_type_id, row.label, row.total
                        )?;
                    }
                    writeln!(out, "total {}", report.total())?;
                    if !report.failed_types.is_empty() {
                        let failed: Vec<String> =
                            report.failed_types.iter().map(u16::to_string).collect();
                        writeln!(out, "unavailable: {}", failed.join(", "))?;
                    }
                    Ok(())
                })
            } else {
                let report = stats::area_distribution(
                    &client,
                    content_type.map(ContentType::from_id),
                    config.concurrent_requests(),
                )
                .await?;
                if format == OutputFormat::Json {
                    return print_json(&report);
                }
                emit(format, &report.areas, |out| {
                    for row in &report.areas {
                        let share = report.share(&row.code).unwrap_or(0.0);
                        writeln!(
                            out,
                            "{:>4}  {:<10} {:>7}  {:>5.1}%",
                            row.code, row.name, row.total, share
                        )?;
                    }
                    writeln!(out, "total {}", report.total())?;
                    if !report.failed_areas.is_empty() {
                        writeln!(out, "unavailable: {}", report.failed_areas.join(", "))?;
                    }
                    Ok(())
                })
            }
        }
    }
}

async fn run_bookmark<S: BookmarkStore>(
    config: &AppConfig,
    store: &S,
    user: &str,
    action: &BookmarkAction,
    format: OutputFormat,
) -> Result<()> {
    match action {
        BookmarkAction::Add { content_id } => {
            // 標題只是附加資訊，查不到也照樣收藏
            let title = match TourApiClient::new(config) {
                Ok(client) => match client.detail(content_id).await {
                    Ok(detail) => Some(detail.summary.title),
                    Err(e) => {
                        tracing::warn!("⚠️ Could not fetch title for {}: {}", content_id, e);
                        None
                    }
                },
                Err(_) => None,
            };
            let bookmark = store.add(user, content_id, title).await?;
            println!("🔖 Bookmarked {}", bookmark.title.as_deref().unwrap_or(content_id));
            Ok(())
        }
        BookmarkAction::Remove { content_id } => {
            store.remove(user, content_id).await?;
            println!("🗑️ Removed bookmark {}", content_id);
            Ok(())
        }
        BookmarkAction::List => {
            let bookmarks = store.list(user).await?;
            match format {
                OutputFormat::Json => print_json(&bookmarks),
                OutputFormat::Csv => {
                    export::write_bookmarks_csv(std::io::stdout().lock(), &bookmarks)
                }
                OutputFormat::Table => {
                    for b in &bookmarks {
                        println!(
                            "{:>8}  {}  {}",
                            b.content_id,
                            b.created_at.format("%Y-%m-%d %H:%M"),
                            b.title.as_deref().unwrap_or("-")
                        );
                    }
                    Ok(())
                }
            }
        }
    }
}

/// 單頁查詢，或 `--all` 時以無限捲動方式一路載到底
async fn load_listing(
    client: &TourApiClient,
    args: &ListArgs,
) -> Result<(Vec<AttractionSummary>, u32)> {
    let query = args.to_query();

    if !args.all {
        let page = client
            .list_attractions(&query, PageRequest::new(args.page, args.rows))
            .await?;
        return Ok((page.items, page.total_count));
    }

    let mut scroll = InfiniteScroll::new(args.rows);
    while scroll.should_load(scroll.items().len() < args.max_items) {
        scroll
            .load_next(|page| client.list_attractions(&query, page))
            .await?;
    }

    let total = scroll.total_count().unwrap_or(0);
    let mut items = scroll.into_items();
    items.truncate(args.max_items);
    Ok((items, total))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// table 由呼叫端格式化；json / csv 直接序列化每一列
fn emit<T, F>(format: OutputFormat, rows: &[T], table: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    match format {
        OutputFormat::Json => print_json(rows),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Table => {
            let mut out = std::io::stdout().lock();
            table(&mut out)?;
            Ok(())
        }
    }
}

fn print_attractions(format: OutputFormat, items: &[AttractionSummary]) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Csv => export::write_attractions_csv(std::io::stdout().lock(), items),
        OutputFormat::Table => {
            for item in items {
                let kind = item.content_type().map(|t| t.label()).unwrap_or("-");
                let dist = item
                    .dist
                    .as_deref()
                    .map(|d| format!(" ({}m)", d.split('.').next().unwrap_or(d)))
                    .unwrap_or_default();
                println!(
                    "{:>8}  {:<6} {}{}  {}",
                    item.content_id,
                    kind,
                    item.title,
                    dist,
                    item.address()
                );
            }
            Ok(())
        }
    }
}

fn print_markers(format: OutputFormat, set: &MarkerSet) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(set),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
            writer.write_record(["content_id", "title", "lon", "lat"])?;
            for marker in &set.markers {
                writer.write_record([
                    marker.content_id.clone(),
                    marker.title.clone(),
                    marker.position.lon.to_string(),
                    marker.position.lat.to_string(),
                ])?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Table => {
            for marker in &set.markers {
                println!(
                    "{:>8}  {:.6},{:.6}  {}",
                    marker.content_id, marker.position.lon, marker.position.lat, marker.title
                );
            }
            println!("{} markers, {} skipped", set.markers.len(), set.skipped.len());
            Ok(())
        }
    }
}

fn print_detail(view: &AttractionDetailView) -> Result<()> {
    let summary = &view.detail.summary;
    println!("{} [{}]", summary.title, summary.content_id);
    println!("  {}", summary.address());
    if let Some(point) = view.location {
        println!("  📍 {:.6}, {:.6}", point.lat, point.lon);
    }
    if !summary.tel.is_empty() {
        println!("  ☎ {}", summary.tel);
    }
    if let Some(info) = &view.operating_info {
        if let Some(use_time) = &info.use_time {
            println!("  🕘 {}", use_time);
        }
        if let Some(rest_date) = &info.rest_date {
            println!("  휴무 {}", rest_date);
        }
    }
    if let Some(pet) = &view.pet_info {
        println!("  🐾 {}", pet.allowed_pets);
    }
    println!("  🖼  {} images", view.images.len());
    if !view.detail.overview.is_empty() {
        println!();
        println!("{}", view.detail.overview);
    }
    if !view.nearby.is_empty() {
        println!();
        println!("Nearby:");
        for item in &view.nearby {
            println!("  {:>8}  {}", item.content_id, item.title);
        }
    }
    Ok(())
}
