use crate::domain::model::{Arrange, ContentType, ListQuery};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tour-info")]
#[command(about = "Browse, search and bookmark Korean tourist attractions")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List province codes, or district codes inside a province
    Areas {
        #[arg(long)]
        parent: Option<String>,
    },
    /// Browse or search attractions
    List(ListArgs),
    /// Attractions around a point
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, default_value = "2000")]
        radius: u32,
        #[arg(long = "type")]
        content_type: Option<u16>,
        #[arg(long, default_value = "20")]
        rows: u32,
    },
    /// Full detail view of one attraction
    Detail { content_id: String },
    /// Map markers for a listing; unconvertible coordinates are skipped
    Markers(ListArgs),
    /// Convert a raw mapx/mapy pair into longitude/latitude
    Convert {
        #[arg(allow_negative_numbers = true)]
        x: String,
        #[arg(allow_negative_numbers = true)]
        y: String,
    },
    /// Manage bookmarks
    Bookmark {
        #[arg(long, env = "TOUR_USER")]
        user: String,
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Attraction counts per province or per content type
    Stats {
        #[arg(long = "type")]
        content_type: Option<u16>,
        /// Count per content type inside this area instead of per area
        #[arg(long)]
        by_type: bool,
        #[arg(long)]
        area: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BookmarkAction {
    Add { content_id: String },
    Remove { content_id: String },
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArrangeArg {
    Title,
    Modified,
    Created,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub sigungu: Option<String>,
    #[arg(long = "type")]
    pub content_type: Option<u16>,
    #[arg(long)]
    pub cat1: Option<String>,
    #[arg(long)]
    pub cat2: Option<String>,
    #[arg(long)]
    pub cat3: Option<String>,
    #[arg(short, long)]
    pub keyword: Option<String>,
    #[arg(long, value_enum, default_value_t = ArrangeArg::Title)]
    pub arrange: ArrangeArg,
    /// Only attractions with a representative image
    #[arg(long)]
    pub with_image: bool,
    #[arg(long, default_value = "1")]
    pub page: u32,
    #[arg(long, default_value = "20")]
    pub rows: u32,
    /// Keep loading pages until exhausted or --max-items is reached
    #[arg(long)]
    pub all: bool,
    #[arg(long, default_value = "200")]
    pub max_items: usize,
}

impl ListArgs {
    pub fn to_query(&self) -> ListQuery {
        let arrange = match (self.arrange, self.with_image) {
            (ArrangeArg::Title, false) => Arrange::Title,
            (ArrangeArg::Modified, false) => Arrange::Modified,
            (ArrangeArg::Created, false) => Arrange::Created,
            (ArrangeArg::Title, true) => Arrange::TitleWithImage,
            (ArrangeArg::Modified, true) => Arrange::ModifiedWithImage,
            (ArrangeArg::Created, true) => Arrange::CreatedWithImage,
        };

        ListQuery {
            area_code: self.area.clone(),
            sigungu_code: self.sigungu.clone(),
            content_type: self.content_type.map(ContentType::from_id),
            cat1: self.cat1.clone(),
            cat2: self.cat2.clone(),
            cat3: self.cat3.clone(),
            keyword: self.keyword.clone(),
            arrange,
        }
    }
}
