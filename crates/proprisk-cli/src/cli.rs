use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use proprisk_core::config::parse_crs_code;
use proprisk_core::fields::FieldPath;
use proprisk_core::models::{Crs, Distance};
use std::path::PathBuf;

/// proprisk - GIS and market indexation toolkit for property risk analysis
#[derive(Parser, Debug)]
#[command(name = "proprisk")]
#[command(
    about = "GIS and market indexation toolkit for property risk analysis",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./proprisk.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Metric CRS used for buffering and bounds (e.g. EPSG:3577)
    #[arg(long, global = true, value_parser = parse_metric_crs)]
    pub metric_crs: Option<u32>,

    /// CRS of the display basemap (e.g. EPSG:3857)
    #[arg(long, global = true, value_parser = parse_display_crs)]
    pub display_crs: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Distance between two points
    Distance(DistanceArgs),

    /// Create a point and print it as GeoJSON
    Point(PointArgs),

    /// Padded bounding box around a set of points
    Bounds(BoundsArgs),

    /// Index a transaction value to another date
    Index(IndexArgs),

    /// Buffer the features of a GeoJSON file by a distance
    Buffer(BufferArgs),

    /// Centroid of all features in a GeoJSON file
    Centroid(CentroidArgs),

    /// Features of one GeoJSON file lying within a distance of another's
    Join(JoinArgs),

    /// Clip the features of a GeoJSON file to a bounding box
    Clip(ClipArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct DistanceArgs {
    /// Latitude of the first point (or x with --euclidean)
    pub lat1: f64,
    /// Longitude of the first point (or y with --euclidean)
    pub lon1: f64,
    /// Latitude of the second point (or x with --euclidean)
    pub lat2: f64,
    /// Longitude of the second point (or y with --euclidean)
    pub lon2: f64,

    /// Treat inputs as projected x/y and measure a straight line
    #[arg(long)]
    pub euclidean: bool,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct PointArgs {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,

    /// Reproject the point to this CRS
    #[arg(long, conflicts_with = "display")]
    pub to: Option<Crs>,

    /// Clamp the latitude and reproject to the display CRS
    #[arg(long)]
    pub display: bool,
}

#[derive(Parser, Debug)]
pub struct BoundsArgs {
    /// Points as `lon,lat`
    #[arg(required = true, allow_hyphen_values = true, value_parser = parse_lon_lat)]
    pub points: Vec<(f64, f64)>,

    /// Margin added to each axis, as a percentage of its extent
    #[arg(long)]
    pub margin: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Transaction value to index
    #[arg(long)]
    pub value: f64,

    /// Transaction date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,

    /// JSON file holding the index series
    #[arg(long)]
    pub series: PathBuf,

    /// Dotted path to the series inside the file (e.g. `data.index`)
    #[arg(long)]
    pub path: Option<FieldPath>,

    /// Largest accepted gap between a date and its index entry; 0 disables the limit
    #[arg(long)]
    pub max_gap_days: Option<i64>,
}

#[derive(Parser, Debug)]
pub struct BufferArgs {
    /// GeoJSON input file
    pub input: PathBuf,

    /// Buffer distance with a unit (e.g. `500m`, `2km`, `1mi`)
    #[arg(long)]
    pub radius: Distance,
}

#[derive(Parser, Debug)]
pub struct CentroidArgs {
    /// GeoJSON input file
    pub input: PathBuf,
}

#[derive(Parser, Debug)]
pub struct JoinArgs {
    /// GeoJSON file whose features are kept
    pub left: PathBuf,
    /// GeoJSON file the left features are matched against
    pub right: PathBuf,

    /// Largest distance between matched features (e.g. `250m`, `2km`)
    #[arg(long)]
    pub within: Distance,
}

#[derive(Parser, Debug)]
pub struct ClipArgs {
    /// GeoJSON input file
    pub input: PathBuf,

    /// Box as `min_x,min_y,max_x,max_y`
    #[arg(long, allow_hyphen_values = true, value_parser = parse_bbox)]
    pub bbox: (f64, f64, f64, f64),

    /// CRS of the box coordinates; defaults to the geographic CRS
    #[arg(long)]
    pub bbox_crs: Option<Crs>,
}

fn parse_metric_crs(s: &str) -> Result<u32, String> {
    parse_crs_code("metric_crs", s).map_err(|e| e.to_string())
}

fn parse_display_crs(s: &str) -> Result<u32, String> {
    parse_crs_code("display_crs", s).map_err(|e| e.to_string())
}

fn parse_lon_lat(s: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `lon,lat`, got '{}'", s))?;
    let lon = lon.trim().parse::<f64>().map_err(|e| format!("invalid longitude '{}': {}", lon, e))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("invalid latitude '{}': {}", lat, e))?;
    Ok((lon, lat))
}

fn parse_bbox(s: &str) -> Result<(f64, f64, f64, f64), String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("invalid number '{}': {}", v, e)))
        .collect::<Result<Vec<_>, _>>()?;
    let [min_x, min_y, max_x, max_y] = values[..] else {
        return Err(format!("expected `min_x,min_y,max_x,max_y`, got '{}'", s));
    };
    if !(min_x < max_x && min_y < max_y) {
        return Err(format!("box '{}' has min >= max on an axis", s));
    }
    Ok((min_x, min_y, max_x, max_y))
}
