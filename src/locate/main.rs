//! One-shot location match.
//!
//! Loads boundary files (and optionally indoor details), matches a single
//! coordinate and prints the result as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use placematch::config::Config;
use placematch::indoor::{search_pois, IndoorFrameCache, StaticIndoorProvider};
use placematch::models::{MatchResult, PointOfInterest};
use placematch::store::{source_for_path, BoundarySource};
use placematch::{BoundaryStore, GeoPoint, LocationMatcher, MatchQuery};

#[derive(Parser, Debug)]
#[command(name = "locate")]
#[command(about = "Match a coordinate against known place boundaries")]
#[command(allow_negative_numbers = true)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Latitude in degrees
    #[arg(long)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long)]
    lon: f64,

    /// Reverse-geocoded place name for the name fallback
    #[arg(long)]
    place_name: Option<String>,

    /// Boundary files or directories (.kml, .json), loaded after config sources
    #[arg(short, long)]
    boundaries: Vec<PathBuf>,

    /// JSON file with indoor details for connected places
    #[arg(long)]
    indoor: Option<PathBuf>,

    /// Override the proximity margin in meters
    #[arg(long)]
    margin: Option<f64>,

    /// Filter listed points of interest by name
    #[arg(long)]
    search: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    result: &'a MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    place_name: Option<String>,
    connected: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    points_of_interest: Vec<&'a PointOfInterest>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the default level
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(margin) = args.margin {
        config.matching.proximity_margin_meters = margin;
        config.validate()?;
    }

    let paths: Vec<PathBuf> = config
        .sources
        .iter()
        .map(|s| s.path.clone())
        .chain(args.boundaries.iter().cloned())
        .collect();
    if paths.is_empty() {
        anyhow::bail!("No boundary sources given; use --boundaries or [[sources]] in the config");
    }
    let sources = paths
        .iter()
        .map(|p| source_for_path(p))
        .collect::<Result<Vec<Box<dyn BoundarySource>>, _>>()?;

    let store = Arc::new(BoundaryStore::new(config.connected_rules()));
    let report = store
        .load_all(&sources)
        .await
        .context("Failed to load boundaries")?;
    if report.accepted == 0 {
        warn!("No usable boundaries in {} sources", sources.len());
    }

    let provider = match &args.indoor {
        Some(path) => StaticIndoorProvider::load_from_file(path)?,
        None => StaticIndoorProvider::default(),
    };
    let cache = Arc::new(IndoorFrameCache::new(Arc::new(provider)));
    let cached = cache.prefetch_connected(store.snapshot().all()).await;
    if cached > 0 {
        info!("Indoor details ready for {} connected places", cached);
    }

    let matcher = LocationMatcher::new(store.clone(), cache, config.match_settings());
    let mut query = MatchQuery::new(GeoPoint::new(args.lat, args.lon));
    if let Some(name) = &args.place_name {
        query = query.with_place_name(name.clone());
    }

    let (result, details) = matcher.locate_with_details(&query).await;
    if !result.is_match() {
        warn!("No place matched ({}, {})", args.lat, args.lon);
    }

    let snapshot = store.snapshot();
    let boundary = result.boundary_id.as_deref().and_then(|id| snapshot.get(id));
    let output = Output {
        result: &result,
        place_name: boundary.map(|b| b.name.clone()),
        connected: boundary.is_some_and(|b| b.connected),
        points_of_interest: details
            .as_deref()
            .map(|d| search_pois(&d.points_of_interest, args.search.as_deref().unwrap_or("")))
            .unwrap_or_default(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
