//! Boundary-data sources and coordinate string parsing.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::kml::parse_kml;
use crate::error::{LoadError, ParseError};
use crate::models::GeoPoint;

/// One named-polygon record as supplied by a boundary source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    /// Explicit identifier; the name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Whitespace-separated "longitude,latitude[,altitude]" tokens
    pub coordinates: String,
}

impl BoundaryRecord {
    pub fn new(name: impl Into<String>, coordinates: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: None,
            coordinates: coordinates.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parse a single "longitude,latitude" token. Extra components (KML
/// altitude) are ignored.
pub fn parse_coordinate(token: &str) -> Result<GeoPoint, ParseError> {
    let mut parts = token.split(',');
    let (lon, lat) = match (parts.next(), parts.next()) {
        (Some(lon), Some(lat)) => (lon.trim(), lat.trim()),
        _ => {
            return Err(ParseError::MissingComponent {
                token: token.to_string(),
            })
        }
    };

    let parse = |s: &str| {
        s.parse::<f64>().map_err(|source| ParseError::InvalidNumber {
            token: token.to_string(),
            source,
        })
    };
    let lon = parse(lon)?;
    let lat = parse(lat)?;

    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(ParseError::OutOfRange {
            token: token.to_string(),
        });
    }

    Ok(GeoPoint::new(lat, lon))
}

/// Parse a flattened coordinate string, keeping every valid vertex.
///
/// Malformed tokens are returned alongside the vertices instead of failing
/// the whole string.
pub fn parse_coordinates(coordinates: &str) -> (Vec<GeoPoint>, Vec<ParseError>) {
    let mut vertices = Vec::new();
    let mut errors = Vec::new();

    for token in coordinates.split_whitespace() {
        match parse_coordinate(token) {
            Ok(point) => vertices.push(point),
            Err(e) => errors.push(e),
        }
    }

    (vertices, errors)
}

/// Anything that can hand the store a batch of boundary records
#[async_trait]
pub trait BoundarySource: Send + Sync {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    async fn fetch_records(&self) -> Result<Vec<BoundaryRecord>, LoadError>;
}

/// Records already in memory (bundled data, tests)
#[derive(Debug, Clone, Default)]
pub struct RecordSource {
    records: Vec<BoundaryRecord>,
}

impl RecordSource {
    pub fn new(records: Vec<BoundaryRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl BoundarySource for RecordSource {
    fn describe(&self) -> String {
        format!("{} in-memory records", self.records.len())
    }

    async fn fetch_records(&self) -> Result<Vec<BoundaryRecord>, LoadError> {
        Ok(self.records.clone())
    }
}

async fn read_source_file(path: &Path) -> Result<String, LoadError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// JSON array of [`BoundaryRecord`]s on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BoundarySource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_records(&self) -> Result<Vec<BoundaryRecord>, LoadError> {
        let content = read_source_file(&self.path).await?;
        serde_json::from_str(&content).map_err(|source| LoadError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

/// KML document; one record per Placemark
#[derive(Debug, Clone)]
pub struct KmlFileSource {
    path: PathBuf,
}

impl KmlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BoundarySource for KmlFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_records(&self) -> Result<Vec<BoundaryRecord>, LoadError> {
        let content = read_source_file(&self.path).await?;
        Ok(parse_kml(&content))
    }
}

/// Every `.kml` and `.json` file below a directory, in file-name order
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn boundary_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && BoundaryFormat::from_path(path).is_some() {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl BoundarySource for DirectorySource {
    fn describe(&self) -> String {
        format!("{}/", self.dir.display())
    }

    async fn fetch_records(&self) -> Result<Vec<BoundaryRecord>, LoadError> {
        let files = self.boundary_files()?;
        info!(
            "Found {} boundary files in {}",
            files.len(),
            self.dir.display()
        );

        let mut records = Vec::new();
        for path in files {
            let source = source_for_path(&path)?;
            let batch = source.fetch_records().await?;
            debug!("{}: {} records", path.display(), batch.len());
            records.extend(batch);
        }
        Ok(records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryFormat {
    Kml,
    Json,
}

impl BoundaryFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "kml" => Some(BoundaryFormat::Kml),
            "json" => Some(BoundaryFormat::Json),
            _ => None,
        }
    }
}

/// Pick a source implementation from a path: directories are walked,
/// files are chosen by extension.
pub fn source_for_path(path: &Path) -> Result<Box<dyn BoundarySource>, LoadError> {
    if path.is_dir() {
        return Ok(Box::new(DirectorySource::new(path)));
    }
    match BoundaryFormat::from_path(path) {
        Some(BoundaryFormat::Kml) => Ok(Box::new(KmlFileSource::new(path))),
        Some(BoundaryFormat::Json) => Ok(Box::new(JsonFileSource::new(path))),
        None => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
