//! Boundary store: parses named polygon records and publishes them as an
//! immutable snapshot.
//!
//! A load builds a complete new [`BoundarySnapshot`] and swaps it in
//! atomically. Readers load the current `Arc` without locking and never see
//! a partially loaded set. A failed load leaves the previous snapshot in
//! place.

mod kml;
mod rules;
mod source;

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use hashbrown::HashSet;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::models::Boundary;
use crate::pip::BoundaryIndex;

pub use kml::parse_kml;
pub use rules::{ConnectedRule, ConnectedRules};
pub use source::{
    parse_coordinate, parse_coordinates, source_for_path, BoundaryRecord, BoundarySource,
    DirectorySource, JsonFileSource, KmlFileSource, RecordSource,
};

/// Summary of one load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records turned into boundaries
    pub accepted: usize,
    /// Records without a name or without a single valid vertex
    pub dropped: usize,
    /// Malformed coordinate tokens skipped across all records
    pub skipped_tokens: usize,
}

/// Immutable set of boundaries in load order
#[derive(Debug)]
pub struct BoundarySnapshot {
    boundaries: Vec<Boundary>,
    index: BoundaryIndex,
    loaded_at: Option<DateTime<Utc>>,
}

impl BoundarySnapshot {
    pub fn empty() -> Self {
        Self {
            boundaries: Vec::new(),
            index: BoundaryIndex::default(),
            loaded_at: None,
        }
    }

    pub fn new(boundaries: Vec<Boundary>) -> Self {
        let index = BoundaryIndex::build(&boundaries);
        Self {
            boundaries,
            index,
            loaded_at: Some(Utc::now()),
        }
    }

    /// All boundaries, in load order
    pub fn all(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn index(&self) -> &BoundaryIndex {
        &self.index
    }

    pub fn get(&self, id: &str) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.id == id)
    }

    /// When the snapshot was published; `None` before the first load
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

/// Keep `preferred` unless another boundary already has it; then fall back
/// to the name, then to the name with a counter.
fn unique_id(preferred: String, name: &str, seen: &HashSet<String>) -> String {
    if !seen.contains(&preferred) {
        return preferred;
    }
    if !seen.contains(name) {
        return name.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} #{}", name, n);
        if !seen.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Turn raw records into boundaries, applying the parsing policy:
/// malformed tokens are skipped, records without a name or without any
/// valid vertex are dropped. Ids are unique within the result.
pub fn build_boundaries(
    records: Vec<BoundaryRecord>,
    rules: &ConnectedRules,
) -> (Vec<Boundary>, LoadReport) {
    let mut report = LoadReport::default();
    let mut boundaries = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();

    for record in records {
        let name = record.name.trim().to_string();
        let (vertices, errors) = parse_coordinates(&record.coordinates);

        for e in &errors {
            warn!("Boundary {:?}: skipping coordinate: {}", name, e);
        }
        report.skipped_tokens += errors.len();

        if name.is_empty() || vertices.is_empty() {
            debug!(
                "Dropping boundary record {:?} ({} vertices)",
                name,
                vertices.len()
            );
            report.dropped += 1;
            continue;
        }

        let preferred = record
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| name.clone());
        let id = unique_id(preferred.clone(), &name, &seen);
        if id != preferred {
            warn!(
                "Boundary {:?}: id {:?} already taken, using {:?}",
                name, preferred, id
            );
        }
        seen.insert(id.clone());

        boundaries.push(Boundary {
            connected: rules.is_connected(&name),
            id,
            name,
            category: record.category,
            vertices,
        });
        report.accepted += 1;
    }

    (boundaries, report)
}

/// Holds the current boundary snapshot
pub struct BoundaryStore {
    rules: ConnectedRules,
    current: ArcSwap<BoundarySnapshot>,
}

impl BoundaryStore {
    pub fn new(rules: ConnectedRules) -> Self {
        Self {
            rules,
            current: ArcSwap::from_pointee(BoundarySnapshot::empty()),
        }
    }

    /// The current snapshot. Cheap; hold on to it for the duration of a
    /// match so every tier sees the same boundaries.
    pub fn snapshot(&self) -> Arc<BoundarySnapshot> {
        self.current.load_full()
    }

    /// Load a single source, replacing the current snapshot
    pub async fn load(&self, source: &dyn BoundarySource) -> Result<LoadReport, LoadError> {
        info!("Loading boundaries from {}", source.describe());
        let records = source.fetch_records().await.map_err(|e| {
            warn!("Boundary load failed, keeping previous snapshot: {}", e);
            e
        })?;
        Ok(self.load_records(records))
    }

    /// Load several sources into one snapshot, records concatenated in
    /// source order. Any failing source aborts the whole load.
    pub async fn load_all(
        &self,
        sources: &[Box<dyn BoundarySource>],
    ) -> Result<LoadReport, LoadError> {
        for source in sources {
            info!("Loading boundaries from {}", source.describe());
        }
        let batches = try_join_all(sources.iter().map(|s| s.fetch_records()))
            .await
            .map_err(|e| {
                warn!("Boundary load failed, keeping previous snapshot: {}", e);
                e
            })?;
        Ok(self.load_records(batches.into_iter().flatten().collect()))
    }

    /// Build and publish a snapshot from records already in hand
    pub fn load_records(&self, records: Vec<BoundaryRecord>) -> LoadReport {
        let (boundaries, report) = build_boundaries(records, &self.rules);
        let connected = boundaries.iter().filter(|b| b.connected).count();
        self.publish(BoundarySnapshot::new(boundaries));

        info!(
            "Loaded {} boundaries ({} connected, {} dropped, {} bad coordinates)",
            report.accepted, connected, report.dropped, report.skipped_tokens
        );
        report
    }

    fn publish(&self, snapshot: BoundarySnapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

impl Default for BoundaryStore {
    fn default() -> Self {
        Self::new(ConnectedRules::default())
    }
}
