//! Minimal KML reader for exported map boundaries.
//!
//! Only the pieces a boundary needs are read from each `<Placemark>`: the
//! first usable `<name>`, the `<styleUrl>` and the first `<coordinates>`
//! block. Everything else in the document is ignored.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::source::BoundaryRecord;

static PLACEMARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Placemark\b[^>]*>(.*?)</Placemark>").expect("placemark regex"));
static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<name>\s*(?:<!\[CDATA\[(.*?)\]\]>|([^<]*))\s*</name>").expect("name regex")
});
static STYLE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<styleUrl>\s*([^<]*?)\s*</styleUrl>").expect("style regex"));
static COORDINATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<coordinates>\s*([^<]*?)\s*</coordinates>").expect("coordinates regex")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity regex")
});

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Decode XML entities in one pass; unknown ones are kept as written.
fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| match decode_entity(&caps[1]) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Style URLs like `#poly-000000-1200-77-1042` carry the place id after
/// the last dash. Exports often share a suffix such as `nodesc`; the store
/// resolves the resulting duplicates.
fn id_from_style_url(style_url: &str) -> Option<String> {
    let (_, suffix) = style_url.rsplit_once('-')?;
    let suffix = suffix.trim();
    (!suffix.is_empty()).then(|| suffix.to_string())
}

/// Extract boundary records from a KML document.
///
/// Placemarks without a name or without coordinates are skipped here;
/// coordinate validation happens when the store builds boundaries.
pub fn parse_kml(document: &str) -> Vec<BoundaryRecord> {
    let mut records = Vec::new();

    for placemark in PLACEMARK.captures_iter(document) {
        let body = &placemark[1];

        // Names starting with '#' are style references, not place names
        let name = NAME
            .captures_iter(body)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| unescape(m.as_str().trim()))
            .find(|n| !n.is_empty() && !n.starts_with('#'));

        let coordinates = COORDINATES
            .captures(body)
            .map(|c| c[1].to_string())
            .filter(|c| !c.is_empty());

        let (name, coordinates) = match (name, coordinates) {
            (Some(name), Some(coordinates)) => (name, coordinates),
            (name, _) => {
                debug!("Skipping placemark without name or coordinates: {:?}", name);
                continue;
            }
        };

        let style_url = STYLE_URL.captures(body).map(|c| c[1].to_string());
        let id = style_url.as_deref().and_then(id_from_style_url);

        records.push(BoundaryRecord {
            id,
            name,
            category: style_url,
            coordinates,
        });
    }

    debug!("Parsed {} placemarks from KML", records.len());
    records
}
