//! Regional band name normalization.
//!
//! Catalog profile tables are keyed by the LoRa Alliance regional band
//! names (`EU863-870`, `US902-928`, …). Internally, and in every query
//! surface, the canonical band identifier form is used (`EU_863_870`,
//! `US_902_928`, …).

/// Catalog band name → canonical band identifier.
const BANDS: &[(&str, &str)] = &[
    ("EU863-870", "EU_863_870"),
    ("US902-928", "US_902_928"),
    ("CN779-787", "CN_779_787"),
    ("EU433", "EU_433"),
    ("AU915-928", "AU_915_928"),
    ("CN470-510", "CN_470_510"),
    ("AS923", "AS_923"),
    ("KR920-923", "KR_920_923"),
    ("IN865-867", "IN_865_867"),
    ("RU864-870", "RU_864_870"),
];

/// Resolve a catalog band name to its canonical band identifier.
/// Returns `None` for unrecognized band names.
pub fn band_id(region: &str) -> Option<&'static str> {
    BANDS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, id)| *id)
}
