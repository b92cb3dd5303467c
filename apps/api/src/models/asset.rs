#![allow(dead_code)]

use bytes::Bytes;

/// An uploaded stamp asset as read back from the store.
///
/// `sequence` is the store-assigned upload order and is the stable sort key
/// for listing. Placement order inside a dimension group follows it.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub asset_id: String,
    pub sequence: u64,
    /// Raw SVG content, immutable once stored.
    pub bytes: Bytes,
    /// Nominal physical size in millimeters, caller-supplied at upload.
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Identity returned to the caller after a successful upload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredAssetMeta {
    pub asset_id: String,
    pub sequence: u64,
}
