// Session-scoped asset storage: uploaded stamps plus generated documents.

pub mod fs;

pub use fs::FsAssetStore;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::AppError;
use crate::models::asset::{StoredAsset, StoredAssetMeta};

/// Durable mapping from session id to an ordered set of uploaded assets.
///
/// Sessions are created implicitly by the first `put` and destroyed by
/// `clear`, which cascades to every stored asset and generated document.
/// Writes to one session are serialized by the caller (the per-session
/// lock in `AppState`); readers may run unsynchronized and rely on the
/// implementation making an asset's content and size metadata visible
/// atomically together.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores one asset and assigns it an id and an upload sequence number.
    /// The sequence number is the stable ordering key for `list_assets`.
    async fn put(
        &self,
        session_id: &str,
        content: Bytes,
        width_mm: f64,
        height_mm: f64,
    ) -> Result<StoredAssetMeta, AppError>;

    /// Returns the session's assets in upload order.
    /// Fails with `SessionNotFound` for unknown sessions.
    async fn list_assets(&self, session_id: &str) -> Result<Vec<StoredAsset>, AppError>;

    /// Destroys the session and everything it owns.
    /// Fails with `SessionNotFound` for unknown sessions.
    async fn clear(&self, session_id: &str) -> Result<(), AppError>;

    /// Persists a generated document under the session's output area,
    /// overwriting any previous document at the same relative path.
    async fn write_output(
        &self,
        session_id: &str,
        relative_path: &str,
        bytes: &[u8],
    ) -> Result<(), AppError>;
}
