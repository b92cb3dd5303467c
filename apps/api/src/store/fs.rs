//! Filesystem-backed asset store.
//!
//! Layout on disk: one directory per session under the configured root.
//! Each asset is a `NNNNNN-<asset_id>.svg` content file with a sidecar
//! `NNNNNN-<asset_id>.meta` holding `width_mm,height_mm`. The zero-padded
//! sequence prefix makes lexicographic filename order equal upload order.
//!
//! Visibility protocol: the sidecar is written first, then the content is
//! written to a temporary name and renamed into place. Listing keys off
//! `.svg` files, so a concurrent reader never observes an asset whose
//! metadata is missing or incomplete.
//!
//! Assets whose sidecar is missing or unparsable are skipped from listing
//! with a warning rather than failing the batch.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::asset::{StoredAsset, StoredAssetMeta};
use crate::store::AssetStore;

const CONTENT_EXT: &str = "svg";
const SIDECAR_EXT: &str = "meta";

pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsAssetStore { root: root.into() }
    }

    /// Creates the storage root. Called once at startup.
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn session_path(&self, session_id: &str) -> Result<PathBuf, AppError> {
        // Session ids become directory names; keep them to a safe charset.
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::Validation(format!(
                "invalid session id '{session_id}'"
            )));
        }
        Ok(self.root.join(session_id))
    }

    async fn existing_session_path(&self, session_id: &str) -> Result<PathBuf, AppError> {
        let path = self.session_path(session_id)?;
        if !fs::try_exists(&path).await? {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }
        Ok(path)
    }

    /// Next upload sequence number: one past the highest prefix on disk.
    async fn next_sequence(session_path: &Path) -> Result<u64, AppError> {
        let mut highest = 0u64;
        let mut entries = fs::read_dir(session_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some((prefix, _)) = name.split_once('-') {
                if let Ok(sequence) = prefix.parse::<u64>() {
                    highest = highest.max(sequence);
                }
            }
        }
        Ok(highest + 1)
    }
}

/// Parses a `width_mm,height_mm` sidecar. Both values must be finite and
/// positive.
fn parse_sidecar(raw: &str) -> Option<(f64, f64)> {
    let (width, height) = raw.trim().split_once(',')?;
    let width: f64 = width.trim().parse().ok()?;
    let height: f64 = height.trim().parse().ok()?;
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((width, height))
}

/// Splits a `NNNNNN-<asset_id>` stem into its sequence and asset id.
fn parse_stem(stem: &str) -> Option<(u64, &str)> {
    let (prefix, asset_id) = stem.split_once('-')?;
    let sequence = prefix.parse::<u64>().ok()?;
    Some((sequence, asset_id))
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn put(
        &self,
        session_id: &str,
        content: Bytes,
        width_mm: f64,
        height_mm: f64,
    ) -> Result<StoredAssetMeta, AppError> {
        let session_path = self.session_path(session_id)?;
        fs::create_dir_all(&session_path).await?;

        let sequence = Self::next_sequence(&session_path).await?;
        let asset_id = Uuid::new_v4().simple().to_string();
        let stem = format!("{sequence:06}-{asset_id}");

        // Sidecar first, then content via rename: a listing that sees the
        // `.svg` is guaranteed to find complete metadata next to it.
        let sidecar_path = session_path.join(format!("{stem}.{SIDECAR_EXT}"));
        fs::write(&sidecar_path, format!("{width_mm},{height_mm}")).await?;

        let tmp_path = session_path.join(format!("{stem}.{CONTENT_EXT}.tmp"));
        let content_path = session_path.join(format!("{stem}.{CONTENT_EXT}"));
        fs::write(&tmp_path, &content).await?;
        fs::rename(&tmp_path, &content_path).await?;

        Ok(StoredAssetMeta { asset_id, sequence })
    }

    async fn list_assets(&self, session_id: &str) -> Result<Vec<StoredAsset>, AppError> {
        let session_path = self.existing_session_path(session_id).await?;

        let mut names: Vec<String> = Vec::new();
        let mut entries = fs::read_dir(&session_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(stem) = name.strip_suffix(&format!(".{CONTENT_EXT}")) {
                names.push(stem.to_string());
            }
        }
        // Zero-padded sequence prefixes: filename order is upload order.
        names.sort();

        let mut assets = Vec::with_capacity(names.len());
        for stem in names {
            let Some((sequence, asset_id)) = parse_stem(&stem) else {
                warn!(session_id, file = %stem, "skipping asset with unrecognized filename");
                continue;
            };

            let sidecar_path = session_path.join(format!("{stem}.{SIDECAR_EXT}"));
            let raw = match fs::read_to_string(&sidecar_path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(session_id, asset_id, "skipping asset with missing size metadata: {e}");
                    continue;
                }
            };
            let Some((width_mm, height_mm)) = parse_sidecar(&raw) else {
                warn!(session_id, asset_id, metadata = %raw.trim(), "skipping asset with unparsable size metadata");
                continue;
            };

            let content_path = session_path.join(format!("{stem}.{CONTENT_EXT}"));
            let content = fs::read(&content_path).await?;

            assets.push(StoredAsset {
                asset_id: asset_id.to_string(),
                sequence,
                bytes: Bytes::from(content),
                width_mm,
                height_mm,
            });
        }
        Ok(assets)
    }

    async fn clear(&self, session_id: &str) -> Result<(), AppError> {
        let session_path = self.existing_session_path(session_id).await?;
        fs::remove_dir_all(&session_path).await?;
        Ok(())
    }

    async fn write_output(
        &self,
        session_id: &str,
        relative_path: &str,
        bytes: &[u8],
    ) -> Result<(), AppError> {
        let session_path = self.existing_session_path(session_id).await?;
        let output_path = session_path.join(relative_path);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&output_path, bytes).await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn make_store() -> (TempDir, FsAssetStore) {
        let dir = TempDir::new().unwrap();
        let store = FsAssetStore::new(dir.path());
        (dir, store)
    }

    async fn put_stamp(store: &FsAssetStore, session: &str, w: f64, h: f64) -> StoredAssetMeta {
        store
            .put(session, Bytes::from_static(b"<svg/>"), w, h)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_creates_session_implicitly() {
        let (_dir, store) = make_store();
        let meta = put_stamp(&store, "sess-1", 40.0, 15.0).await;
        assert_eq!(meta.sequence, 1);

        let assets = store.list_assets("sess-1").await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_id, meta.asset_id);
        assert_eq!(assets[0].width_mm, 40.0);
        assert_eq!(assets[0].height_mm, 15.0);
        assert_eq!(assets[0].bytes.as_ref(), b"<svg/>");
    }

    #[tokio::test]
    async fn test_list_preserves_upload_order() {
        let (_dir, store) = make_store();
        let first = put_stamp(&store, "sess-1", 40.0, 15.0).await;
        let second = put_stamp(&store, "sess-1", 20.0, 20.0).await;
        let third = put_stamp(&store, "sess-1", 40.0, 15.0).await;

        let assets = store.list_assets("sess-1").await.unwrap();
        let ids: Vec<String> = assets.iter().map(|a| a.asset_id.clone()).collect();
        assert_eq!(ids, vec![first.asset_id, second.asset_id, third.asset_id]);
        assert_eq!(
            assets.iter().map(|a| a.sequence).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (_dir, store) = make_store();
        put_stamp(&store, "sess-a", 40.0, 15.0).await;
        put_stamp(&store, "sess-b", 20.0, 20.0).await;

        let a = store.list_assets("sess-a").await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].width_mm, 40.0);
    }

    #[tokio::test]
    async fn test_list_unknown_session_fails() {
        let (_dir, store) = make_store();
        let err = store.list_assets("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_unknown_session_fails() {
        let (_dir, store) = make_store();
        let err = store.clear("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_cascades_and_forgets_session() {
        let (dir, store) = make_store();
        put_stamp(&store, "sess-1", 40.0, 15.0).await;
        store
            .write_output("sess-1", "output/stamps_40x15.pdf", b"%PDF-")
            .await
            .unwrap();

        store.clear("sess-1").await.unwrap();
        assert!(!dir.path().join("sess-1").exists());
        let err = store.list_assets("sess-1").await.unwrap_err();
        assert!(matches!(err, AppError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_sidecar_is_skipped() {
        let (dir, store) = make_store();
        let kept = put_stamp(&store, "sess-1", 40.0, 15.0).await;
        let dropped = put_stamp(&store, "sess-1", 20.0, 20.0).await;

        let sidecar = dir
            .path()
            .join("sess-1")
            .join(format!("{:06}-{}.meta", dropped.sequence, dropped.asset_id));
        std::fs::remove_file(sidecar).unwrap();

        let assets = store.list_assets("sess-1").await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_id, kept.asset_id);
    }

    #[tokio::test]
    async fn test_corrupt_sidecar_is_skipped() {
        let (dir, store) = make_store();
        let kept = put_stamp(&store, "sess-1", 40.0, 15.0).await;
        let dropped = put_stamp(&store, "sess-1", 20.0, 20.0).await;

        let sidecar = dir
            .path()
            .join("sess-1")
            .join(format!("{:06}-{}.meta", dropped.sequence, dropped.asset_id));
        std::fs::write(sidecar, "forty,fifteen").unwrap();

        let assets = store.list_assets("sess-1").await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].asset_id, kept.asset_id);
    }

    #[tokio::test]
    async fn test_write_output_overwrites() {
        let (dir, store) = make_store();
        put_stamp(&store, "sess-1", 40.0, 15.0).await;

        store
            .write_output("sess-1", "output/stamps_40x15.pdf", b"first")
            .await
            .unwrap();
        store
            .write_output("sess-1", "output/stamps_40x15.pdf", b"second")
            .await
            .unwrap();

        let written =
            std::fs::read(dir.path().join("sess-1/output/stamps_40x15.pdf")).unwrap();
        assert_eq!(written, b"second");
    }

    #[tokio::test]
    async fn test_invalid_session_id_rejected() {
        let (_dir, store) = make_store();
        let err = store
            .put("../escape", Bytes::from_static(b"<svg/>"), 40.0, 15.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_sidecar_rejects_bad_values() {
        assert_eq!(parse_sidecar("40,15"), Some((40.0, 15.0)));
        assert_eq!(parse_sidecar(" 40.5 , 15.25 "), Some((40.5, 15.25)));
        assert_eq!(parse_sidecar("40"), None);
        assert_eq!(parse_sidecar("0,15"), None);
        assert_eq!(parse_sidecar("-40,15"), None);
        assert_eq!(parse_sidecar("NaN,15"), None);
        assert_eq!(parse_sidecar("forty,fifteen"), None);
    }
}
