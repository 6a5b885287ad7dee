//! Local image assets attached to a product.

use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::CoreError;

/// The two image slots a product carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRole {
    Thumbnail,
    Packshot,
}

impl AssetRole {
    /// Every role, in the order they are attached to a record.
    pub const ALL: [AssetRole; 2] = [AssetRole::Thumbnail, AssetRole::Packshot];

    /// Field holding the local path of the asset.
    #[must_use]
    pub fn path_field(self) -> &'static str {
        match self {
            AssetRole::Thumbnail => "thumbnail",
            AssetRole::Packshot => "packshot",
        }
    }

    /// Field the base64 payload is written to.
    #[must_use]
    pub fn payload_field(self) -> &'static str {
        match self {
            AssetRole::Thumbnail => "thumbnail_base64",
            AssetRole::Packshot => "packshot_base64",
        }
    }

    /// Field the derived filename is written to.
    #[must_use]
    pub fn name_field(self) -> &'static str {
        match self {
            AssetRole::Thumbnail => "thumbnail_name",
            AssetRole::Packshot => "packshot_name",
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_field())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAsset {
    /// Standard-alphabet, padded base64 of the file contents.
    pub base64: String,
    pub name: String,
}

/// Text after the last `/` of a stored path. Empty when the path ends in `/`.
#[must_use]
pub fn derive_asset_name(stored_path: &str) -> &str {
    stored_path.rsplit('/').next().unwrap_or(stored_path)
}

/// Resolves a stored asset path against `base_dir`.
///
/// Stored paths come back from the API both as `uploads/a.webp` and
/// `/uploads/a.jpeg`; both land inside `base_dir`.
#[must_use]
pub fn resolve_asset_path(base_dir: &Path, stored_path: &str) -> PathBuf {
    base_dir.join(stored_path.trim_start_matches('/'))
}

/// Reads the asset at `stored_path` (relative to `base_dir`) and encodes it.
///
/// The file is read in one call and closed before this returns.
///
/// # Errors
///
/// Returns [`CoreError::AssetRead`] if the file is missing or unreadable.
pub async fn encode_asset(base_dir: &Path, stored_path: &str) -> Result<EncodedAsset, CoreError> {
    let path = resolve_asset_path(base_dir, stored_path);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| CoreError::AssetRead {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "encoded asset");

    Ok(EncodedAsset {
        base64: STANDARD.encode(&bytes),
        name: derive_asset_name(stored_path).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    /// Scratch assets directory with an empty `uploads/` inside.
    fn scratch_dir() -> TempDir {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::create_dir(dir.path().join("uploads")).expect("create uploads dir");
        dir
    }

    #[test]
    fn role_field_names() {
        assert_eq!(AssetRole::Thumbnail.path_field(), "thumbnail");
        assert_eq!(AssetRole::Thumbnail.payload_field(), "thumbnail_base64");
        assert_eq!(AssetRole::Thumbnail.name_field(), "thumbnail_name");
        assert_eq!(AssetRole::Packshot.path_field(), "packshot");
        assert_eq!(AssetRole::Packshot.payload_field(), "packshot_base64");
        assert_eq!(AssetRole::Packshot.name_field(), "packshot_name");
    }

    #[test]
    fn derive_asset_name_takes_last_segment() {
        assert_eq!(derive_asset_name("uploads/product1.webp"), "product1.webp");
        assert_eq!(
            derive_asset_name("/uploads/product1_packshot.jpeg"),
            "product1_packshot.jpeg"
        );
        assert_eq!(derive_asset_name("flat.png"), "flat.png");
        assert_eq!(derive_asset_name("uploads/"), "");
    }

    #[test]
    fn resolve_keeps_leading_slash_paths_inside_base_dir() {
        let base = Path::new("./scripts");
        assert_eq!(
            resolve_asset_path(base, "/uploads/a.jpeg"),
            PathBuf::from("./scripts/uploads/a.jpeg")
        );
        assert_eq!(
            resolve_asset_path(base, "uploads/a.webp"),
            PathBuf::from("./scripts/uploads/a.webp")
        );
    }

    #[tokio::test]
    async fn encode_asset_reads_and_encodes_file() {
        let dir = scratch_dir();
        std::fs::write(dir.path().join("uploads/p.webp"), b"hello").unwrap();

        let encoded = encode_asset(dir.path(), "/uploads/p.webp")
            .await
            .expect("asset should encode");

        assert_eq!(encoded.base64, "aGVsbG8=");
        assert_eq!(encoded.name, "p.webp");
    }

    #[tokio::test]
    async fn encode_asset_of_empty_file_is_empty_payload() {
        let dir = scratch_dir();
        std::fs::write(dir.path().join("uploads/empty.png"), b"").unwrap();

        let encoded = encode_asset(dir.path(), "uploads/empty.png").await.unwrap();

        assert_eq!(encoded.base64, "");
        assert_eq!(encoded.name, "empty.png");
    }

    #[tokio::test]
    async fn encode_asset_missing_file_is_asset_read_error() {
        let dir = scratch_dir();

        let err = encode_asset(dir.path(), "uploads/nope.jpeg").await.unwrap_err();

        match err {
            CoreError::AssetRead { path, source } => {
                assert_eq!(path, dir.path().join("uploads/nope.jpeg"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected AssetRead, got: {other:?}"),
        }
    }
}
