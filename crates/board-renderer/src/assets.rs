//! Board artwork: backgrounds and object images.
//!
//! Every image a composition references is requested concurrently and the
//! whole set is joined before assembly starts. A missing or undecodable image
//! is logged and left out; the assembler degrades around the gap.

use async_trait::async_trait;
use futures::future::join_all;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use board_common::{Background, BoardError, BoardResult};

use crate::compose::Composition;

/// Extensions tried, in order, for every asset.
const EXTENSIONS: [&str; 2] = ["webp", "png"];

/// Source of decoded board artwork.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn background(&self, background: Background) -> BoardResult<Arc<RgbaImage>>;

    async fn object(&self, name: &str) -> BoardResult<Arc<RgbaImage>>;
}

/// Assets laid out on disk as:
///
/// ```text
/// <root>/background/<1..7>.webp
/// <root>/objects/<name>.webp
/// ```
///
/// PNG files are accepted in place of WebP. Decoded images are kept for the
/// lifetime of the store.
pub struct DirectoryAssets {
    root: PathBuf,
    decoded: RwLock<HashMap<PathBuf, Arc<RgbaImage>>>,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            decoded: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn load(&self, dir: &str, name: &str) -> BoardResult<Arc<RgbaImage>> {
        // Names come from board codes; keep them inside the asset directory.
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(BoardError::AssetMissing(format!("{}/{}", dir, name)));
        }

        for ext in EXTENSIONS {
            let path = self.root.join(dir).join(format!("{}.{}", name, ext));

            if let Some(image) = self.decoded.read().await.get(&path) {
                return Ok(Arc::clone(image));
            }

            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(BoardError::AssetMissing(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                }
            };

            let image = Arc::new(decode_image(bytes).await?);
            debug!(
                path = %path.display(),
                width = image.width(),
                height = image.height(),
                "Loaded asset"
            );
            self.decoded
                .write()
                .await
                .insert(path, Arc::clone(&image));
            return Ok(image);
        }

        Err(BoardError::AssetMissing(format!("{}/{}", dir, name)))
    }
}

#[async_trait]
impl AssetStore for DirectoryAssets {
    async fn background(&self, background: Background) -> BoardResult<Arc<RgbaImage>> {
        self.load("background", background.asset_name()).await
    }

    async fn object(&self, name: &str) -> BoardResult<Arc<RgbaImage>> {
        self.load("objects", name).await
    }
}

async fn decode_image(bytes: Vec<u8>) -> BoardResult<RgbaImage> {
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
            .map(|img| img.to_rgba8())
            .map_err(|e| BoardError::AssetMissing(format!("undecodable image: {}", e)))
    })
    .await
    .map_err(|e| BoardError::Internal(format!("asset decode task failed: {}", e)))?
}

/// Images resolved for one composition.
#[derive(Debug, Default, Clone)]
pub struct LoadedAssets {
    pub background: Option<Arc<RgbaImage>>,
    pub objects: HashMap<String, Arc<RgbaImage>>,
}

impl LoadedAssets {
    pub fn object(&self, name: &str) -> Option<&RgbaImage> {
        self.objects.get(name).map(Arc::as_ref)
    }
}

/// Fetch every image `composition` needs, concurrently, and wait for all of them.
pub async fn load_assets(store: &dyn AssetStore, composition: &Composition) -> LoadedAssets {
    let names = composition.required_assets();

    let objects = join_all(names.into_iter().map(|name| async move {
        let result = store.object(&name).await;
        (name, result)
    }));
    let (background, objects) = futures::join!(store.background(composition.background), objects);

    let background = match background {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(background = ?composition.background, error = %e, "Background unavailable, using fallback");
            None
        }
    };

    let objects = objects
        .into_iter()
        .filter_map(|(name, result)| match result {
            Ok(image) => Some((name, image)),
            Err(e) => {
                warn!(asset = %name, error = %e, "Object image unavailable");
                None
            }
        })
        .collect();

    LoadedAssets {
        background,
        objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let assets = DirectoryAssets::new(dir.path());
        for name in ["", "../secret", "a/b", ".hidden"] {
            assert!(matches!(
                assets.object(name).await,
                Err(BoardError::AssetMissing(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_missing_directory_is_asset_missing() {
        let assets = DirectoryAssets::new("/nonexistent/board-assets");
        assert!(matches!(
            assets.background(Background::Grey).await,
            Err(BoardError::AssetMissing(_))
        ));
    }
}
