use image::{imageops::FilterType, ImageFormat, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::client::GalleryClient;
use super::error::Result;

/// Size of generated thumbnails (square bounding box)
const THUMBNAIL_SIZE: u32 = 256;

/// Entries kept by `ThumbnailCache::prune` at startup
pub const MAX_CACHED_THUMBNAILS: usize = 5000;

/// Decoded thumbnail pixels ready to hand to the renderer
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8
    pub pixels: Vec<u8>,
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Get the default thumbnail cache directory
/// Returns ~/.cache/sd-gallery/thumbnails on Linux
///
/// Nothing is evicted while the app runs. The directory only shrinks
/// when `ThumbnailCache::prune` is called, which happens once at startup.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().or_else(dirs::home_dir).map(|mut path| {
        path.push("sd-gallery");
        path.push("thumbnails");
        path
    })
}

/// On-disk cache of generated thumbnails keyed by image id
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids are arbitrary relative paths, so the file name is their hash
    pub fn path_for(&self, id: &str) -> PathBuf {
        let hash = blake3::hash(id.as_bytes());
        self.dir.join(format!("{}.png", hash.to_hex()))
    }

    /// Delete the oldest files until at most `max_entries` remain.
    /// Returns how many were removed; a missing directory counts as empty.
    pub fn prune(&self, max_entries: usize) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_file() {
                files.push((meta.modified()?, entry.path()));
            }
        }
        if files.len() <= max_entries {
            return Ok(0);
        }

        files.sort();
        let excess = files.len() - max_entries;
        for (_, path) in &files[..excess] {
            std::fs::remove_file(path)?;
        }
        debug!("Pruned {} cached thumbnails", excess);
        Ok(excess)
    }

    /// Read a cached thumbnail, `None` on miss or unreadable file
    pub async fn load(&self, id: &str) -> Option<Thumbnail> {
        let path = self.path_for(id);
        let data = tokio::fs::read(&path).await.ok()?;

        let decoded = tokio::task::spawn_blocking(move || {
            image::load_from_memory_with_format(&data, ImageFormat::Png)
        })
        .await
        .ok()?;

        match decoded {
            Ok(img) => {
                let rgba = img.to_rgba8();
                Some(Thumbnail {
                    width: rgba.width(),
                    height: rgba.height(),
                    pixels: rgba.into_raw(),
                })
            }
            Err(e) => {
                warn!("Discarding corrupt cached thumbnail {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write a thumbnail to the cache, creating the directory if needed
    pub async fn store(&self, id: &str, thumbnail: &Thumbnail) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(id);
        let thumbnail = thumbnail.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let Thumbnail {
                width,
                height,
                pixels,
            } = thumbnail;
            if let Some(img) = RgbaImage::from_raw(width, height, pixels) {
                img.save_with_format(&path, ImageFormat::Png)?;
            }
            Ok(())
        })
        .await?
    }
}

/// Decode downloaded image bytes and shrink them to thumbnail size
pub fn make_thumbnail(data: &[u8]) -> Result<Thumbnail> {
    let img = image::load_from_memory(data)?;

    let thumbnail = if img.width() > THUMBNAIL_SIZE || img.height() > THUMBNAIL_SIZE {
        img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
    } else {
        img
    };

    let rgba = thumbnail.to_rgba8();
    Ok(Thumbnail {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

/// Load the thumbnail for `id`: from the disk cache when present,
/// otherwise download, downscale on a blocking thread and cache it
pub async fn load_thumbnail(
    client: GalleryClient,
    cache: Option<ThumbnailCache>,
    id: String,
) -> Result<Thumbnail> {
    if let Some(cache) = &cache {
        if let Some(thumbnail) = cache.load(&id).await {
            return Ok(thumbnail);
        }
    }

    let data = client.fetch_image(&id).await?;
    let thumbnail = tokio::task::spawn_blocking(move || make_thumbnail(&data)).await??;
    debug!("Generated thumbnail for {} ({}x{})", id, thumbnail.width, thumbnail.height);

    if let Some(cache) = &cache {
        if let Err(e) = cache.store(&id, &thumbnail).await {
            warn!("Failed to cache thumbnail for {}: {}", id, e);
        }
    }

    Ok(thumbnail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba};
    use std::io::Cursor;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_prune_removes_oldest_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::new(temp_dir.path());
        for (i, name) in ["a.png", "b.png", "c.png", "d.png"].iter().enumerate() {
            let file = std::fs::File::create(temp_dir.path().join(name)).unwrap();
            let written = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_000 + i as u64);
            file.set_modified(written).unwrap();
        }

        assert_eq!(cache.prune(2).unwrap(), 2);

        let mut left: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, ["c.png", "d.png"]);
        assert_eq!(cache.prune(2).unwrap(), 0);
    }

    #[test]
    fn test_prune_missing_dir_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::new(temp_dir.path().join("never-created"));
        assert_eq!(cache.prune(0).unwrap(), 0);
    }

    #[test]
    fn test_make_thumbnail_keeps_aspect() {
        let thumb = make_thumbnail(&png_bytes(1024, 512)).unwrap();

        assert_eq!((thumb.width, thumb.height), (256, 128));
        assert_eq!(thumb.pixels.len(), 256 * 128 * 4);
    }

    #[test]
    fn test_small_images_not_upscaled() {
        let thumb = make_thumbnail(&png_bytes(64, 48)).unwrap();
        assert_eq!((thumb.width, thumb.height), (64, 48));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(make_thumbnail(b"definitely not an image").is_err());
    }

    #[test]
    fn test_cache_path_is_stable_and_flat() {
        let cache = ThumbnailCache::new("/tmp/thumbs");
        let a = cache.path_for("2023/05/01/a.png");

        assert_eq!(a, cache.path_for("2023/05/01/a.png"));
        assert_ne!(a, cache.path_for("2023/05/01/b.png"));
        assert_eq!(a.parent(), Some(Path::new("/tmp/thumbs")));
    }

    #[tokio::test]
    async fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::new(dir.path().join("thumbs"));
        let thumb = make_thumbnail(&png_bytes(300, 300)).unwrap();

        assert!(cache.load("x.png").await.is_none());
        cache.store("x.png", &thumb).await.unwrap();
        assert_eq!(cache.load("x.png").await, Some(thumb));
    }

    #[tokio::test]
    async fn test_load_thumbnail_downloads_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/image/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(512, 512)))
            .expect(1)
            .mount(&server)
            .await;

        let client = GalleryClient::new(&format!("{}/api/v1", server.uri()), None).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::new(dir.path());

        let first = load_thumbnail(client.clone(), Some(cache.clone()), "cat.png".to_string())
            .await
            .unwrap();
        let second = load_thumbnail(client, Some(cache), "cat.png".to_string())
            .await
            .unwrap();

        assert_eq!(first.width, 256);
        assert_eq!(first, second);
    }
}
