use std::collections::HashMap;
use std::path::{Path, PathBuf};

use egui::{ColorImage, Context, TextureOptions};

use crate::error::ImageLoadError;
use crate::image::{CanvasImage, CanvasImageRef};

/// Resolves a dataset path into pixels.
///
/// The canvas never reads files itself; it asks this collaborator, which lets tests
/// and other hosts supply images from anywhere.
pub trait ImageSource {
    fn load(&self, path: &Path) -> Result<ColorImage, ImageLoadError>;
}

/// Reads images from the local file system with the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn load(&self, path: &Path) -> Result<ColorImage, ImageLoadError> {
        let bytes = std::fs::read(path).map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        decode_image(&bytes)
    }
}

/// Decode encoded image bytes into an egui image.
pub fn decode_image(bytes: &[u8]) -> Result<ColorImage, ImageLoadError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(ImageLoadError::InvalidDimensions(width, height));
    }
    let rgba = image.to_rgba8();
    let pixels = rgba.as_flat_samples();
    Ok(ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        pixels.as_slice(),
    ))
}

/// Loaded canvas images keyed by path, with least-recently-used eviction.
pub struct ImageCache {
    /// Cached images by path
    images: HashMap<PathBuf, CanvasImageRef>,
    /// Frame each entry was last used in
    last_used: HashMap<PathBuf, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of images to keep
    max_cache_size: usize,
}

impl ImageCache {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            images: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Return the cached image for `path`, loading and uploading it on a miss.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        source: &dyn ImageSource,
        ctx: &Context,
    ) -> Result<CanvasImageRef, ImageLoadError> {
        if let Some(image) = self.images.get(path) {
            self.last_used.insert(path.to_path_buf(), self.current_frame);
            return Ok(image.clone());
        }

        let pixels = source.load(path)?;
        let size = egui::vec2(pixels.size[0] as f32, pixels.size[1] as f32);
        let name = format!("canvas_image:{}", path.display());
        let texture = ctx.load_texture(name, pixels, TextureOptions::LINEAR);
        log::debug!("Loaded {} ({}x{})", path.display(), size.x, size.y);

        let image = CanvasImage::new_ref(path, size, Some(texture));
        self.insert(path.to_path_buf(), image.clone());
        Ok(image)
    }

    /// Insert an already-built image, evicting the oldest entries if over capacity.
    pub fn insert(&mut self, path: PathBuf, image: CanvasImageRef) {
        self.images.insert(path.clone(), image);
        self.last_used.insert(path, self.current_frame);
        self.prune_cache_if_needed();
    }

    pub fn get(&self, path: &Path) -> Option<&CanvasImageRef> {
        self.images.get(path)
    }

    /// Drop the cached image for `path`; the next request reloads it from the source.
    pub fn invalidate(&mut self, path: &Path) {
        self.images.remove(path);
        self.last_used.remove(path);
    }

    fn prune_cache_if_needed(&mut self) {
        if self.images.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(PathBuf, u64)> = self
            .last_used
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        // Oldest first
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = entries.len() - self.max_cache_size;
        for (path, _) in entries.into_iter().take(to_remove) {
            self.images.remove(&path);
            self.last_used.remove(&path);
        }
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.last_used.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
