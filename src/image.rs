use egui::{Rect, TextureHandle, TextureId, Vec2};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// Static counter for generating unique IDs
static NEXT_IMAGE_ID: AtomicUsize = AtomicUsize::new(1);

/// An image that can be shown on the canvas.
///
/// Size is in native pixels. The texture is absent for images that were described
/// without being uploaded (tests, or a texture that is still being created); tools only
/// need the size, the surface skips drawing when there is no texture.
#[derive(Clone)]
pub struct CanvasImage {
    id: usize,
    path: PathBuf,
    size: Vec2,
    texture: Option<TextureHandle>,
}

// Shared handle, cloned into tool states (e.g. the second image of a concat)
pub type CanvasImageRef = Arc<CanvasImage>;

// Custom Debug implementation since TextureHandle doesn't implement Debug
impl std::fmt::Debug for CanvasImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasImage")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("size", &self.size)
            .field("has_texture", &self.texture.is_some())
            .finish()
    }
}

impl PartialEq for CanvasImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl CanvasImage {
    pub fn new(path: impl Into<PathBuf>, size: Vec2, texture: Option<TextureHandle>) -> Self {
        let id = NEXT_IMAGE_ID.fetch_add(1, Ordering::SeqCst);
        Self {
            id,
            path: path.into(),
            size,
            texture,
        }
    }

    /// An image with known dimensions and no texture
    pub fn with_size(path: impl Into<PathBuf>, width: f32, height: f32) -> Self {
        Self::new(path, Vec2::new(width, height), None)
    }

    pub fn new_ref(path: impl Into<PathBuf>, size: Vec2, texture: Option<TextureHandle>) -> CanvasImageRef {
        Arc::new(Self::new(path, size, texture))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Image-space rectangle covered by the image, origin top-left
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(egui::Pos2::ZERO, self.size)
    }

    pub fn texture_id(&self) -> Option<TextureId> {
        self.texture.as_ref().map(|t| t.id())
    }
}
