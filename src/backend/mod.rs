//! The dataset collaborator: folder state, caption persistence and the actual image
//! edits. The canvas only describes edits; everything that touches files happens
//! behind [`DatasetBackend`].

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::BackendError;
use crate::tools::ToolData;

pub mod memory;

pub use memory::MemoryBackend;

/// One image of the dataset together with its caption file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetItem {
    pub image: PathBuf,
    pub caption: PathBuf,
    pub caption_str: String,
}

impl DatasetItem {
    /// Item whose caption file sits next to the image with a `.txt` extension
    pub fn new(image: impl Into<PathBuf>, caption_str: impl Into<String>) -> Self {
        let image = image.into();
        Self {
            caption: image.with_extension("txt"),
            image,
            caption_str: caption_str.into(),
        }
    }
}

/// Snapshot of the open dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetState {
    pub folder: Option<PathBuf>,
    /// Tags shared by every caption, edited once for the whole folder
    pub caption_prefix: String,
    pub items: Vec<DatasetItem>,
}

impl DatasetState {
    pub fn item(&self, image: &std::path::Path) -> Option<&DatasetItem> {
        self.items.iter().find(|item| item.image == image)
    }
}

/// What Apply sends: the tool's edit, if any, plus the caption edits for `current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tool: Option<ToolData>,
    pub current: PathBuf,
    pub caption: String,
    pub caption_prefix: String,
}

/// Anchor of the resized image inside the target canvas for [`BatchOperation::AlignResolution`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl BoxPosition {
    pub const ALL: [BoxPosition; 9] = [
        BoxPosition::TopLeft,
        BoxPosition::TopCenter,
        BoxPosition::TopRight,
        BoxPosition::CenterLeft,
        BoxPosition::Center,
        BoxPosition::CenterRight,
        BoxPosition::BottomLeft,
        BoxPosition::BottomCenter,
        BoxPosition::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxPosition::TopLeft => "top-left",
            BoxPosition::TopCenter => "top-center",
            BoxPosition::TopRight => "top-right",
            BoxPosition::CenterLeft => "center-left",
            BoxPosition::Center => "center",
            BoxPosition::CenterRight => "center-right",
            BoxPosition::BottomLeft => "bottom-left",
            BoxPosition::BottomCenter => "bottom-center",
            BoxPosition::BottomRight => "bottom-right",
        }
    }
}

/// Folder-wide caption or image operation, tagged by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "snake_case")]
pub enum BatchOperation {
    EscapeParentheses,
    UnescapeParentheses,
    #[serde(rename_all = "camelCase")]
    AlignResolution {
        width: u32,
        height: u32,
        color: String,
        box_tag: bool,
        position: BoxPosition,
    },
    DedupTags,
    RemoveMatching {
        pattern: String,
    },
    FindReplace {
        find: String,
        replace: String,
    },
}

impl BatchOperation {
    pub fn name(&self) -> &'static str {
        match self {
            BatchOperation::EscapeParentheses => "Escape parentheses",
            BatchOperation::UnescapeParentheses => "Unescape parentheses",
            BatchOperation::AlignResolution { .. } => "Align resolution",
            BatchOperation::DedupTags => "Deduplicate tags",
            BatchOperation::RemoveMatching { .. } => "Remove matching tags",
            BatchOperation::FindReplace { .. } => "Find and replace",
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Request/response API of the dataset collaborator.
///
/// Every call returns a future that the editor polls from the UI loop, so an
/// implementation may do its work on another thread or inline.
pub trait DatasetBackend: Send + Sync {
    fn get_state(&self) -> BoxFuture<'static, BackendResult<DatasetState>>;

    fn open_folder(&self, folder: PathBuf) -> BoxFuture<'static, BackendResult<DatasetState>>;

    fn close_folder(&self) -> BoxFuture<'static, BackendResult<DatasetState>>;

    /// Commit an edit. Resolves to the item the editor should select next, if any.
    fn save(&self, request: SaveRequest) -> BoxFuture<'static, BackendResult<Option<PathBuf>>>;

    fn delete_item(&self, image: PathBuf) -> BoxFuture<'static, BackendResult<DatasetState>>;

    /// Import files dropped onto the window.
    fn on_drag(&self, paths: Vec<PathBuf>) -> BoxFuture<'static, BackendResult<DatasetState>>;

    fn batch_operation(&self, operation: BatchOperation) -> BoxFuture<'static, BackendResult<DatasetState>>;
}
