#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod backend;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod image;
pub mod image_cache;
pub mod input;
pub mod notifications;
pub mod panels;
pub mod services;
pub mod tools;

pub use app::{ImageToolkitApp, Settings};
pub use backend::{BatchOperation, DatasetBackend, DatasetItem, DatasetState, MemoryBackend, SaveRequest};
pub use canvas::CanvasSurface;
pub use cli::{Cli, Startup};
pub use config::CanvasConfig;
pub use editor::{Editor, Invalidation, RequestKind};
pub use error::{BackendError, ImageLoadError};
pub use geometry::ViewTransform;
pub use services::{DropHub, Services};
pub use tools::{Tool, ToolData, ToolId, ToolState};
