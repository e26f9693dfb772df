use futures::FutureExt;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{BackendResult, BatchOperation, DatasetBackend, DatasetItem, DatasetState, SaveRequest};
use crate::error::BackendError;
use crate::tools::ToolData;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[derive(Debug, Default)]
struct Session {
    state: DatasetState,
    saves: Vec<SaveRequest>,
    operations: Vec<BatchOperation>,
    fail_next: Option<BackendError>,
}

impl Session {
    fn take_failure(&mut self) -> BackendResult<()> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn index_of(&self, image: &Path) -> BackendResult<usize> {
        self.state
            .items
            .iter()
            .position(|item| item.image == image)
            .ok_or_else(|| BackendError::NotFound(image.to_path_buf()))
    }

    fn save(&mut self, request: SaveRequest) -> BackendResult<Option<PathBuf>> {
        self.take_failure()?;
        let index = self.index_of(&request.current)?;
        if let Some(ToolData::Concat { image, .. }) = &request.tool {
            if self.index_of(image)? == index {
                return Err(BackendError::Rejected("cannot concat an image with itself".into()));
            }
        }

        self.state.caption_prefix = request.caption_prefix.clone();
        self.state.items[index].caption_str = request.caption.clone();

        let next = match &request.tool {
            Some(ToolData::Split { mode, .. }) => {
                // the parts replace the source image in place, first part selected next
                let parts = match mode {
                    crate::tools::SplitMode::Cross => 4,
                    _ => 2,
                };
                let source = self.state.items.remove(index);
                let derived: Vec<DatasetItem> = (1..=parts)
                    .map(|n| DatasetItem::new(numbered(&source.image, n), source.caption_str.clone()))
                    .collect();
                let first = derived.first().map(|item| item.image.clone());
                self.state.items.splice(index..index, derived);
                first
            }
            Some(ToolData::Concat { image, .. }) => {
                // the second image is absorbed: its tags join the current caption
                let other = self.state.items.remove(self.index_of(image)?);
                let index = self.index_of(&request.current)?;
                let item = &mut self.state.items[index];
                item.caption_str = merge_tags(&item.caption_str, &other.caption_str);
                self.state.items.get(index + 1).map(|item| item.image.clone())
            }
            _ => self.state.items.get(index + 1).map(|item| item.image.clone()),
        };

        log::info!(
            "Saved {} ({})",
            request.current.display(),
            request.tool.as_ref().map_or("caption only", tool_name)
        );
        self.saves.push(request);
        Ok(next)
    }

    fn batch(&mut self, operation: BatchOperation) -> BackendResult<DatasetState> {
        self.take_failure()?;
        let transform: Option<Box<dyn Fn(&str) -> String>> = match &operation {
            BatchOperation::EscapeParentheses => Some(Box::new(escape_parentheses)),
            BatchOperation::UnescapeParentheses => Some(Box::new(unescape_parentheses)),
            BatchOperation::DedupTags => Some(Box::new(dedup_tags)),
            BatchOperation::RemoveMatching { pattern } => {
                if pattern.is_empty() {
                    return Err(BackendError::Rejected("nothing to match".into()));
                }
                let pattern = Regex::new(pattern).map_err(|err| BackendError::Rejected(err.to_string()))?;
                Some(Box::new(move |caption: &str| remove_matching(caption, &pattern)))
            }
            BatchOperation::FindReplace { find, replace } => {
                if find.is_empty() {
                    return Err(BackendError::Rejected("nothing to find".into()));
                }
                let (find, replace) = (find.clone(), replace.clone());
                Some(Box::new(move |caption: &str| caption.replace(&find, &replace)))
            }
            // pixel work, nothing to do for captions
            BatchOperation::AlignResolution { .. } => None,
        };

        if let Some(transform) = transform {
            if matches!(
                operation,
                BatchOperation::EscapeParentheses | BatchOperation::UnescapeParentheses
            ) {
                self.state.caption_prefix = transform(&self.state.caption_prefix);
            }
            for item in &mut self.state.items {
                item.caption_str = transform(&item.caption_str);
            }
        }
        log::info!("Batch operation: {}", operation.name());
        self.operations.push(operation);
        Ok(self.state.clone())
    }
}

fn tool_name(tool: &ToolData) -> &'static str {
    match tool {
        ToolData::Brush { .. } => "brush",
        ToolData::Rect { .. } => "rect",
        ToolData::Split { .. } => "split",
        ToolData::Trim { .. } => "trim",
        ToolData::Expand { .. } => "expand",
        ToolData::Concat { .. } => "concat",
    }
}

/// `dir/name.png` -> `dir/name_2.png`
fn numbered(image: &Path, n: usize) -> PathBuf {
    let stem = image.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match image.extension() {
        Some(ext) => format!("{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n}"),
    };
    image.with_file_name(name)
}

/// `(` and `)` become `\(` and `\)` unless already escaped.
pub fn escape_parentheses(caption: &str) -> String {
    let mut out = String::with_capacity(caption.len());
    let mut previous = None;
    for c in caption.chars() {
        if matches!(c, '(' | ')') && previous != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

pub fn unescape_parentheses(caption: &str) -> String {
    caption.replace("\\(", "(").replace("\\)", ")")
}

fn tags(caption: &str) -> impl Iterator<Item = &str> {
    caption.split(',').map(str::trim).filter(|tag| !tag.is_empty())
}

/// Drop repeated tags, keeping the first occurrence.
pub fn dedup_tags(caption: &str) -> String {
    let mut seen = Vec::new();
    for tag in tags(caption) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen.join(", ")
}

/// Drop every tag containing `pattern`.
/// Drop every tag the pattern matches.
pub fn remove_matching(caption: &str, pattern: &Regex) -> String {
    tags(caption)
        .filter(|tag| !pattern.is_match(tag))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `current` followed by the tags of `other` it does not have yet.
pub fn merge_tags(current: &str, other: &str) -> String {
    let mut merged: Vec<&str> = tags(current).collect();
    for tag in tags(other) {
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    merged.join(", ")
}

/// Longest prefix shared by every caption, cut on a character boundary.
pub fn common_prefix<'a>(captions: impl IntoIterator<Item = &'a str>) -> String {
    let mut captions = captions.into_iter();
    let Some(first) = captions.next() else {
        return String::new();
    };
    let mut prefix = first;
    for caption in captions {
        let shared = prefix
            .char_indices()
            .zip(caption.chars())
            .find(|((_, a), b)| a != b)
            .map_or(prefix.len().min(caption.len()), |((at, _), _)| at);
        prefix = &prefix[..shared];
    }
    prefix.to_string()
}

/// Caption file for `image`: `stem.txt`, then `name.ext.txt`, then the bare stem.
/// When none exists an empty `stem.txt` is created.
fn caption_file(image: &Path) -> std::io::Result<PathBuf> {
    let mut with_suffix = image.as_os_str().to_owned();
    with_suffix.push(".txt");
    let candidates = [image.with_extension("txt"), PathBuf::from(with_suffix), image.with_extension("")];
    if let Some(found) = candidates.iter().find(|path| path.is_file()) {
        return Ok(found.clone());
    }
    let created = image.with_extension("txt");
    fs::OpenOptions::new().create(true).append(true).open(&created)?;
    log::debug!("Created empty caption {}", created.display());
    Ok(created)
}

/// In-process dataset session.
///
/// Keeps the dataset in memory and records every request it receives; pixel edits
/// are not applied. Cloning shares the session.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    session: Arc<Mutex<Session>>,
}

impl MemoryBackend {
    pub fn new(state: DatasetState) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                state,
                ..Default::default()
            })),
        }
    }

    /// Session over the given images, with empty captions
    pub fn with_images(images: impl IntoIterator<Item = PathBuf>) -> Self {
        Self::new(DatasetState {
            folder: None,
            caption_prefix: String::new(),
            items: images.into_iter().map(|image| DatasetItem::new(image, "")).collect(),
        })
    }

    pub fn state(&self) -> DatasetState {
        self.session.lock().state.clone()
    }

    pub fn saves(&self) -> Vec<SaveRequest> {
        self.session.lock().saves.clone()
    }

    pub fn operations(&self) -> Vec<BatchOperation> {
        self.session.lock().operations.clone()
    }

    /// Make the next mutating request fail with `err`.
    pub fn fail_next(&self, err: BackendError) {
        self.session.lock().fail_next = Some(err);
    }

    /// Every image below `folder`, recursively, with the caption prefix shared by all
    /// of them split off.
    fn scan_folder(folder: &Path) -> BackendResult<DatasetState> {
        if !folder.is_dir() {
            return Err(BackendError::NotFound(folder.to_path_buf()));
        }
        let root = folder
            .to_str()
            .ok_or_else(|| BackendError::Rejected(format!("not a UTF-8 path: {}", folder.display())))?;
        let pattern = format!("{}/**/*", glob::Pattern::escape(root));
        let entries = glob::glob(&pattern).map_err(|err| BackendError::Rejected(err.to_string()))?;

        let mut images: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        images.sort();

        let mut items = Vec::with_capacity(images.len());
        for image in images {
            let caption = caption_file(&image)?;
            let text = fs::read_to_string(&caption)?;
            items.push(DatasetItem {
                image,
                caption,
                caption_str: text.trim_end_matches(['\r', '\n']).to_string(),
            });
        }

        let caption_prefix = common_prefix(items.iter().map(|item| item.caption_str.as_str()));
        for item in &mut items {
            item.caption_str = item.caption_str[caption_prefix.len()..].to_string();
        }
        Ok(DatasetState {
            folder: Some(folder.to_path_buf()),
            caption_prefix,
            items,
        })
    }
}

impl DatasetBackend for MemoryBackend {
    fn get_state(&self) -> BoxFuture<'static, BackendResult<DatasetState>> {
        future::ready(Ok(self.state())).boxed()
    }

    fn open_folder(&self, folder: PathBuf) -> BoxFuture<'static, BackendResult<DatasetState>> {
        let result = Self::scan_folder(&folder).map(|state| {
            log::info!("Opened {} with {} image(s)", folder.display(), state.items.len());
            let mut session = self.session.lock();
            session.state = state;
            session.state.clone()
        });
        future::ready(result).boxed()
    }

    fn close_folder(&self) -> BoxFuture<'static, BackendResult<DatasetState>> {
        let mut session = self.session.lock();
        session.state = DatasetState::default();
        future::ready(Ok(session.state.clone())).boxed()
    }

    fn save(&self, request: SaveRequest) -> BoxFuture<'static, BackendResult<Option<PathBuf>>> {
        let result = self.session.lock().save(request);
        future::ready(result).boxed()
    }

    fn delete_item(&self, image: PathBuf) -> BoxFuture<'static, BackendResult<DatasetState>> {
        let mut session = self.session.lock();
        let result = session.take_failure().and_then(|()| {
            let index = session.index_of(&image)?;
            session.state.items.remove(index);
            log::info!("Removed {}", image.display());
            Ok(session.state.clone())
        });
        future::ready(result).boxed()
    }

    fn on_drag(&self, paths: Vec<PathBuf>) -> BoxFuture<'static, BackendResult<DatasetState>> {
        let mut session = self.session.lock();
        for path in paths.into_iter().filter(|path| is_image(path)) {
            if session.state.item(&path).is_none() {
                log::debug!("Imported {}", path.display());
                session.state.items.push(DatasetItem::new(path, ""));
            }
        }
        future::ready(Ok(session.state.clone())).boxed()
    }

    fn batch_operation(&self, operation: BatchOperation) -> BoxFuture<'static, BackendResult<DatasetState>> {
        let result = self.session.lock().batch(operation);
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ConcatMode, Point, SplitMode};
    use futures::executor::block_on;

    fn backend() -> MemoryBackend {
        MemoryBackend::with_images(["a.png", "b.png", "c.png"].map(PathBuf::from))
    }

    fn request(current: &str, tool: Option<ToolData>) -> SaveRequest {
        SaveRequest {
            tool,
            current: PathBuf::from(current),
            caption: "new caption".into(),
            caption_prefix: "prefix, ".into(),
        }
    }

    #[test]
    fn save_updates_captions_and_selects_the_next_item() {
        let backend = backend();
        let next = block_on(backend.save(request("a.png", None))).unwrap();
        assert_eq!(next, Some(PathBuf::from("b.png")));

        let state = backend.state();
        assert_eq!(state.caption_prefix, "prefix, ");
        assert_eq!(state.items[0].caption_str, "new caption");
        assert_eq!(backend.saves().len(), 1);

        assert_eq!(block_on(backend.save(request("c.png", None))).unwrap(), None);
    }

    #[test]
    fn split_replaces_the_source_with_its_parts() {
        let backend = backend();
        let tool = ToolData::Split {
            mode: SplitMode::Cross,
            point: Point { x: 1.0, y: 1.0 },
        };
        let next = block_on(backend.save(request("a.png", Some(tool)))).unwrap();
        assert_eq!(next, Some(PathBuf::from("a_1.png")));

        let images: Vec<_> = backend.state().items.into_iter().map(|item| item.image).collect();
        assert_eq!(
            images,
            ["a_1.png", "a_2.png", "a_3.png", "a_4.png", "b.png", "c.png"].map(PathBuf::from)
        );
    }

    #[test]
    fn concat_absorbs_the_other_item_and_its_tags() {
        let backend = MemoryBackend::new(DatasetState {
            folder: None,
            caption_prefix: String::new(),
            items: vec![
                DatasetItem::new("a.png", "cat, dog"),
                DatasetItem::new("b.png", "dog, bird"),
                DatasetItem::new("c.png", ""),
            ],
        });
        let tool = ToolData::Concat {
            mode: ConcatMode::Horizontal,
            image: PathBuf::from("a.png"),
            offset: 0,
            color: "#000000".into(),
        };
        let request = SaveRequest {
            tool: Some(tool),
            current: PathBuf::from("b.png"),
            caption: "dog, bird".into(),
            caption_prefix: String::new(),
        };
        let next = block_on(backend.save(request.clone())).unwrap();
        assert_eq!(next, Some(PathBuf::from("c.png")));

        let state = backend.state();
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[0].image, PathBuf::from("b.png"));
        assert_eq!(state.items[0].caption_str, "dog, bird, cat");

        let mut with_itself = request;
        with_itself.tool = Some(ToolData::Concat {
            mode: ConcatMode::Vertical,
            image: PathBuf::from("b.png"),
            offset: 0,
            color: "#000000".into(),
        });
        assert!(matches!(block_on(backend.save(with_itself)), Err(BackendError::Rejected(_))));
    }

    #[test]
    fn unknown_item_and_injected_failures_are_errors() {
        let backend = backend();
        assert_eq!(
            block_on(backend.save(request("missing.png", None))),
            Err(BackendError::NotFound(PathBuf::from("missing.png")))
        );

        backend.fail_next(BackendError::Busy);
        assert_eq!(block_on(backend.save(request("a.png", None))), Err(BackendError::Busy));
        // state untouched by the failed call
        assert_eq!(backend.state().items[0].caption_str, "");
        assert!(block_on(backend.save(request("a.png", None))).is_ok());
    }

    #[test]
    fn caption_text_operations() {
        assert_eq!(escape_parentheses("a (b), \\(c\\)"), "a \\(b\\), \\(c\\)");
        assert_eq!(unescape_parentheses("a \\(b\\)"), "a (b)");
        assert_eq!(dedup_tags("cat, dog,cat , bird"), "cat, dog, bird");
        let red = Regex::new(r"^red\b").unwrap();
        assert_eq!(remove_matching("red hair, blue eyes, dark red dress, redhead", &red), "blue eyes, dark red dress, redhead");
        assert_eq!(merge_tags("a, b", "b, c"), "a, b, c");
        assert_eq!(common_prefix(["style, cat", "style, dog"]), "style, ");
        assert_eq!(common_prefix(["é1", "é2"]), "é");
        assert_eq!(common_prefix(Vec::<&str>::new()), "");
    }

    #[test]
    fn batch_operation_rewrites_every_caption() {
        let backend = MemoryBackend::new(DatasetState {
            folder: None,
            caption_prefix: "x, ".into(),
            items: vec![DatasetItem::new("a.png", "cat, cat"), DatasetItem::new("b.png", "dog")],
        });
        let state = block_on(backend.batch_operation(BatchOperation::DedupTags)).unwrap();
        assert_eq!(state.items[0].caption_str, "cat");
        assert_eq!(state.items[1].caption_str, "dog");
        assert_eq!(backend.operations(), vec![BatchOperation::DedupTags]);
    }

    #[test]
    fn remove_matching_rejects_bad_patterns() {
        let backend = MemoryBackend::new(DatasetState {
            folder: None,
            caption_prefix: String::new(),
            items: vec![DatasetItem::new("a.png", "red hair, blue eyes")],
        });
        let invalid = BatchOperation::RemoveMatching { pattern: "(".into() };
        assert!(matches!(block_on(backend.batch_operation(invalid)), Err(BackendError::Rejected(_))));
        assert!(backend.operations().is_empty());

        let valid = BatchOperation::RemoveMatching {
            pattern: r"^red\b".into(),
        };
        let state = block_on(backend.batch_operation(valid)).unwrap();
        assert_eq!(state.items[0].caption_str, "blue eyes");
    }

    /// Fresh directory under the system temp dir, removed by the caller.
    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("image_toolkit_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn open_folder_scans_recursively_and_splits_off_the_prefix() {
        let dir = scratch_dir();
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.png"), b"").unwrap();
        fs::write(dir.join("a.txt"), "style, cat\n").unwrap();
        fs::write(dir.join("sub/b.jpg"), b"").unwrap();
        fs::write(dir.join("sub/b.jpg.txt"), "style, dog").unwrap();
        fs::write(dir.join("c.webp"), b"").unwrap();
        fs::write(dir.join("c"), "style, bird").unwrap();
        fs::write(dir.join("notes.md"), "ignored").unwrap();

        let backend = MemoryBackend::default();
        let state = block_on(backend.open_folder(dir.clone())).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(state.folder.as_deref(), Some(dir.as_path()));
        assert_eq!(state.caption_prefix, "style, ");
        let items: Vec<(PathBuf, PathBuf, &str)> = state
            .items
            .iter()
            .map(|item| (item.image.clone(), item.caption.clone(), item.caption_str.as_str()))
            .collect();
        assert_eq!(
            items,
            vec![
                (dir.join("a.png"), dir.join("a.txt"), "cat"),
                (dir.join("c.webp"), dir.join("c"), "bird"),
                (dir.join("sub/b.jpg"), dir.join("sub/b.jpg.txt"), "dog"),
            ]
        );
    }

    #[test]
    fn open_folder_creates_missing_captions() {
        let dir = scratch_dir();
        fs::write(dir.join("lonely.png"), b"").unwrap();

        let backend = MemoryBackend::default();
        let state = block_on(backend.open_folder(dir.clone())).unwrap();
        let created = dir.join("lonely.txt").is_file();
        fs::remove_dir_all(&dir).unwrap();

        assert!(created);
        assert_eq!(state.items[0].caption, dir.join("lonely.txt"));
        assert_eq!(state.items[0].caption_str, "");
        assert!(matches!(
            block_on(backend.open_folder(dir)),
            Err(BackendError::NotFound(_))
        ));
    }

    #[test]
    fn dropped_images_are_imported_once() {
        let backend = backend();
        let paths = ["d.png", "notes.txt", "a.png"].map(PathBuf::from).to_vec();
        let state = block_on(backend.on_drag(paths)).unwrap();
        assert_eq!(state.items.len(), 4);
        assert_eq!(state.items[3].image, PathBuf::from("d.png"));
    }

    #[test]
    fn delete_removes_the_item() {
        let backend = backend();
        let state = block_on(backend.delete_item(PathBuf::from("b.png"))).unwrap();
        assert_eq!(state.items.len(), 2);
        assert!(block_on(backend.delete_item(PathBuf::from("b.png"))).is_err());
    }
}
