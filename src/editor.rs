use futures::FutureExt;
use futures::future::BoxFuture;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use uuid::Uuid;

use crate::backend::{BackendResult, BatchOperation, DatasetBackend, DatasetItem, DatasetState, SaveRequest};
use crate::error::BackendError;
use crate::notifications::Notifications;
use crate::services::{DropHub, DropSubscription};
use crate::tools::{ToolId, ToolState};

/// What an in-flight request was for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Refresh,
    Save,
    Batch(&'static str),
    Delete,
    Import,
    OpenFolder,
    CloseFolder,
}

/// Cached pixels that a finished request made stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Image(PathBuf),
    All,
}

enum Outcome {
    Saved(BackendResult<(Option<PathBuf>, DatasetState)>),
    State(BackendResult<DatasetState>),
}

struct PendingRequest {
    id: Uuid,
    kind: RequestKind,
    /// Selection when the request was sent
    target: Option<PathBuf>,
    future: BoxFuture<'static, Outcome>,
}

/// The orchestrator: active tool and its state, the selected dataset item with its
/// caption edits, and the single backend request allowed in flight.
pub struct Editor {
    backend: Arc<dyn DatasetBackend>,
    active_tool: ToolId,
    variant: Option<String>,
    tool_state: ToolState,
    dataset: DatasetState,
    selected: Option<PathBuf>,
    caption: String,
    caption_prefix: String,
    pending: Option<PendingRequest>,
    notifications: Notifications,
    dropped: Rc<RefCell<Vec<PathBuf>>>,
    _drop_subscription: Option<DropSubscription>,
    invalidated: Vec<Invalidation>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("active_tool", &self.active_tool)
            .field("tool_state", &self.tool_state)
            .field("selected", &self.selected)
            .field("running", &self.pending.as_ref().map(|p| (&p.kind, p.id)))
            .finish()
    }
}

impl Editor {
    /// Create an editor and request the backend's current dataset.
    pub fn new(backend: Arc<dyn DatasetBackend>) -> Self {
        let mut editor = Self {
            backend,
            active_tool: ToolId::View,
            variant: None,
            tool_state: ToolState::init(ToolId::View, None),
            dataset: DatasetState::default(),
            selected: None,
            caption: String::new(),
            caption_prefix: String::new(),
            pending: None,
            notifications: Notifications::default(),
            dropped: Rc::new(RefCell::new(Vec::new())),
            _drop_subscription: None,
            invalidated: Vec::new(),
        };
        editor.refresh();
        editor
    }

    /// Queue files dropped on the window for import. Replaces any earlier hub.
    pub fn attach_drops(&mut self, hub: &DropHub) {
        let queue = self.dropped.clone();
        self._drop_subscription = Some(hub.subscribe(move |paths| queue.borrow_mut().extend_from_slice(paths)));
    }

    // Tools

    pub fn active_tool(&self) -> ToolId {
        self.active_tool
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.tool_state
    }

    /// Activate `id`, discarding the previous tool's state. Re-selecting the active
    /// tool only switches its variant.
    pub fn switch_tool(&mut self, id: ToolId, variant: Option<&str>) {
        if id == self.active_tool {
            if let Some(variant) = variant {
                self.select_variant(variant);
            }
            return;
        }
        log::info!("Tool: {} -> {}", self.active_tool.as_str(), id.as_str());
        self.active_tool = id;
        self.variant = variant.map(str::to_owned);
        self.tool_state = ToolState::init(id, variant);
    }

    /// Change the active tool's sub-mode, keeping the rest of its state.
    pub fn select_variant(&mut self, variant: &str) {
        if let Some(state) = self.tool_state.select_variant(variant) {
            log::info!("{} variant: {variant}", self.active_tool.as_str());
            self.tool_state = state;
        }
        self.variant = Some(variant.to_owned());
    }

    /// Install a state produced by the canvas or an options panel.
    pub fn set_tool_state(&mut self, state: ToolState) {
        if state.id() != self.active_tool {
            log::warn!("Ignoring {} state while {} is active", state.id().as_str(), self.active_tool.as_str());
            return;
        }
        self.tool_state = state;
    }

    /// Discard the active tool's edits.
    pub fn reset(&mut self) {
        self.tool_state = ToolState::init(self.active_tool, self.variant.as_deref());
    }

    // Dataset and selection

    pub fn dataset(&self) -> &DatasetState {
        &self.dataset
    }

    pub fn items(&self) -> &[DatasetItem] {
        &self.dataset.items
    }

    pub fn selected(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    /// Select an item, loading its caption and dropping unapplied tool edits.
    pub fn select(&mut self, image: Option<PathBuf>) {
        if image == self.selected {
            return;
        }
        if let Some(image) = &image {
            log::debug!("Selected {}", image.display());
        }
        self.caption = image
            .as_deref()
            .and_then(|path| self.dataset.item(path))
            .map(|item| item.caption_str.clone())
            .unwrap_or_default();
        self.selected = image;
        self.reset();
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn caption_mut(&mut self) -> &mut String {
        &mut self.caption
    }

    pub fn caption_prefix_mut(&mut self) -> &mut String {
        &mut self.caption_prefix
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Images whose cached pixels no longer match the dataset, since the last call
    pub fn take_invalidated(&mut self) -> Vec<Invalidation> {
        std::mem::take(&mut self.invalidated)
    }

    // Requests

    /// Whether a save or batch request is in flight
    pub fn running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn running_kind(&self) -> Option<&RequestKind> {
        self.pending.as_ref().map(|pending| &pending.kind)
    }

    fn can_start(&mut self) -> bool {
        if let Some(pending) = &self.pending {
            log::warn!("{:?} request {} still running", pending.kind, pending.id);
            self.notifications.info(BackendError::Busy.to_string());
            return false;
        }
        true
    }

    fn start(&mut self, kind: RequestKind, future: BoxFuture<'static, Outcome>) {
        let id = Uuid::new_v4();
        log::info!("{kind:?} request {id} sent");
        self.pending = Some(PendingRequest {
            id,
            kind,
            target: self.selected.clone(),
            future,
        });
    }

    fn start_state_request(
        &mut self,
        kind: RequestKind,
        request: impl FnOnce(&dyn DatasetBackend) -> BoxFuture<'static, BackendResult<DatasetState>>,
    ) {
        if !self.can_start() {
            return;
        }
        let future = request(self.backend.as_ref()).map(Outcome::State).boxed();
        self.start(kind, future);
    }

    /// The payload Apply would send for the current selection
    pub fn save_request(&self) -> Option<SaveRequest> {
        Some(SaveRequest {
            tool: self.tool_state.get_data(),
            current: self.selected.clone()?,
            caption: self.caption.clone(),
            caption_prefix: self.caption_prefix.clone(),
        })
    }

    /// Send the active tool's edit and the caption edits for the selected item.
    pub fn apply(&mut self) {
        let Some(request) = self.save_request() else {
            self.notifications.info("Nothing selected");
            return;
        };
        if !self.can_start() {
            return;
        }
        let backend = self.backend.clone();
        let future = self
            .backend
            .save(request)
            .then(move |result| async move {
                let next = result?;
                let state = backend.get_state().await?;
                Ok::<_, BackendError>((next, state))
            })
            .map(Outcome::Saved)
            .boxed();
        self.start(RequestKind::Save, future);
    }

    pub fn run_batch(&mut self, operation: BatchOperation) {
        let name = operation.name();
        self.start_state_request(RequestKind::Batch(name), move |backend| backend.batch_operation(operation));
    }

    pub fn refresh(&mut self) {
        self.start_state_request(RequestKind::Refresh, |backend| backend.get_state());
    }

    pub fn open_folder(&mut self, folder: PathBuf) {
        self.start_state_request(RequestKind::OpenFolder, move |backend| backend.open_folder(folder));
    }

    pub fn close_folder(&mut self) {
        self.start_state_request(RequestKind::CloseFolder, |backend| backend.close_folder());
    }

    pub fn delete_selected(&mut self) {
        let Some(image) = self.selected.clone() else {
            return;
        };
        self.start_state_request(RequestKind::Delete, move |backend| backend.delete_item(image));
    }

    /// Drive the in-flight request and start queued imports. Call once per frame.
    pub fn poll(&mut self) {
        if self.pending.is_none() && !self.dropped.borrow().is_empty() {
            let paths = std::mem::take(&mut *self.dropped.borrow_mut());
            self.start_state_request(RequestKind::Import, move |backend| backend.on_drag(paths));
        }

        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let Poll::Ready(outcome) = pending.future.poll_unpin(&mut cx) else {
            return;
        };
        if let Some(pending) = self.pending.take() {
            self.finish(pending, outcome);
        }
    }

    fn finish(&mut self, pending: PendingRequest, outcome: Outcome) {
        let PendingRequest { id, kind, target, .. } = pending;
        match outcome {
            Outcome::Saved(Ok((next, state))) => {
                if let Some(target) = &target {
                    self.invalidated.push(Invalidation::Image(target.clone()));
                }
                // decided before adopting the snapshot, which may no longer list the target
                let navigated_away = target != self.selected;
                self.set_dataset(state);
                if navigated_away {
                    log::info!("Save {id} finished after the selection changed, result discarded");
                    return;
                }
                log::info!("Save {id} done, next: {next:?}");
                self.notifications.success("Saved");
                self.reset();
                if next.is_some() {
                    self.select(next);
                }
                self.reload_caption();
            }
            Outcome::State(Ok(state)) => {
                log::info!("{kind:?} request {id} done");
                self.set_dataset(state);
                self.reload_caption();
                match kind {
                    RequestKind::Batch(name) => {
                        self.invalidated.push(Invalidation::All);
                        self.notifications.success(format!("{name} done"));
                    }
                    RequestKind::Refresh => self.invalidated.push(Invalidation::All),
                    _ => {}
                }
            }
            Outcome::Saved(Err(err)) | Outcome::State(Err(err)) => {
                log::error!("{kind:?} request {id} failed: {err}");
                self.notifications.error(err.to_string());
            }
        }
    }

    /// Adopt a fresh snapshot, keeping the selection if the item still exists.
    fn set_dataset(&mut self, state: DatasetState) {
        self.caption_prefix = state.caption_prefix.clone();
        self.dataset = state;
        let still_there = self.selected.as_deref().is_some_and(|path| self.dataset.item(path).is_some());
        if !still_there {
            let first = self.dataset.items.first().map(|item| item.image.clone());
            self.select(first);
        }
    }

    fn reload_caption(&mut self) {
        if let Some(item) = self.selected.as_deref().and_then(|path| self.dataset.item(path)) {
            self.caption = item.caption_str.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::tools::{SplitMode, ToolData};

    fn editor() -> (MemoryBackend, Editor) {
        let backend = MemoryBackend::with_images(["a.png", "b.png"].map(PathBuf::from));
        let mut editor = Editor::new(Arc::new(backend.clone()));
        editor.poll();
        (backend, editor)
    }

    #[test]
    fn first_item_is_selected_after_the_initial_refresh() {
        let (_, editor) = editor();
        assert!(!editor.running());
        assert_eq!(editor.selected(), Some(Path::new("a.png")));
    }

    #[test]
    fn only_one_request_runs_at_a_time() {
        let (backend, mut editor) = editor();
        editor.apply();
        assert!(editor.running());
        editor.run_batch(BatchOperation::DedupTags);
        assert_eq!(editor.running_kind(), Some(&RequestKind::Save));
        assert!(backend.operations().is_empty());

        editor.poll();
        assert!(!editor.running());
    }

    #[test]
    fn variant_switch_keeps_split_point() {
        let (_, mut editor) = editor();
        editor.switch_tool(ToolId::Split, None);
        let ToolState::Split(mut split) = editor.tool_state().clone() else {
            panic!("expected split");
        };
        split.split_point = Some(egui::pos2(10.0, 20.0));
        editor.set_tool_state(ToolState::Split(split));

        editor.switch_tool(ToolId::Split, Some("vertical"));
        let ToolState::Split(split) = editor.tool_state() else {
            panic!("expected split");
        };
        assert_eq!(split.mode, SplitMode::Vertical);
        assert_eq!(split.split_point, Some(egui::pos2(10.0, 20.0)));
    }

    #[test]
    fn failed_save_keeps_state_and_clears_running() {
        let (backend, mut editor) = editor();
        editor.switch_tool(ToolId::Trim, None);
        let ToolState::Trim(mut trim) = editor.tool_state().clone() else {
            panic!("expected trim");
        };
        trim.insets.top = 12.0;
        editor.set_tool_state(ToolState::Trim(trim));

        backend.fail_next(BackendError::Io("disk full".into()));
        editor.apply();
        editor.poll();

        assert!(!editor.running());
        assert_eq!(editor.selected(), Some(Path::new("a.png")));
        assert!(matches!(editor.tool_state().get_data(), Some(ToolData::Trim { top: 12, .. })));
        assert_eq!(editor.notifications.toasts().len(), 1);
    }

    #[test]
    fn successful_save_invalidates_the_saved_image() {
        let (_, mut editor) = editor();
        editor.take_invalidated();
        editor.apply();
        editor.poll();
        assert_eq!(editor.take_invalidated(), vec![Invalidation::Image(PathBuf::from("a.png"))]);
        assert_eq!(editor.selected(), Some(Path::new("b.png")));
        assert!(editor.take_invalidated().is_empty());
    }

    #[test]
    fn state_from_another_tool_is_ignored() {
        let (_, mut editor) = editor();
        editor.switch_tool(ToolId::Brush, None);
        editor.set_tool_state(ToolState::init(ToolId::Rect, None));
        assert_eq!(editor.tool_state().id(), ToolId::Brush);
    }
}
