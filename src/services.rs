//! Process-wide collaborators handed to the canvas and editor at construction.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::image_cache::{FsImageSource, ImageSource};

type DropHandler = Box<dyn FnMut(&[PathBuf])>;

#[derive(Default)]
struct Handlers {
    next_id: u64,
    entries: Vec<(u64, DropHandler)>,
}

/// Broadcasts files dropped onto the window to every live subscriber.
#[derive(Clone, Default)]
pub struct DropHub {
    handlers: Rc<RefCell<Handlers>>,
}

impl std::fmt::Debug for DropHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropHub")
            .field("handlers", &format!("<{} handlers>", self.subscriber_count()))
            .finish()
    }
}

impl DropHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`; it stays registered until the returned guard is dropped.
    #[must_use = "the handler is removed when the subscription is dropped"]
    pub fn subscribe(&self, handler: impl FnMut(&[PathBuf]) + 'static) -> DropSubscription {
        let mut handlers = self.handlers.borrow_mut();
        let id = handlers.next_id;
        handlers.next_id += 1;
        handlers.entries.push((id, Box::new(handler)));
        DropSubscription {
            hub: Rc::downgrade(&self.handlers),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().entries.len()
    }

    pub fn emit(&self, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        log::info!("{} file(s) dropped", paths.len());
        for (_, handler) in &mut self.handlers.borrow_mut().entries {
            handler(paths);
        }
    }

    /// Forward this frame's dropped files, if any.
    pub fn poll(&self, ctx: &egui::Context) {
        let paths: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        self.emit(&paths);
    }
}

/// Keeps a [`DropHub`] handler registered while alive.
pub struct DropSubscription {
    hub: Weak<RefCell<Handlers>>,
    id: u64,
}

impl Drop for DropSubscription {
    fn drop(&mut self) {
        if let Some(handlers) = self.hub.upgrade() {
            handlers.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Collaborators shared by the canvas and the editor
#[derive(Clone)]
pub struct Services {
    pub image_source: Rc<dyn ImageSource>,
    pub drops: DropHub,
}

impl Default for Services {
    fn default() -> Self {
        Self::new(Rc::new(FsImageSource))
    }
}

impl Services {
    pub fn new(image_source: Rc<dyn ImageSource>) -> Self {
        Self {
            image_source,
            drops: DropHub::new(),
        }
    }
}
