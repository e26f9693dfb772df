use egui::{Align2, Color32, Context, RichText};

const TOAST_SECONDS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    fn color(&self) -> Color32 {
        match self {
            ToastKind::Info => Color32::LIGHT_BLUE,
            ToastKind::Success => Color32::LIGHT_GREEN,
            ToastKind::Error => Color32::from_rgb(255, 110, 110),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
    /// UI time of the first frame the toast was shown
    shown_at: Option<f64>,
}

/// Transient messages in the bottom-right corner.
///
/// Toasts may be pushed from anywhere; their lifetime starts at the first frame
/// they are drawn.
#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn push(&mut self, kind: ToastKind, text: impl Into<String>) {
        self.toasts.push(Toast {
            kind,
            text: text.into(),
            shown_at: None,
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(ToastKind::Error, text);
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Stamp new toasts with `now` and drop the expired ones.
    pub fn prune(&mut self, now: f64) {
        for toast in &mut self.toasts {
            toast.shown_at.get_or_insert(now);
        }
        self.toasts
            .retain(|toast| toast.shown_at.is_some_and(|at| now - at < TOAST_SECONDS));
    }

    pub fn show(&mut self, ctx: &Context) {
        self.prune(ctx.input(|i| i.time));
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(RichText::new(&toast.text).color(toast.kind.color()));
                    });
                }
            });
        // keep frames coming until the last toast expires
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_their_first_frame() {
        let mut notifications = Notifications::default();
        notifications.error("save failed");

        notifications.prune(100.0);
        assert_eq!(notifications.toasts().len(), 1);
        notifications.prune(103.9);
        assert_eq!(notifications.toasts().len(), 1);
        notifications.prune(104.0);
        assert!(notifications.is_empty());
    }

    #[test]
    fn late_toasts_get_their_own_clock() {
        let mut notifications = Notifications::default();
        notifications.info("first");
        notifications.prune(0.0);
        notifications.success("second");
        notifications.prune(5.0);
        assert_eq!(notifications.toasts().len(), 1);
        assert_eq!(notifications.toasts()[0].kind, ToastKind::Success);
    }
}
