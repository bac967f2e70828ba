//! Transient notifications
//!
//! Pages report fetch and mutation outcomes through the [`Toaster`] found in
//! context. Toasts dismiss themselves after [`TOAST_TTL`]; at most
//! [`MAX_TOASTS`] are shown, oldest dropped first.

use std::time::Duration;

use leptos::*;

use super::icons::{Icon, IconKind};

pub const TOAST_TTL: Duration = Duration::from_secs(4);
pub const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn class(&self) -> &'static str {
        match self {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
        }
    }

    fn icon(&self) -> IconKind {
        match self {
            ToastKind::Success => IconKind::CheckCircle,
            ToastKind::Error => IconKind::Alert,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Ordered queue of visible toasts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastQueue {
    items: Vec<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast {
            id,
            kind,
            message: message.into(),
        });
        if self.items.len() > MAX_TOASTS {
            let overflow = self.items.len() - MAX_TOASTS;
            self.items.drain(..overflow);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

/// Notification handle shared through context
#[derive(Debug, Clone, Copy)]
pub struct Toaster {
    queue: RwSignal<ToastQueue>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            queue: create_rw_signal(ToastQueue::default()),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(ToastKind::Error, message.into());
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.update(|q| q.dismiss(id));
    }

    fn show(&self, kind: ToastKind, message: String) {
        let mut id = 0;
        self.queue.update(|q| id = q.push(kind, message));

        let queue = self.queue;
        set_timeout(move || queue.update(|q| q.dismiss(id)), TOAST_TTL);
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the toaster and put it into context
pub fn provide_toaster() -> Toaster {
    let toaster = Toaster::new();
    provide_context(toaster);
    toaster
}

pub fn use_toaster() -> Toaster {
    expect_context::<Toaster>()
}

/// Toast stack rendered once at the application root
#[component]
pub fn Toasts() -> impl IntoView {
    let toaster = use_toaster();
    let queue = toaster.queue;

    view! {
        <div class="toasts" role="region" aria-live="polite" aria-label="Notifications">
            <For
                each=move || queue.with(|q| q.items().to_vec())
                key=|t| t.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=toast.kind.class() role="status">
                            <Icon kind=toast.kind.icon()/>
                            <span class="toast-message">{toast.message}</span>
                            <button
                                class="toast-close"
                                aria-label="Dismiss notification"
                                on:click=move |_| toaster.dismiss(id)
                            >
                                <Icon kind=IconKind::Close class="icon-sm"/>
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_push_and_dismiss() {
        let mut queue = ToastQueue::default();
        let first = queue.push(ToastKind::Error, "in use");
        let second = queue.push(ToastKind::Success, "Deleted a.json");
        assert_ne!(first, second);
        assert_eq!(queue.items().len(), 2);
        assert_eq!(queue.items()[0].message, "in use");

        queue.dismiss(first);
        assert_eq!(queue.items().len(), 1);
        assert_eq!(queue.items()[0].id, second);

        queue.dismiss(999);
        assert_eq!(queue.items().len(), 1);
    }

    #[test]
    fn test_queue_drops_oldest_past_limit() {
        let mut queue = ToastQueue::default();
        for i in 0..(MAX_TOASTS + 2) {
            queue.push(ToastKind::Success, format!("toast {}", i));
        }
        assert_eq!(queue.items().len(), MAX_TOASTS);
        assert_eq!(queue.items()[0].message, "toast 2");
    }
}
