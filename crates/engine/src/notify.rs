//! Notifier seam for user-facing notices.
//!
//! Delivery (toast, websocket, whatever the shell provides) is outside the
//! engine; the engine only fans completed operations out to this trait,
//! fire-and-forget.

use std::sync::Mutex;

use deskflow_core::{Notice, NoticeKind};

/// Receives notices produced by engine operations.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Default notifier: logs every notice through `tracing`.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.kind {
            NoticeKind::Warning | NoticeKind::Error => {
                tracing::warn!(title = %notice.title, body = %notice.body, "User notice");
            }
            NoticeKind::Info | NoticeKind::Success => {
                tracing::info!(title = %notice.title, body = %notice.body, "User notice");
            }
        }
    }
}

/// Collects notices for assertions in tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
