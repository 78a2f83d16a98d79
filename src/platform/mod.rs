//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time
//! - Frame scheduling
//! - Input events and listener lifetimes
//! - Page lifecycle
//! - Storage (LocalStorage on web)

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod listeners;
pub mod scheduler;
pub mod storage;

pub use listeners::{ListenerSet, ListenerTarget};
pub use scheduler::{FrameScheduler, ManualScheduler};

/// How the page is being left, from the `persisted` flag of `pagehide`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageExit {
    /// Going into the back/forward cache; the same page may be shown again
    Cached,
    /// Unloaded for good
    Unloaded,
}

impl PageExit {
    pub fn from_persisted(persisted: bool) -> Self {
        if persisted {
            PageExit::Cached
        } else {
            PageExit::Unloaded
        }
    }

    /// A cached page keeps its loop and listeners for when it is shown again
    pub fn releases_runtime(self) -> bool {
        self == PageExit::Unloaded
    }
}

/// Wall-clock time in milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock time in milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
