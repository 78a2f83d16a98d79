//! Frame scheduling
//!
//! The game advances once per display refresh. [`FrameScheduler`] hides where
//! refreshes come from: `requestAnimationFrame` in the browser, an explicit
//! [`ManualScheduler::advance`] in tests and headless runs.

/// Per-frame callback, receives the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnMut(f64)>;

/// Drives one callback per display refresh until stopped
pub trait FrameScheduler {
    /// Start calling `callback` every refresh, replacing any previous callback
    fn start(&mut self, callback: FrameCallback);

    /// Cancel the pending refresh and drop the callback
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Scheduler stepped by hand with a fixed frame interval
pub struct ManualScheduler {
    callback: Option<FrameCallback>,
    frame_ms: f64,
    time_ms: f64,
}

impl ManualScheduler {
    /// 60 Hz refresh
    pub const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn new(frame_ms: f64) -> Self {
        Self {
            callback: None,
            frame_ms,
            time_ms: 0.0,
        }
    }

    /// Fire up to `frames` refreshes; returns how many ran
    pub fn advance(&mut self, frames: u32) -> u32 {
        let Some(callback) = self.callback.as_mut() else {
            return 0;
        };
        for _ in 0..frames {
            self.time_ms += self.frame_ms;
            callback(self.time_ms);
        }
        frames
    }

    /// Timestamp of the last fired refresh
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FRAME_MS)
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, callback: FrameCallback) {
        self.callback = Some(callback);
    }

    fn stop(&mut self) {
        self.callback = None;
    }

    fn is_running(&self) -> bool {
        self.callback.is_some()
    }
}

#[cfg(target_arch = "wasm32")]
pub use raf::AnimationFrameScheduler;

#[cfg(target_arch = "wasm32")]
mod raf {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{FrameCallback, FrameScheduler};

    #[derive(Default)]
    struct RafState {
        closure: Option<Closure<dyn FnMut(f64)>>,
        handle: Option<i32>,
    }

    /// `requestAnimationFrame` loop
    #[derive(Default)]
    pub struct AnimationFrameScheduler {
        state: Rc<RefCell<RafState>>,
    }

    impl AnimationFrameScheduler {
        pub fn new() -> Self {
            Self::default()
        }
    }

    /// Queue the stored closure for the next refresh (no-op once stopped)
    fn request_next(state: &Rc<RefCell<RafState>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window - frame loop halted");
            return;
        };
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        let Some(closure) = s.closure.as_ref() else {
            return;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => s.handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    impl FrameScheduler for AnimationFrameScheduler {
        fn start(&mut self, mut callback: FrameCallback) {
            self.stop();

            let weak = Rc::downgrade(&self.state);
            let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                let Some(state) = weak.upgrade() else { return };
                state.borrow_mut().handle = None;
                callback(time);
                request_next(&state);
            });
            self.state.borrow_mut().closure = Some(closure);
            request_next(&self.state);
            log::info!("Frame loop started");
        }

        fn stop(&mut self) {
            let mut state = self.state.borrow_mut();
            if let Some(handle) = state.handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
            if state.closure.take().is_some() {
                log::info!("Frame loop stopped");
            }
        }

        fn is_running(&self) -> bool {
            self.state.borrow().closure.is_some()
        }
    }

    impl Drop for AnimationFrameScheduler {
        fn drop(&mut self) {
            self.stop();
        }
    }
}
