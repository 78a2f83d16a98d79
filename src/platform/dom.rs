//! Browser input bindings
//!
//! Keyboard listeners live on the window, touch listeners on the canvas.
//! Handlers only write into the app's [`InputAdapter`](crate::InputAdapter);
//! the game reads the resolved intent on its next tick.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, TouchEvent};

use super::listeners::{ListenerSet, ListenerTarget};
use crate::app::GameApp;

pub type DomCallback = Closure<dyn FnMut(Event)>;

impl ListenerTarget for EventTarget {
    type Callback = DomCallback;
    type Error = JsValue;

    fn add_listener(&self, kind: &'static str, callback: &DomCallback) -> Result<(), JsValue> {
        self.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
    }

    fn remove_listener(&self, kind: &'static str, callback: &DomCallback) {
        let _ = self.remove_event_listener_with_callback(kind, callback.as_ref().unchecked_ref());
    }
}

/// DOM listeners owned by Rust; dropping the set unregisters them
pub type DomListeners = ListenerSet<EventTarget>;

impl ListenerSet<EventTarget> {
    /// Wrap `handler` in a closure and register it
    pub fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        self.add(target, kind, Closure::<dyn FnMut(Event)>::new(handler))
    }
}

/// Game input listeners; dropping the bindings unregisters them
pub struct InputBindings {
    listeners: DomListeners,
}

impl InputBindings {
    pub fn attach(canvas: &HtmlCanvasElement, app: Rc<RefCell<GameApp>>) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let mut bindings = Self {
            listeners: DomListeners::new(),
        };

        // Keyboard
        {
            let app = app.clone();
            bindings.listeners.listen(&window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let consumed = app
                    .borrow_mut()
                    .input_mut()
                    .key_down(&event.key(), event.repeat());
                if consumed {
                    event.prevent_default();
                }
            })?;
        }
        {
            let app = app.clone();
            bindings.listeners.listen(&window, "keyup", move |event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    app.borrow_mut().input_mut().key_up(&event.key());
                }
            })?;
        }

        // Touch drag
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            bindings.listeners.listen(canvas, "touchstart", move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                let mut a = app.borrow_mut();
                let x = touch_x(&canvas_clone, event, a.tuning().playfield_width);
                let player_x = a.state().player.pos.x;
                a.input_mut().touch_start(x, player_x);
            })?;
        }
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            bindings.listeners.listen(canvas, "touchmove", move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                event.prevent_default();
                let mut a = app.borrow_mut();
                let x = touch_x(&canvas_clone, event, a.tuning().playfield_width);
                a.input_mut().touch_move(x);
            })?;
        }
        for kind in ["touchend", "touchcancel"] {
            let app = app.clone();
            bindings.listeners.listen(canvas, kind, move |event| {
                event.prevent_default();
                app.borrow_mut().input_mut().touch_end();
            })?;
        }

        // Auto-pause when the page goes away
        {
            let app = app.clone();
            let document_clone = document.clone();
            bindings.listeners.listen(&document, "visibilitychange", move |_event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    suspend(&app, "tab hidden");
                }
            })?;
        }
        bindings.listeners.listen(&window, "blur", move |_event| suspend(&app, "window blur"))?;

        log::info!("Input bindings attached ({} listeners)", bindings.listeners.len());
        Ok(bindings)
    }
}

impl Drop for InputBindings {
    fn drop(&mut self) {
        self.listeners.clear();
        log::info!("Input bindings detached");
    }
}

fn suspend(app: &Rc<RefCell<GameApp>>, reason: &str) {
    if app.borrow_mut().suspend() {
        log::info!("Auto-paused ({reason})");
    }
}

/// First touch point in playfield coordinates. `None` when the event has no
/// touch or the canvas has no layout size.
fn touch_x(canvas: &HtmlCanvasElement, event: &TouchEvent, playfield_width: f32) -> Option<f32> {
    let touch = event.touches().get(0)?;
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 {
        return None;
    }
    let scale = playfield_width as f64 / rect.width();
    Some(((touch.client_x() as f64 - rect.left()) * scale) as f32)
}
