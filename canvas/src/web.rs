//! Browser host: binds a `<canvas>` and a relay WebSocket to the engine.
//!
//! DOM listeners reduce events to [`PointerSample`]s, hand them to the
//! engine, and carry out the returned [`Action`]s. Text messages from the
//! socket are applied as remote frames. Dropping the app removes every
//! listener and closes the socket.

use std::cell::RefCell;
use std::rc::Rc;

use frames::{Frame, Tool, encode_frame};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, HtmlCanvasElement, MessageEvent, MouseEvent, TouchEvent, WebSocket};

use crate::dom::{Canvas2dSurface, mouse_sample, touch_sample};
use crate::engine::{Action, EngineCore};
use crate::input::PointerSample;

/// Install the panic hook and route `log` to the browser console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("logger already installed: {e}")));
    }
}

struct Shared {
    engine: EngineCore<Canvas2dSurface>,
    socket: WebSocket,
}

type Listener = Closure<dyn FnMut(Event)>;

/// A whiteboard bound to one canvas element and one relay connection.
#[wasm_bindgen]
pub struct WhiteboardApp {
    shared: Rc<RefCell<Shared>>,
    canvas: HtmlCanvasElement,
    listeners: Vec<(&'static str, Listener)>,
    onmessage: Option<Closure<dyn FnMut(MessageEvent)>>,
    socket_handlers: Vec<Listener>,
}

#[wasm_bindgen]
impl WhiteboardApp {
    /// Bind `canvas` and connect to the relay at `url`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, url: &str) -> Result<WhiteboardApp, JsValue> {
        let surface = Canvas2dSurface::new(canvas.clone()).map_err(to_js)?;
        let socket = WebSocket::new(url)?;
        let shared = Rc::new(RefCell::new(Shared { engine: EngineCore::new(surface), socket: socket.clone() }));

        let mut app = WhiteboardApp {
            shared,
            canvas,
            listeners: Vec::new(),
            onmessage: None,
            socket_handlers: Vec::new(),
        };
        app.bind_pointer_listeners()?;
        app.bind_socket(&socket, url);
        Ok(app)
    }

    pub fn select_tool(&self, name: &str) -> Result<(), JsValue> {
        let tool: Tool = name.parse().map_err(to_js)?;
        with_shared(&self.shared, |s| s.engine.select_tool(tool));
        Ok(())
    }

    pub fn select_color(&self, color: &str) {
        with_shared(&self.shared, |s| s.engine.select_color(color));
    }

    /// Apply the raw value of the width control. Returns `false` if ignored.
    pub fn set_width(&self, raw: &str) -> bool {
        with_shared(&self.shared, |s| s.engine.set_width_input(raw)).unwrap_or(false)
    }

    pub fn clear_canvas(&self) {
        with_shared(&self.shared, |s| {
            let actions = s.engine.clear_canvas();
            perform(s, actions, None);
        });
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<(), JsValue> {
        with_shared(&self.shared, |s| s.engine.resize(width, height))
            .unwrap_or(Ok(()))
            .map_err(to_js)
    }

    /// Name of the active tool, for the selection indicator.
    #[must_use]
    pub fn tool(&self) -> String {
        with_shared(&self.shared, |s| s.engine.tools().tool().to_string()).unwrap_or_default()
    }

    /// Active color, for the selection indicator.
    #[must_use]
    pub fn color(&self) -> String {
        with_shared(&self.shared, |s| s.engine.tools().color().to_owned()).unwrap_or_default()
    }
}

impl WhiteboardApp {
    fn bind_pointer_listeners(&mut self) -> Result<(), JsValue> {
        let canvas = self.canvas.clone();

        self.listen("mousedown", |s, ev| {
            let actions = mouse(ev).map(|m| s.engine.on_pointer_down(&m)).unwrap_or_default();
            perform(s, actions, Some(ev));
        })?;
        self.listen("mousemove", |s, ev| {
            let actions = mouse(ev).map(|m| s.engine.on_pointer_move(&m)).unwrap_or_default();
            perform(s, actions, Some(ev));
        })?;
        self.listen("mouseup", |s, _| s.engine.on_pointer_up())?;
        self.listen("mouseout", |s, _| s.engine.on_pointer_leave())?;

        let down_canvas = canvas.clone();
        self.listen("touchstart", move |s, ev| {
            let actions = touch(ev, &down_canvas).map(|t| s.engine.on_pointer_down(&t)).unwrap_or_default();
            perform(s, actions, Some(ev));
        })?;
        self.listen("touchmove", move |s, ev| {
            let actions = touch(ev, &canvas).map(|t| s.engine.on_pointer_move(&t)).unwrap_or_default();
            perform(s, actions, Some(ev));
        })?;
        self.listen("touchend", |s, _| s.engine.on_pointer_up())?;
        self.listen("touchcancel", |s, _| s.engine.on_touch_cancel())?;
        Ok(())
    }

    /// Register a non-passive canvas listener, so touch handlers may cancel
    /// scrolling.
    fn listen(
        &mut self,
        kind: &'static str,
        mut handler: impl FnMut(&mut Shared, &Event) + 'static,
    ) -> Result<(), JsValue> {
        let shared = Rc::clone(&self.shared);
        let closure = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            with_shared(&shared, |s| handler(s, &ev));
        });
        let opts = AddEventListenerOptions::new();
        opts.set_passive(false);
        self.canvas.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &opts,
        )?;
        self.listeners.push((kind, closure));
        Ok(())
    }

    fn bind_socket(&mut self, socket: &WebSocket, url: &str) {
        let shared = Rc::clone(&self.shared);
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            let Some(text) = ev.data().as_string() else {
                log::debug!("socket: ignoring non-text message");
                return;
            };
            let applied = with_shared(&shared, |s| s.engine.apply_remote_text(&text));
            if let Some(Err(e)) = applied {
                log::warn!("socket: failed to apply frame: {e}");
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let open_url = url.to_owned();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            log::info!("socket: connected to {open_url}");
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let onclose = Closure::<dyn FnMut(Event)>::new(move |_| {
            log::warn!("socket: connection closed");
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        self.onmessage = Some(onmessage);
        self.socket_handlers.extend([onopen, onclose]);
    }
}

impl Drop for WhiteboardApp {
    fn drop(&mut self) {
        for (kind, closure) in self.listeners.drain(..) {
            if let Err(e) = self.canvas.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
                log::warn!("failed to remove {kind} listener: {e:?}");
            }
        }
        if let Ok(shared) = self.shared.try_borrow() {
            shared.socket.set_onmessage(None);
            shared.socket.set_onopen(None);
            shared.socket.set_onclose(None);
            if let Err(e) = shared.socket.close() {
                log::warn!("failed to close socket: {e:?}");
            }
        }
        // Detached above, so the closures can go now.
        drop(self.onmessage.take());
        self.socket_handlers.clear();
    }
}

// =============================================================
// Helpers
// =============================================================

/// Run `f` against the shared state, or log and skip if it is already
/// borrowed by an outer handler.
fn with_shared<R>(shared: &Rc<RefCell<Shared>>, f: impl FnOnce(&mut Shared) -> R) -> Option<R> {
    match shared.try_borrow_mut() {
        Ok(mut guard) => Some(f(&mut guard)),
        Err(_) => {
            log::warn!("whiteboard state busy; event dropped");
            None
        }
    }
}

fn perform(shared: &Shared, actions: Vec<Action>, ev: Option<&Event>) {
    for action in actions {
        match action {
            Action::Emit(frame) => send(&shared.socket, &frame),
            Action::SuppressScroll => {
                if let Some(ev) = ev {
                    ev.prevent_default();
                }
            }
        }
    }
}

/// Fire-and-forget send; a socket that is not open drops the frame.
fn send(socket: &WebSocket, frame: &Frame) {
    if socket.ready_state() != WebSocket::OPEN {
        log::debug!("socket not open; dropping {} frame", frame.event);
        return;
    }
    if let Err(e) = socket.send_with_str(&encode_frame(frame)) {
        log::warn!("socket send failed: {e:?}");
    }
}

fn mouse(ev: &Event) -> Option<PointerSample> {
    ev.dyn_ref::<MouseEvent>().map(mouse_sample)
}

fn touch(ev: &Event, canvas: &HtmlCanvasElement) -> Option<PointerSample> {
    ev.dyn_ref::<TouchEvent>().map(|t| touch_sample(t, canvas))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
