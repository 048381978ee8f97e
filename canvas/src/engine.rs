//! Client engine: input, tool state and a surface behind one event API.
//!
//! DESIGN
//! ======
//! The engine never touches the network. Host events (pointer samples, UI
//! control changes) go in; [`Action`]s come out for the host to carry out.
//! Frames received from the relay are fed back in through
//! [`EngineCore::apply_remote`]. Local and remote segments are drawn by the
//! same [`render::draw_segment`] call.
//!
//! LIFECYCLE
//! =========
//! pointer down (with a position) starts a stroke; each move while drawing
//! renders one segment, emits it and advances the last position; up, leave
//! and touch-cancel end the stroke.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use frames::{EventKind, Frame, Tool, decode_frame};

use crate::input::{InputState, PointerSample, get_pos};
use crate::render;
use crate::surface::{Surface, SurfaceError};
use crate::ui::ToolState;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this frame to the relay.
    Emit(Frame),
    /// Cancel the browser's default handling of the current touch event.
    SuppressScroll,
}

/// Core engine state, generic over the surface so it runs without a browser.
pub struct EngineCore<S: Surface> {
    surface: S,
    tools: ToolState,
    input: InputState,
}

impl<S: Surface> EngineCore<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            tools: ToolState::default(),
            input: InputState::default(),
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    #[must_use]
    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    #[must_use]
    pub fn input(&self) -> InputState {
        self.input
    }

    // --- Pointer input ---

    /// Start a stroke at the sample's position. A sample without a position
    /// leaves the engine idle.
    pub fn on_pointer_down(&mut self, sample: &PointerSample) -> Vec<Action> {
        if let Some(pos) = get_pos(sample) {
            self.input = InputState::Drawing { last: pos };
        }
        Vec::new()
    }

    /// Extend the stroke to the sample's position: render one segment
    /// locally and emit it.
    pub fn on_pointer_move(&mut self, sample: &PointerSample) -> Vec<Action> {
        let Some(last) = self.input.last() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if sample.is_touch() {
            actions.push(Action::SuppressScroll);
        }
        let Some(current) = get_pos(sample) else {
            return actions;
        };

        let segment = self.tools.segment(last, current);
        if let Err(e) = render::draw_segment(&mut self.surface, &segment) {
            log::warn!("engine: local render failed: {e}");
        }
        actions.push(Action::Emit(Frame::drawing(&segment)));
        self.input = InputState::Drawing { last: current };
        actions
    }

    pub fn on_pointer_up(&mut self) {
        self.input = InputState::Idle;
    }

    pub fn on_pointer_leave(&mut self) {
        self.input = InputState::Idle;
    }

    pub fn on_touch_cancel(&mut self) {
        self.input = InputState::Idle;
    }

    // --- UI controls ---

    pub fn select_tool(&mut self, tool: Tool) {
        self.tools.select_tool(tool);
    }

    pub fn select_color(&mut self, color: &str) {
        self.tools.select_color(color);
    }

    /// Apply raw width-control text. Returns whether the width changed.
    pub fn set_width_input(&mut self, raw: &str) -> bool {
        let accepted = self.tools.set_width_input(raw);
        if !accepted {
            log::debug!("engine: ignoring width input {raw:?}");
        }
        accepted
    }

    /// Erase the local surface and ask the host to tell every other peer.
    pub fn clear_canvas(&mut self) -> Vec<Action> {
        if let Err(e) = render::clear(&mut self.surface) {
            log::warn!("engine: local clear failed: {e}");
        }
        vec![Action::Emit(Frame::clear_canvas())]
    }

    /// Resize the surface. Content is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot take the new size.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        self.surface.resize(width, height)
    }

    // --- Remote frames ---

    /// Apply a frame relayed from another peer.
    ///
    /// `drawing` renders, `clear-canvas` clears, anything else is ignored. A
    /// `drawing` payload that does not decode is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only when the surface itself fails.
    pub fn apply_remote(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        match frame.kind() {
            Some(EventKind::Drawing) => match frame.segment() {
                Ok(segment) => render::draw_segment(&mut self.surface, &segment),
                Err(e) => {
                    log::warn!("engine: skipping undecodable segment: {e}");
                    Ok(())
                }
            },
            Some(EventKind::ClearCanvas) => render::clear(&mut self.surface),
            Some(EventKind::Connected) => {
                log::info!("engine: connected as {}", frame.data_str(frames::FRAME_PEER_ID).unwrap_or("?"));
                Ok(())
            }
            Some(EventKind::Error) => {
                log::warn!("engine: relay error: {}", frame.data_str(frames::FRAME_MESSAGE).unwrap_or("?"));
                Ok(())
            }
            None => {
                log::debug!("engine: ignoring event {:?}", frame.event);
                Ok(())
            }
        }
    }

    /// Decode a text message from the relay and apply it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the surface itself fails.
    pub fn apply_remote_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        match decode_frame(text) {
            Ok(frame) => self.apply_remote(&frame),
            Err(e) => {
                log::warn!("engine: dropping message: {e}");
                Ok(())
            }
        }
    }
}
