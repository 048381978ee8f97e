//! Drawing client core for the collaborative whiteboard.
//!
//! This crate is compiled to WebAssembly for the browser and linked natively
//! by the CLI. It owns everything a peer does locally: turning pointer and
//! touch input into segments, holding the active tool/color/width, and
//! rendering segments onto a surface. The same render function draws local
//! and remote segments. Networking belongs to the host, which carries out
//! the [`engine::Action`]s the engine returns and feeds received frames back
//! in.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] tying input, tools and surface together |
//! | [`tool`] | Per-tool rendering table and stroke styles |
//! | [`render`] | The single segment render function |
//! | [`surface`] | `Surface` trait, points, and a recording surface |
//! | [`raster`] | Software bitmap surface (tiny-skia) |
//! | [`dom`] | Browser canvas surface and DOM event extraction |
//! | [`input`] | Pointer samples, position extraction, stroke state |
//! | [`ui`] | Tool/color/width state mutated by UI controls |
//! | [`consts`] | Defaults and fixed colors |

pub mod consts;
pub mod dom;
pub mod engine;
pub mod input;
pub mod raster;
pub mod render;
pub mod surface;
pub mod tool;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod web;
