//! Diagram engine for an infinite, pannable canvas of rounded rectangles.
//!
//! This crate is compiled to WebAssembly and runs in the browser, and also
//! builds natively so the engine logic can be tested without one. It owns the
//! coordinate transform, the interaction state machine, the shape model, and
//! the frame renderer. The host layer forwards raw pointer, keyboard, and
//! resize events, and owns the timing of persistence by reacting to the
//! [`engine::Action`]s the engine returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Diagram elements and the ordered element store |
//! | [`camera`] | Pan/zoom transform and coordinate conversions |
//! | [`input`] | Tool modes, input event types, and interaction states |
//! | [`hit`] | Containment tests and corner handle geometry |
//! | [`render`] | Drawing-surface trait and the full-frame renderer |
//! | [`persist`] | JSON element-list codec and key-value stores |
//! | [`config`] | Host-supplied engine configuration |
//! | [`consts`] | Shared numeric constants (grid, handles, colours) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod input;
pub mod persist;
pub mod render;
