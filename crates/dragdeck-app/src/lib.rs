//! DragDeck Application
//!
//! Hosts for the core drag logic: trace replay on native targets and DOM
//! bindings on the web.

pub mod host;
pub mod replay;

pub use host::InputPipeline;
pub use replay::{ItemState, ReplayError, ReplayOutcome, ReplayResult, Scene, Trace, replay};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebDeck, run_wasm};
