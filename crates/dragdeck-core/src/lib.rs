//! DragDeck Core Library
//!
//! Platform-agnostic drag logic for a scrollable deck of items: panning the
//! deck by dragging its background, and moving single items into free
//! (absolute) positions.

pub mod capture;
pub mod config;
pub mod controller;
pub mod deck;
pub mod error;
pub mod geometry;
pub mod input;
pub mod session;
pub mod translator;

pub use capture::{NoCapture, PointerCapture, RecordingCapture};
pub use config::{DeckConfig, DropPolicy, PanAxis};
pub use controller::{DragEvent, FrameOutput, InteractionController};
pub use deck::{Deck, Item, ItemId, Placement};
pub use error::{CaptureError, ConfigError, DeckError};
pub use geometry::{ItemFrame, ViewportState, clamp_extent};
pub use input::{Button, InputNormalizer, MoveCoalescer, Phase, PointerId, PointerKind, PointerSample, RawInput};
pub use session::{DragSession, SessionTarget};
pub use translator::ReferenceFrame;
