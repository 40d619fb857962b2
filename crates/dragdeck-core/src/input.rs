//! Input normalization for mouse/pointer/touch events.
//!
//! Hosts feed whatever their platform delivers as [`RawInput`]; the
//! [`InputNormalizer`] maps it to a single [`PointerSample`] shape that the
//! controller consumes.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one pointer (mouse, pen contact or finger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub i64);

impl PointerId {
    /// Id used for legacy mouse events. Browsers report `pointerId == 1` for the mouse.
    pub const MOUSE: PointerId = PointerId(1);

    /// Touch identifiers are shifted into their own range so they never
    /// collide with pointer-event ids.
    pub const TOUCH_BASE: i64 = 1 << 32;

    /// Pointer id for a touch-event identifier.
    pub fn touch(identifier: i64) -> Self {
        Self(Self::TOUCH_BASE.saturating_add(identifier))
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of device behind a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// Pressed button, using DOM numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    /// Left mouse button, pen tip or touch contact (0).
    Primary,
    /// Middle mouse button (1).
    Auxiliary,
    /// Right mouse button (2).
    Secondary,
    Other(i16),
}

impl Button {
    /// Map a DOM `MouseEvent.button` value. Negative values mean "no button change".
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            b if b < 0 => None,
            0 => Some(Button::Primary),
            1 => Some(Button::Auxiliary),
            2 => Some(Button::Secondary),
            other => Some(Button::Other(other)),
        }
    }
}

/// Normalized sample phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Down,
    Move,
    Up,
    Cancel,
    /// Pointer left the container.
    Leave,
}

/// One normalized interaction sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub pointer_id: PointerId,
    pub kind: PointerKind,
    pub phase: Phase,
    /// Position in container client coordinates.
    pub position: Point,
    /// Button involved in a down/up transition.
    pub button: Option<Button>,
}

impl PointerSample {
    /// Convenience constructor for a primary-button sample.
    pub fn new(pointer_id: PointerId, kind: PointerKind, phase: Phase, position: Point) -> Self {
        let button = match phase {
            Phase::Down | Phase::Up => Some(Button::Primary),
            _ => None,
        };
        Self {
            pointer_id,
            kind,
            phase,
            position,
            button,
        }
    }

    /// Mouse sample using [`PointerId::MOUSE`].
    pub fn mouse(phase: Phase, position: Point) -> Self {
        Self::new(PointerId::MOUSE, PointerKind::Mouse, phase, position)
    }

    pub fn is_primary_button(&self) -> bool {
        matches!(self.button, None | Some(Button::Primary))
    }
}

/// Legacy mouse event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MousePhase {
    Down,
    Move,
    Up,
    Leave,
}

/// Pointer event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

/// Touch event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

fn primary_pointer() -> bool {
    true
}

/// Platform input as delivered by the host, in container client coordinates.
///
/// The JSON form is used for record/replay traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RawInput {
    Mouse {
        phase: MousePhase,
        x: f64,
        y: f64,
        #[serde(default)]
        button: i16,
    },
    Pointer {
        phase: PointerPhase,
        pointer_id: i64,
        #[serde(default)]
        pointer_type: PointerKind,
        x: f64,
        y: f64,
        #[serde(default)]
        button: i16,
        #[serde(default = "primary_pointer")]
        is_primary: bool,
    },
    Touch {
        phase: TouchPhase,
        identifier: i64,
        x: f64,
        y: f64,
    },
}

/// Maps raw platform input to [`PointerSample`]s.
///
/// Browsers that support pointer events also fire compatibility mouse events
/// for the same interaction. Once a pointer event has been seen, mouse events
/// are dropped so each interaction is processed once.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    pointer_events_seen: bool,
    primary_button_only: bool,
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InputNormalizer {
    /// Create a normalizer. With `primary_button_only`, down/up transitions of
    /// other buttons are filtered out.
    pub fn new(primary_button_only: bool) -> Self {
        Self {
            pointer_events_seen: false,
            primary_button_only,
        }
    }

    /// Whether pointer events have taken over from mouse events.
    pub fn pointer_events_seen(&self) -> bool {
        self.pointer_events_seen
    }

    /// Normalize one raw input. Returns `None` for filtered input.
    pub fn normalize(&mut self, raw: &RawInput) -> Option<PointerSample> {
        let sample = match *raw {
            RawInput::Mouse { phase, x, y, button } => {
                if self.pointer_events_seen {
                    log::trace!("Dropping compatibility mouse event {:?}", phase);
                    return None;
                }
                let phase = match phase {
                    MousePhase::Down => Phase::Down,
                    MousePhase::Move => Phase::Move,
                    MousePhase::Up => Phase::Up,
                    MousePhase::Leave => Phase::Leave,
                };
                PointerSample {
                    pointer_id: PointerId::MOUSE,
                    kind: PointerKind::Mouse,
                    phase,
                    position: Point::new(x, y),
                    button: transition_button(phase, button),
                }
            }
            RawInput::Pointer {
                phase,
                pointer_id,
                pointer_type,
                x,
                y,
                button,
                is_primary: _,
            } => {
                self.pointer_events_seen = true;
                let phase = match phase {
                    PointerPhase::Down => Phase::Down,
                    PointerPhase::Move => Phase::Move,
                    PointerPhase::Up => Phase::Up,
                    PointerPhase::Cancel => Phase::Cancel,
                    PointerPhase::Leave => Phase::Leave,
                };
                PointerSample {
                    pointer_id: PointerId(pointer_id),
                    kind: pointer_type,
                    phase,
                    position: Point::new(x, y),
                    button: transition_button(phase, button),
                }
            }
            RawInput::Touch { phase, identifier, x, y } => {
                let phase = match phase {
                    TouchPhase::Start => Phase::Down,
                    TouchPhase::Move => Phase::Move,
                    TouchPhase::End => Phase::Up,
                    TouchPhase::Cancel => Phase::Cancel,
                };
                PointerSample::new(
                    PointerId::touch(identifier),
                    PointerKind::Touch,
                    phase,
                    Point::new(x, y),
                )
            }
        };

        if self.primary_button_only && !sample.is_primary_button() {
            log::trace!("Ignoring {:?} for button {:?}", sample.phase, sample.button);
            return None;
        }
        Some(sample)
    }
}

fn transition_button(phase: Phase, button: i16) -> Option<Button> {
    match phase {
        Phase::Down | Phase::Up => Button::from_dom(button),
        _ => None,
    }
}

/// Coalesces move samples to at most one per pointer per frame.
///
/// Non-move samples flush the pending move of their pointer first, so the
/// order of samples within one drag session is preserved.
#[derive(Debug, Clone, Default)]
pub struct MoveCoalescer {
    pending: Vec<PointerSample>,
}

impl MoveCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a sample. Returns the samples that are ready to process now.
    pub fn push(&mut self, sample: PointerSample) -> Vec<PointerSample> {
        let pending = self
            .pending
            .iter()
            .position(|p| p.pointer_id == sample.pointer_id);

        if sample.phase == Phase::Move {
            match pending {
                Some(index) => self.pending[index] = sample,
                None => self.pending.push(sample),
            }
            return Vec::new();
        }

        let mut ready = Vec::with_capacity(2);
        if let Some(index) = pending {
            ready.push(self.pending.remove(index));
        }
        ready.push(sample);
        ready
    }

    /// End of frame: release all pending moves.
    pub fn flush(&mut self) -> Vec<PointerSample> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
