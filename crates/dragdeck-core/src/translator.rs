//! Pointer-drag coordinate translation.
//!
//! Turns pointer positions into scroll offsets (panning) or item positions
//! (item drag), always clamped to the container bounds.

use crate::config::PanAxis;
use crate::deck::ItemId;
use crate::geometry::{ItemFrame, ViewportState};
use crate::input::PointerId;
use crate::session::{DragSession, SessionTarget};
use kurbo::{Point, Vec2};

/// Reference geometry captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferenceFrame {
    /// Pan the container. Content follows the pointer, scaled by `speed`.
    Viewport {
        state: ViewportState,
        axis: PanAxis,
        speed: f64,
    },
    /// Move one item inside its container.
    Item { id: ItemId, frame: ItemFrame },
}

/// Start a drag session for `pointer_id` at `origin`.
pub fn begin(pointer_id: PointerId, origin: Point, frame: &ReferenceFrame) -> DragSession {
    match *frame {
        ReferenceFrame::Viewport { state, axis, speed } => {
            let scale = Vec2::new(
                if axis.pans_x() { -speed } else { 0.0 },
                if axis.pans_y() { -speed } else { 0.0 },
            );
            DragSession::new(
                pointer_id,
                SessionTarget::Container,
                origin,
                state.scroll,
                state.max_scroll(),
                scale,
            )
        }
        ReferenceFrame::Item { id, frame } => DragSession::new(
            pointer_id,
            SessionTarget::Item(id),
            origin,
            frame.position.to_vec2(),
            frame.max_position(),
            Vec2::new(1.0, 1.0),
        ),
    }
}

/// Apply a pointer sample to the session and return the new offset.
///
/// Samples from another pointer, or after the session ended, leave the
/// offset unchanged.
pub fn update(session: &mut DragSession, pointer_id: PointerId, current: Point) -> Vec2 {
    if !session.accepts(pointer_id) {
        return session.offset();
    }
    let offset = session.offset_for(current);
    session.set_offset(offset);
    offset
}

/// Finish the session and return its final, clamped offset.
///
/// Calling `end` again returns the same offset.
pub fn end(session: &mut DragSession) -> Vec2 {
    let offset = session.clamp(session.offset());
    session.set_offset(offset);
    session.deactivate();
    offset
}
