//! Drag session records.

use crate::deck::ItemId;
use crate::geometry::clamp_vec;
use crate::input::PointerId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// What a session moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SessionTarget {
    /// Panning the container's scroll offset.
    Container,
    /// Moving one item.
    Item(ItemId),
}

/// State of one drag interaction, from pointer down to up/cancel.
///
/// The offset is a scroll position for [`SessionTarget::Container`] and an
/// item position for [`SessionTarget::Item`]. Each axis is computed as
/// `origin_offset + (current - origin) * scale` and clamped to
/// `[0, max_offset]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pointer_id: PointerId,
    target: SessionTarget,
    /// Pointer position at session start.
    origin: Point,
    /// Scroll offset or item position at session start.
    origin_offset: Vec2,
    /// Per-axis upper bound captured from the reference frame.
    max_offset: Vec2,
    /// Per-axis delta factor (negative for panning, zero for locked axes).
    scale: Vec2,
    /// Last computed offset.
    offset: Vec2,
    active: bool,
}

impl DragSession {
    pub(crate) fn new(
        pointer_id: PointerId,
        target: SessionTarget,
        origin: Point,
        origin_offset: Vec2,
        max_offset: Vec2,
        scale: Vec2,
    ) -> Self {
        Self {
            pointer_id,
            target,
            origin,
            origin_offset,
            max_offset,
            scale,
            offset: clamp_vec(origin_offset, max_offset),
            active: true,
        }
    }

    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    pub fn target(&self) -> SessionTarget {
        self.target
    }

    /// Id of the dragged item, if this is an item session.
    pub fn item(&self) -> Option<ItemId> {
        match self.target {
            SessionTarget::Item(id) => Some(id),
            SessionTarget::Container => None,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn origin_offset(&self) -> Vec2 {
        self.origin_offset
    }

    pub fn max_offset(&self) -> Vec2 {
        self.max_offset
    }

    /// Last computed offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a sample from `pointer_id` belongs to this session.
    pub fn accepts(&self, pointer_id: PointerId) -> bool {
        self.active && self.pointer_id == pointer_id
    }

    /// Pointer movement since session start.
    pub fn delta(&self, current: Point) -> Vec2 {
        current - self.origin
    }

    /// Offset for a pointer position, clamped.
    pub(crate) fn offset_for(&self, current: Point) -> Vec2 {
        let delta = self.delta(current);
        let raw = Vec2::new(
            self.origin_offset.x + delta.x * self.scale.x,
            self.origin_offset.y + delta.y * self.scale.y,
        );
        self.clamp(raw)
    }

    pub(crate) fn clamp(&self, offset: Vec2) -> Vec2 {
        clamp_vec(offset, self.max_offset)
    }

    pub(crate) fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }
}
