//! Reference frames and clamping for drag translation.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Clamp `value` into `[0, max(0, limit)]`.
///
/// NaN values collapse to zero so a bad sample can never push a target
/// outside its container.
pub fn clamp_extent(value: f64, limit: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let limit = if limit.is_nan() { 0.0 } else { limit.max(0.0) };
    value.clamp(0.0, limit)
}

/// Clamp both components of `value` against the matching component of `limit`.
pub fn clamp_vec(value: Vec2, limit: Vec2) -> Vec2 {
    Vec2::new(clamp_extent(value.x, limit.x), clamp_extent(value.y, limit.y))
}

/// Scroll state of the deck container.
///
/// Mirrors what a browser exposes as `scrollLeft/scrollTop`,
/// `scrollWidth/scrollHeight` and `clientWidth/clientHeight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Current scroll offset.
    #[serde(default)]
    pub scroll: Vec2,
    /// Size of the scrollable content.
    pub content_size: Size,
    /// Size of the visible client area.
    pub client_size: Size,
}

impl ViewportState {
    /// Create a viewport scrolled to the origin.
    pub fn new(content_size: Size, client_size: Size) -> Self {
        Self {
            scroll: Vec2::ZERO,
            content_size,
            client_size,
        }
    }

    /// Largest scroll offset on each axis.
    pub fn max_scroll(&self) -> Vec2 {
        Vec2::new(
            (self.content_size.width - self.client_size.width).max(0.0),
            (self.content_size.height - self.client_size.height).max(0.0),
        )
    }

    /// Clamp a scroll offset into the scrollable range.
    pub fn clamp_scroll(&self, scroll: Vec2) -> Vec2 {
        clamp_vec(scroll, self.max_scroll())
    }

    /// Set the scroll offset, clamped. Returns the applied offset.
    pub fn set_scroll(&mut self, scroll: Vec2) -> Vec2 {
        self.scroll = self.clamp_scroll(scroll);
        self.scroll
    }

    /// Convert a point in client coordinates to content coordinates.
    pub fn client_to_content(&self, point: Point) -> Point {
        point + self.scroll
    }

    /// Visible part of the content, in content coordinates.
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.scroll.to_point(), self.client_size)
    }
}

/// Geometry of one item relative to its container at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemFrame {
    /// Extent the item must stay inside.
    pub container: Size,
    /// Size of the item itself.
    pub item: Size,
    /// Item position (top-left) in container content coordinates.
    pub position: Point,
}

impl ItemFrame {
    /// Largest allowed position on each axis.
    pub fn max_position(&self) -> Vec2 {
        Vec2::new(
            (self.container.width - self.item.width).max(0.0),
            (self.container.height - self.item.height).max(0.0),
        )
    }

    /// Clamp a position so the item stays inside the container.
    pub fn clamp_position(&self, position: Point) -> Point {
        clamp_vec(position.to_vec2(), self.max_position()).to_point()
    }
}
