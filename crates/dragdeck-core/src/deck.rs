//! The deck: a scrollable container of items.
//!
//! Items sit in a single left-to-right flow row until they are dragged, at
//! which point they switch to absolute placement and leave the flow.

use crate::config::DeckConfig;
use crate::error::{DeckError, DeckResult};
use crate::geometry::{ItemFrame, ViewportState};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an item is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Laid out by the flow row.
    #[default]
    Flow,
    /// Free position (top-left) in content coordinates.
    Absolute { position: Point },
}

/// One item in the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: ItemId,
    pub size: Size,
    #[serde(default)]
    pub placement: Placement,
    /// Flow position reported by a host with its own layout engine.
    #[serde(skip)]
    measured: Option<Point>,
}

impl Item {
    /// Create a flow item with a fresh id.
    pub fn new(size: Size) -> Self {
        Self {
            id: ItemId::new(),
            size,
            placement: Placement::Flow,
            measured: None,
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self.placement, Placement::Absolute { .. })
    }
}

fn validate_size(size: Size) -> DeckResult<()> {
    if size.width.is_finite() && size.height.is_finite() && size.width >= 0.0 && size.height >= 0.0 {
        Ok(())
    } else {
        Err(DeckError::InvalidSize {
            width: size.width,
            height: size.height,
        })
    }
}

/// A scrollable container of items.
#[derive(Debug, Clone)]
pub struct Deck {
    /// Scroll state. Mutated by panning and by content size changes.
    pub viewport: ViewportState,
    /// Items in flow order.
    items: Vec<Item>,
    /// Stacking order, back to front.
    z_order: Vec<ItemId>,
    padding: f64,
    item_gap: f64,
}

impl Deck {
    /// Create an empty deck with the given client size.
    pub fn new(client_size: Size, config: &DeckConfig) -> Self {
        Self {
            viewport: ViewportState::new(client_size, client_size),
            items: Vec::new(),
            z_order: Vec::new(),
            padding: config.padding,
            item_gap: config.item_gap,
        }
    }

    /// Add a flow item of the given size.
    pub fn add_item(&mut self, size: Size) -> DeckResult<ItemId> {
        let item = Item::new(size);
        let id = item.id;
        self.insert_item(item)?;
        Ok(id)
    }

    /// Insert an item at the end of the flow and on top of the stack.
    pub fn insert_item(&mut self, item: Item) -> DeckResult<()> {
        validate_size(item.size)?;
        if self.item(item.id).is_some() {
            return Err(DeckError::DuplicateItem(item.id));
        }
        self.z_order.push(item.id);
        self.items.push(item);
        self.sync_content_size();
        Ok(())
    }

    /// Remove an item.
    pub fn remove_item(&mut self, id: ItemId) -> DeckResult<Item> {
        let index = self.index_of(id)?;
        let item = self.items.remove(index);
        self.z_order.retain(|z| *z != id);
        self.sync_content_size();
        Ok(item)
    }

    /// Items in flow order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stacking order, back to front.
    pub fn z_order(&self) -> &[ItemId] {
        &self.z_order
    }

    fn index_of(&self, id: ItemId) -> DeckResult<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(DeckError::UnknownItem(id))
    }

    /// Computed flow positions of all flow items, in flow order.
    fn flow_positions(&self) -> Vec<(ItemId, Point)> {
        let mut x = self.padding;
        let mut positions = Vec::new();
        for item in self.items.iter().filter(|item| !item.is_absolute()) {
            let position = item.measured.unwrap_or(Point::new(x, self.padding));
            positions.push((item.id, position));
            x += item.size.width + self.item_gap;
        }
        positions
    }

    /// Current top-left position of an item in content coordinates.
    pub fn item_position(&self, id: ItemId) -> Option<Point> {
        let item = self.item(id)?;
        match item.placement {
            Placement::Absolute { position } => Some(position),
            Placement::Flow => self
                .flow_positions()
                .into_iter()
                .find(|(flow_id, _)| *flow_id == id)
                .map(|(_, position)| position),
        }
    }

    /// Bounding box of an item in content coordinates.
    pub fn item_rect(&self, id: ItemId) -> Option<Rect> {
        let size = self.item(id)?.size;
        self.item_position(id)
            .map(|position| Rect::from_origin_size(position, size))
    }

    /// Topmost item under a point given in client coordinates.
    pub fn hit_test(&self, client_point: Point) -> Option<ItemId> {
        let point = self.viewport.client_to_content(client_point);
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|&id| self.item_rect(id).is_some_and(|rect| rect.contains(point)))
    }

    /// Move an item to the top of the stacking order.
    pub fn raise(&mut self, id: ItemId) -> DeckResult<()> {
        self.index_of(id)?;
        self.z_order.retain(|z| *z != id);
        self.z_order.push(id);
        Ok(())
    }

    /// Change an item's placement.
    pub fn set_placement(&mut self, id: ItemId, placement: Placement) -> DeckResult<()> {
        let index = self.index_of(id)?;
        self.items[index].placement = placement;
        self.sync_content_size();
        Ok(())
    }

    /// Switch an item to absolute placement at its current position.
    ///
    /// Returns that position. The remaining flow items close the gap.
    pub fn detach(&mut self, id: ItemId) -> DeckResult<Point> {
        let position = self.item_position(id).ok_or(DeckError::UnknownItem(id))?;
        self.set_placement(id, Placement::Absolute { position })?;
        Ok(position)
    }

    /// Place an item at an absolute position.
    pub fn place_item(&mut self, id: ItemId, position: Point) -> DeckResult<()> {
        self.set_placement(id, Placement::Absolute { position })
    }

    /// Record a flow position measured by the host's layout engine.
    ///
    /// Measured positions replace the computed flow row for that item.
    pub fn set_measured_position(&mut self, id: ItemId, position: Option<Point>) -> DeckResult<()> {
        let index = self.index_of(id)?;
        self.items[index].measured = position;
        Ok(())
    }

    /// Reference frame for dragging an item.
    pub fn item_frame(&self, id: ItemId) -> Option<ItemFrame> {
        let item = self.item(id)?;
        Some(ItemFrame {
            container: self.viewport.content_size,
            item: item.size,
            position: self.item_position(id)?,
        })
    }

    /// Extent of all laid-out items.
    ///
    /// Trailing padding follows the flow row only; absolute items already
    /// lie inside the content they were clamped against.
    pub fn layout_extent(&self) -> Size {
        let mut extent = Size::ZERO;
        let mut flow = self.flow_positions().into_iter();
        for item in &self.items {
            let (position, trailing) = match item.placement {
                Placement::Absolute { position } => (position, 0.0),
                Placement::Flow => match flow.next() {
                    Some((_, position)) => (position, self.padding),
                    None => continue,
                },
            };
            let rect = Rect::from_origin_size(position, item.size);
            extent.width = extent.width.max(rect.x1 + trailing);
            extent.height = extent.height.max(rect.y1 + trailing);
        }
        extent
    }

    /// Recompute the content size from the layout and re-clamp the scroll offset.
    pub fn sync_content_size(&mut self) {
        let extent = self.layout_extent();
        let client = self.viewport.client_size;
        self.viewport.content_size = Size::new(
            extent.width.max(client.width),
            extent.height.max(client.height),
        );
        let scroll = self.viewport.scroll;
        self.viewport.set_scroll(scroll);
    }

    /// Resize the visible client area.
    pub fn set_client_size(&mut self, client_size: Size) {
        self.viewport.client_size = client_size;
        self.sync_content_size();
    }
}
