//! Interaction controller: routes pointer samples to drag sessions.
//!
//! The controller owns at most one pan session and one item session. Each
//! session belongs to the pointer that started it; samples from any other
//! pointer never touch it.

use crate::capture::{NoCapture, PointerCapture};
use crate::config::{DeckConfig, DropPolicy};
use crate::deck::{Deck, ItemId, Placement};
use crate::input::{Phase, PointerId, PointerSample};
use crate::session::DragSession;
use crate::translator::{self, ReferenceFrame};
use kurbo::{Point, Vec2};
use serde::Serialize;

/// Outcome of processing a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    PanStarted {
        pointer_id: PointerId,
        scroll: Vec2,
    },
    Panned {
        pointer_id: PointerId,
        scroll: Vec2,
    },
    PanEnded {
        pointer_id: PointerId,
        scroll: Vec2,
    },
    ItemDragStarted {
        pointer_id: PointerId,
        item: ItemId,
        position: Point,
    },
    ItemMoved {
        pointer_id: PointerId,
        item: ItemId,
        position: Point,
    },
    ItemDropped {
        pointer_id: PointerId,
        item: ItemId,
        position: Point,
        placement: Placement,
    },
}

/// State to present after a frame: the scroll offset and the dragged item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutput {
    pub scroll: Vec2,
    pub dragged_item: Option<(ItemId, Point)>,
}

/// Routes normalized samples to pan and item-drag sessions.
#[derive(Debug)]
pub struct InteractionController<C = NoCapture> {
    config: DeckConfig,
    /// Active container pan, if any.
    pan: Option<DragSession>,
    /// Active item drag, if any.
    item: Option<DragSession>,
    capture: C,
}

impl InteractionController<NoCapture> {
    /// Create a controller without pointer capture.
    pub fn new(config: DeckConfig) -> Self {
        Self::with_capture(config, NoCapture)
    }
}

impl<C: PointerCapture> InteractionController<C> {
    /// Create a controller with a capture backend.
    pub fn with_capture(config: DeckConfig, capture: C) -> Self {
        Self {
            config,
            pan: None,
            item: None,
            capture,
        }
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn pan_session(&self) -> Option<&DragSession> {
        self.pan.as_ref()
    }

    pub fn item_session(&self) -> Option<&DragSession> {
        self.item.as_ref()
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }

    pub fn is_dragging_item(&self) -> bool {
        self.item.is_some()
    }

    /// Whether `pointer_id` drives an active session.
    pub fn owns(&self, pointer_id: PointerId) -> bool {
        self.pan.iter().chain(self.item.iter()).any(|s| s.accepts(pointer_id))
    }

    /// Process one sample against the deck.
    pub fn handle(&mut self, sample: &PointerSample, deck: &mut Deck) -> Vec<DragEvent> {
        let mut events = Vec::new();
        match sample.phase {
            Phase::Down => self.pointer_down(sample, deck, &mut events),
            Phase::Move => self.pointer_move(sample, deck, &mut events),
            Phase::Up | Phase::Cancel => {
                if self.config.primary_button_only && !sample.is_primary_button() {
                    return events;
                }
                self.finish(sample.pointer_id, deck, &mut events);
            }
            Phase::Leave => {
                if self.config.end_on_leave && !self.capture.has_capture(sample.pointer_id) {
                    self.finish(sample.pointer_id, deck, &mut events);
                }
            }
        }
        events
    }

    /// End every active session, e.g. when the window loses focus.
    pub fn cancel_all(&mut self, deck: &mut Deck) -> Vec<DragEvent> {
        let mut events = Vec::new();
        let pointers: Vec<PointerId> = self
            .pan
            .iter()
            .chain(self.item.iter())
            .map(DragSession::pointer_id)
            .collect();
        for pointer_id in pointers {
            self.finish(pointer_id, deck, &mut events);
        }
        events
    }

    /// Current presentation state.
    pub fn frame_output(&self, deck: &Deck) -> FrameOutput {
        let dragged_item = self
            .item
            .as_ref()
            .and_then(DragSession::item)
            .and_then(|id| deck.item_position(id).map(|position| (id, position)));
        FrameOutput {
            scroll: deck.viewport.scroll,
            dragged_item,
        }
    }

    fn pointer_down(&mut self, sample: &PointerSample, deck: &mut Deck, events: &mut Vec<DragEvent>) {
        let pointer_id = sample.pointer_id;
        if self.config.primary_button_only && !sample.is_primary_button() {
            return;
        }
        if self.owns(pointer_id) {
            log::debug!("Pointer {} already owns a drag session", pointer_id);
            return;
        }

        if self.config.item_drag {
            if let Some(id) = deck.hit_test(sample.position) {
                // Item drag takes precedence; never pan for this interaction.
                if self.item.is_some() {
                    log::debug!("Item drag already active, ignoring pointer {}", pointer_id);
                } else {
                    self.begin_item_drag(id, sample, deck, events);
                }
                return;
            }
        }

        if !self.config.panning {
            return;
        }
        if self.pan.is_some() {
            log::debug!("Pan already active, ignoring pointer {}", pointer_id);
            return;
        }

        let frame = ReferenceFrame::Viewport {
            state: deck.viewport,
            axis: self.config.pan_axis,
            speed: self.config.pan_speed,
        };
        let session = translator::begin(pointer_id, sample.position, &frame);
        let scroll = deck.viewport.set_scroll(session.offset());
        log::debug!("Pan started by pointer {} at scroll {:?}", pointer_id, scroll);
        self.pan = Some(session);
        self.try_capture(pointer_id);
        events.push(DragEvent::PanStarted { pointer_id, scroll });
    }

    fn begin_item_drag(&mut self, id: ItemId, sample: &PointerSample, deck: &mut Deck, events: &mut Vec<DragEvent>) {
        let pointer_id = sample.pointer_id;
        let detached = deck.detach(id).and_then(|_| deck.raise(id));
        if let Err(err) = detached {
            log::warn!("Cannot drag item {}: {}", id, err);
            return;
        }
        let Some(frame) = deck.item_frame(id) else {
            return;
        };

        let session = translator::begin(pointer_id, sample.position, &ReferenceFrame::Item { id, frame });
        let position = session.offset().to_point();
        if position != frame.position {
            place(deck, id, position);
        }
        log::debug!("Item {} drag started by pointer {} at {:?}", id, pointer_id, position);
        self.item = Some(session);
        self.try_capture(pointer_id);
        events.push(DragEvent::ItemDragStarted {
            pointer_id,
            item: id,
            position,
        });
    }

    fn pointer_move(&mut self, sample: &PointerSample, deck: &mut Deck, events: &mut Vec<DragEvent>) {
        let pointer_id = sample.pointer_id;

        if let Some(session) = self.pan.as_mut().filter(|s| s.accepts(pointer_id)) {
            let before = deck.viewport.scroll;
            let target = translator::update(session, pointer_id, sample.position);
            let scroll = deck.viewport.set_scroll(target);
            if scroll != before {
                events.push(DragEvent::Panned { pointer_id, scroll });
            }
        }

        if let Some(session) = self.item.as_mut().filter(|s| s.accepts(pointer_id)) {
            let before = session.offset();
            let offset = translator::update(session, pointer_id, sample.position);
            if let Some(id) = session.item() {
                if offset != before {
                    let position = offset.to_point();
                    place(deck, id, position);
                    events.push(DragEvent::ItemMoved {
                        pointer_id,
                        item: id,
                        position,
                    });
                }
            }
        }
    }

    /// End the sessions owned by `pointer_id`, applying the final clamp.
    fn finish(&mut self, pointer_id: PointerId, deck: &mut Deck, events: &mut Vec<DragEvent>) {
        if let Some(mut session) = take_owned(&mut self.pan, pointer_id) {
            let target = translator::end(&mut session);
            let scroll = deck.viewport.set_scroll(target);
            log::debug!("Pan ended by pointer {} at scroll {:?}", pointer_id, scroll);
            self.release(pointer_id);
            events.push(DragEvent::PanEnded { pointer_id, scroll });
        }

        if let Some(mut session) = take_owned(&mut self.item, pointer_id) {
            let offset = translator::end(&mut session);
            self.release(pointer_id);
            let Some(id) = session.item() else {
                return;
            };
            place(deck, id, offset.to_point());
            if self.config.drop_policy == DropPolicy::ReturnToFlow {
                if let Err(err) = deck.set_placement(id, Placement::Flow) {
                    log::warn!("Cannot return item {} to flow: {}", id, err);
                }
            }
            let placement = deck.item(id).map(|item| item.placement).unwrap_or_default();
            let position = deck.item_position(id).unwrap_or(offset.to_point());
            log::debug!("Item {} dropped at {:?}", id, position);
            events.push(DragEvent::ItemDropped {
                pointer_id,
                item: id,
                position,
                placement,
            });
        }
    }

    fn try_capture(&mut self, pointer_id: PointerId) {
        match self.capture.capture(pointer_id) {
            Ok(()) => log::trace!("Captured pointer {}", pointer_id),
            Err(err) => log::debug!("Pointer capture unavailable for {}: {}", pointer_id, err),
        }
    }

    fn release(&mut self, pointer_id: PointerId) {
        if let Err(err) = self.capture.release(pointer_id) {
            log::debug!("Pointer release failed for {}: {}", pointer_id, err);
        }
    }
}

fn take_owned(slot: &mut Option<DragSession>, pointer_id: PointerId) -> Option<DragSession> {
    if slot.as_ref().is_some_and(|s| s.accepts(pointer_id)) {
        slot.take()
    } else {
        None
    }
}

fn place(deck: &mut Deck, id: ItemId, position: Point) {
    if let Err(err) = deck.place_item(id, position) {
        log::warn!("Cannot place item {}: {}", id, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::RecordingCapture;
    use crate::input::PointerKind;
    use kurbo::Size;
    use proptest::prelude::*;

    fn scrolling_deck(config: &DeckConfig) -> (Deck, Vec<ItemId>) {
        // Five 100x100 items with a gap of 10 in a 300px wide container.
        let mut deck = Deck::new(Size::new(300.0, 200.0), config);
        let ids = (0..5)
            .map(|_| deck.add_item(Size::new(100.0, 100.0)).unwrap())
            .collect();
        (deck, ids)
    }

    fn config() -> DeckConfig {
        DeckConfig {
            item_gap: 10.0,
            ..DeckConfig::default()
        }
    }

    fn padded_config() -> DeckConfig {
        DeckConfig {
            item_gap: 10.0,
            padding: 20.0,
            ..DeckConfig::default()
        }
    }

    /// Press on the item's center, move by `delta` and release.
    fn drag_item(controller: &mut InteractionController, deck: &mut Deck, id: ItemId, delta: Vec2) {
        let start = deck.item_rect(id).unwrap().center() - deck.viewport.scroll;
        controller.handle(&PointerSample::mouse(Phase::Down, start), deck);
        controller.handle(&PointerSample::mouse(Phase::Move, start + delta), deck);
        controller.handle(&PointerSample::mouse(Phase::Up, start + delta), deck);
    }

    fn touch(id: i64, phase: Phase, x: f64, y: f64) -> PointerSample {
        PointerSample::new(PointerId(id), PointerKind::Touch, phase, Point::new(x, y))
    }

    #[test]
    fn test_background_drag_pans() {
        let config = config();
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        // Below the items, so the background is hit.
        let events = controller.handle(&PointerSample::mouse(Phase::Down, Point::new(200.0, 150.0)), &mut deck);
        assert!(matches!(events[..], [DragEvent::PanStarted { .. }]));
        assert!(controller.is_panning());

        controller.handle(&PointerSample::mouse(Phase::Move, Point::new(120.0, 150.0)), &mut deck);
        assert!((deck.viewport.scroll.x - 80.0).abs() < f64::EPSILON);

        let events = controller.handle(&PointerSample::mouse(Phase::Up, Point::new(120.0, 150.0)), &mut deck);
        assert_eq!(
            events,
            vec![DragEvent::PanEnded {
                pointer_id: PointerId::MOUSE,
                scroll: Vec2::new(80.0, 0.0)
            }]
        );
        assert!(!controller.is_panning());
    }

    #[test]
    fn test_item_takes_precedence_over_pan() {
        let config = config();
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        let events = controller.handle(&PointerSample::mouse(Phase::Down, Point::new(150.0, 50.0)), &mut deck);
        assert_eq!(
            events,
            vec![DragEvent::ItemDragStarted {
                pointer_id: PointerId::MOUSE,
                item: ids[1],
                position: Point::new(110.0, 0.0),
            }]
        );
        assert!(!controller.is_panning());

        controller.handle(&PointerSample::mouse(Phase::Move, Point::new(100.0, 80.0)), &mut deck);
        assert_eq!(deck.item_position(ids[1]), Some(Point::new(60.0, 30.0)));
        assert_eq!(deck.viewport.scroll, Vec2::ZERO);
        assert_eq!(
            controller.frame_output(&deck).dragged_item,
            Some((ids[1], Point::new(60.0, 30.0)))
        );
    }

    #[test]
    fn test_item_dragged_past_container_is_clamped() {
        let config = config();
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&PointerSample::mouse(Phase::Down, Point::new(50.0, 50.0)), &mut deck);
        controller.handle(&PointerSample::mouse(Phase::Move, Point::new(5000.0, 5000.0)), &mut deck);
        let events = controller.handle(&PointerSample::mouse(Phase::Up, Point::new(5000.0, 5000.0)), &mut deck);

        // Content is 430 wide once the item leaves the flow row.
        let expected = Point::new(330.0, 100.0);
        assert_eq!(deck.item_position(ids[0]), Some(expected));
        assert!(matches!(
            events[..],
            [DragEvent::ItemDropped { position, placement: Placement::Absolute { .. }, .. }] if position == expected
        ));
    }

    #[test]
    fn test_repeated_corner_drops_keep_content_fixed() {
        let config = padded_config();
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);
        assert_eq!(deck.viewport.content_size, Size::new(580.0, 200.0));

        for _ in 0..5 {
            drag_item(&mut controller, &mut deck, ids[0], Vec2::new(5000.0, 5000.0));
            // Four flow items plus padding: 20 + 4 * 100 + 3 * 10 + 20.
            assert_eq!(deck.viewport.content_size, Size::new(470.0, 200.0));
            assert_eq!(deck.item_position(ids[0]), Some(Point::new(370.0, 100.0)));
        }
        assert_eq!(deck.viewport.max_scroll(), Vec2::new(170.0, 0.0));
    }

    #[test]
    fn test_pan_bounds_with_padding() {
        let config = padded_config();
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        for _ in 0..3 {
            controller.handle(&PointerSample::mouse(Phase::Down, Point::new(200.0, 170.0)), &mut deck);
            controller.handle(&PointerSample::mouse(Phase::Move, Point::new(-5000.0, 170.0)), &mut deck);
            controller.handle(&PointerSample::mouse(Phase::Up, Point::new(-5000.0, 170.0)), &mut deck);
            assert_eq!(deck.viewport.scroll, Vec2::new(280.0, 0.0));
        }

        controller.handle(&PointerSample::mouse(Phase::Down, Point::new(200.0, 170.0)), &mut deck);
        controller.handle(&PointerSample::mouse(Phase::Move, Point::new(5000.0, 170.0)), &mut deck);
        assert_eq!(deck.viewport.scroll, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn item_stays_in_content_across_sessions(
            drags in prop::collection::vec((-2000.0f64..2000.0, -2000.0f64..2000.0), 1..8)
        ) {
            let config = padded_config();
            let (mut deck, ids) = scrolling_deck(&config);
            let mut controller = InteractionController::new(config);
            let initial = deck.viewport.content_size;

            for (dx, dy) in drags {
                drag_item(&mut controller, &mut deck, ids[0], Vec2::new(dx, dy));
                let content = deck.viewport.content_size;
                let rect = deck.item_rect(ids[0]).unwrap();
                prop_assert!(content.width <= initial.width && content.height <= initial.height);
                prop_assert!(rect.x0 >= 0.0 && rect.y0 >= 0.0);
                prop_assert!(rect.x1 <= content.width && rect.y1 <= content.height);
                prop_assert!(!controller.is_dragging_item());
            }
        }
    }

    #[test]
    fn test_return_to_flow_policy() {
        let config = DeckConfig {
            drop_policy: DropPolicy::ReturnToFlow,
            ..config()
        };
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&PointerSample::mouse(Phase::Down, Point::new(50.0, 50.0)), &mut deck);
        controller.handle(&PointerSample::mouse(Phase::Move, Point::new(80.0, 90.0)), &mut deck);
        let events = controller.handle(&PointerSample::mouse(Phase::Up, Point::new(80.0, 90.0)), &mut deck);

        assert_eq!(deck.item(ids[0]).unwrap().placement, Placement::Flow);
        assert_eq!(deck.item_position(ids[0]), Some(Point::ZERO));
        assert!(matches!(
            events[..],
            [DragEvent::ItemDropped { placement: Placement::Flow, .. }]
        ));
    }

    #[test]
    fn test_other_pointer_cannot_move_session() {
        let config = config();
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&touch(11, Phase::Down, 50.0, 50.0), &mut deck);
        let events = controller.handle(&touch(12, Phase::Move, 250.0, 90.0), &mut deck);
        assert!(events.is_empty());
        assert_eq!(deck.item_position(ids[0]), Some(Point::ZERO));

        // Up from the wrong pointer does not end the drag either.
        assert!(controller.handle(&touch(12, Phase::Up, 250.0, 90.0), &mut deck).is_empty());
        assert!(controller.is_dragging_item());
    }

    #[test]
    fn test_pan_and_item_drag_with_two_pointers() {
        let config = config();
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&touch(1, Phase::Down, 50.0, 50.0), &mut deck);
        controller.handle(&touch(2, Phase::Down, 200.0, 150.0), &mut deck);
        assert!(controller.is_dragging_item());
        assert!(controller.is_panning());

        controller.handle(&touch(2, Phase::Move, 150.0, 150.0), &mut deck);
        controller.handle(&touch(1, Phase::Move, 70.0, 60.0), &mut deck);
        assert!((deck.viewport.scroll.x - 50.0).abs() < f64::EPSILON);
        assert_eq!(deck.item_position(ids[0]), Some(Point::new(20.0, 10.0)));

        // A second item drag is refused while one is active.
        let events = controller.handle(&touch(3, Phase::Down, 20.0, 20.0), &mut deck);
        assert!(events.is_empty());
    }

    #[test]
    fn test_cancel_ends_like_up() {
        let config = config();
        let (mut deck, ids) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&touch(4, Phase::Down, 50.0, 50.0), &mut deck);
        controller.handle(&touch(4, Phase::Move, 90.0, 50.0), &mut deck);
        let events = controller.handle(&touch(4, Phase::Cancel, 90.0, 50.0), &mut deck);

        assert!(matches!(events[..], [DragEvent::ItemDropped { .. }]));
        assert_eq!(deck.item_position(ids[0]), Some(Point::new(40.0, 0.0)));
        assert!(!controller.is_dragging_item());
    }

    #[test]
    fn test_leave_ends_uncaptured_pan() {
        let config = config();
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&PointerSample::mouse(Phase::Down, Point::new(200.0, 150.0)), &mut deck);
        let events = controller.handle(&PointerSample::mouse(Phase::Leave, Point::new(0.0, 150.0)), &mut deck);
        assert!(matches!(events[..], [DragEvent::PanEnded { .. }]));
    }

    #[test]
    fn test_leave_ignored_while_captured() {
        let config = config();
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::with_capture(config, RecordingCapture::new());

        controller.handle(&PointerSample::mouse(Phase::Down, Point::new(200.0, 150.0)), &mut deck);
        assert!(controller.capture().has_capture(PointerId::MOUSE));

        let events = controller.handle(&PointerSample::mouse(Phase::Leave, Point::new(0.0, 150.0)), &mut deck);
        assert!(events.is_empty());
        assert!(controller.is_panning());

        controller.handle(&PointerSample::mouse(Phase::Up, Point::new(0.0, 150.0)), &mut deck);
        assert!(!controller.capture().has_capture(PointerId::MOUSE));
    }

    #[test]
    fn test_panning_disabled() {
        let config = DeckConfig {
            panning: false,
            ..config()
        };
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);
        let events = controller.handle(&PointerSample::mouse(Phase::Down, Point::new(200.0, 150.0)), &mut deck);
        assert!(events.is_empty());
    }

    #[test]
    fn test_item_drag_disabled_pans_instead() {
        let config = DeckConfig {
            item_drag: false,
            ..config()
        };
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);
        let events = controller.handle(&PointerSample::mouse(Phase::Down, Point::new(50.0, 50.0)), &mut deck);
        assert!(matches!(events[..], [DragEvent::PanStarted { .. }]));
    }

    #[test]
    fn test_cancel_all() {
        let config = config();
        let (mut deck, _) = scrolling_deck(&config);
        let mut controller = InteractionController::new(config);

        controller.handle(&touch(1, Phase::Down, 50.0, 50.0), &mut deck);
        controller.handle(&touch(2, Phase::Down, 200.0, 150.0), &mut deck);
        let events = controller.cancel_all(&mut deck);
        assert_eq!(events.len(), 2);
        assert!(!controller.is_panning());
        assert!(!controller.is_dragging_item());
    }

    #[test]
    fn test_event_json() {
        let event = DragEvent::Panned {
            pointer_id: PointerId(3),
            scroll: Vec2::new(12.0, 0.0),
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["event"], "panned");
        assert_eq!(json["pointer_id"], 3);
        assert_eq!(json["scroll"]["x"], 12.0);
    }
}
