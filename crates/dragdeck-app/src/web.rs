//! WebAssembly entry point and DOM bindings.

use crate::host::InputPipeline;
use dragdeck_core::input::{MousePhase, PointerPhase};
use dragdeck_core::{
    CaptureError, Deck, DeckConfig, DragEvent, InteractionController, Item, ItemId, Phase,
    Placement, PointerCapture, PointerId, PointerKind, PointerSample, RawInput,
};
use kurbo::{Point, Size, Vec2};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlElement, MouseEvent, PointerEvent};

const EVENTS: [&str; 9] = [
    "pointerdown",
    "pointermove",
    "pointerup",
    "pointercancel",
    "pointerleave",
    "mousedown",
    "mousemove",
    "mouseup",
    "mouseleave",
];

/// Pointer capture through `Element.setPointerCapture`.
struct ElementCapture {
    element: Element,
}

fn dom_pointer_id(pointer_id: PointerId) -> Result<i32, CaptureError> {
    i32::try_from(pointer_id.0).map_err(|_| CaptureError::InvalidPointer(pointer_id))
}

impl PointerCapture for ElementCapture {
    fn capture(&mut self, pointer_id: PointerId) -> Result<(), CaptureError> {
        let id = dom_pointer_id(pointer_id)?;
        self.element
            .set_pointer_capture(id)
            .map_err(|err| CaptureError::Platform(format!("{:?}", err)))
    }

    fn release(&mut self, pointer_id: PointerId) -> Result<(), CaptureError> {
        let id = dom_pointer_id(pointer_id)?;
        self.element
            .release_pointer_capture(id)
            .map_err(|err| CaptureError::Platform(format!("{:?}", err)))
    }

    fn has_capture(&self, pointer_id: PointerId) -> bool {
        dom_pointer_id(pointer_id).is_ok_and(|id| self.element.has_pointer_capture(id))
    }
}

/// Translate a DOM event into raw input relative to `origin`.
fn raw_input(event: &Event, origin: Point) -> Option<RawInput> {
    let kind = event.type_();
    if let Some(pointer) = event.dyn_ref::<PointerEvent>() {
        let phase = match kind.as_str() {
            "pointerdown" => PointerPhase::Down,
            "pointermove" => PointerPhase::Move,
            "pointerup" => PointerPhase::Up,
            "pointercancel" => PointerPhase::Cancel,
            "pointerleave" => PointerPhase::Leave,
            _ => return None,
        };
        let pointer_type = match pointer.pointer_type().as_str() {
            "pen" => PointerKind::Pen,
            "touch" => PointerKind::Touch,
            _ => PointerKind::Mouse,
        };
        return Some(RawInput::Pointer {
            phase,
            pointer_id: i64::from(pointer.pointer_id()),
            pointer_type,
            x: f64::from(pointer.client_x()) - origin.x,
            y: f64::from(pointer.client_y()) - origin.y,
            button: pointer.button(),
            is_primary: pointer.is_primary(),
        });
    }

    let mouse = event.dyn_ref::<MouseEvent>()?;
    let phase = match kind.as_str() {
        "mousedown" => MousePhase::Down,
        "mousemove" => MousePhase::Move,
        "mouseup" => MousePhase::Up,
        "mouseleave" => MousePhase::Leave,
        _ => return None,
    };
    Some(RawInput::Mouse {
        phase,
        x: f64::from(mouse.client_x()) - origin.x,
        y: f64::from(mouse.client_y()) - origin.y,
        button: mouse.button(),
    })
}

fn is_move(raw: &RawInput) -> bool {
    matches!(
        raw,
        RawInput::Mouse { phase: MousePhase::Move, .. }
            | RawInput::Pointer { phase: PointerPhase::Move, .. }
    )
}

/// Offsets and absolute styles of `item` are relative to `container` only
/// when the container is its offset parent.
fn is_offset_parent(container: &HtmlElement, item: &HtmlElement) -> bool {
    item.offset_parent().is_some_and(|parent| parent == **container)
}

/// Schedule `callback` for the next animation frame.
fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(_) => true,
        Err(err) => {
            log::warn!("requestAnimationFrame failed: {:?}", err);
            false
        }
    }
}

struct State {
    container: HtmlElement,
    deck: Deck,
    input: InputPipeline,
    controller: InteractionController<ElementCapture>,
    elements: Vec<(ItemId, HtmlElement)>,
    layout_warned: bool,
}

impl State {
    /// Pull scroll state and flow positions from the DOM layout.
    fn measure(&mut self) {
        let container = &self.container;
        self.deck.set_client_size(Size::new(
            f64::from(container.client_width()),
            f64::from(container.client_height()),
        ));
        for (id, element) in &self.elements {
            let in_flow = self.deck.item(*id).is_some_and(|item| !item.is_absolute());
            if in_flow && !self.layout_warned && !is_offset_parent(container, element) {
                log::warn!("Container is not the offset parent of its items; positions will be off");
                self.layout_warned = true;
            }
            let measured = in_flow.then(|| {
                Point::new(f64::from(element.offset_left()), f64::from(element.offset_top()))
            });
            if let Err(err) = self.deck.set_measured_position(*id, measured) {
                log::warn!("Cannot measure item {}: {}", id, err);
            }
        }
        self.deck.sync_content_size();

        let viewport = &mut self.deck.viewport;
        viewport.content_size = Size::new(
            viewport.content_size.width.max(f64::from(container.scroll_width())),
            viewport.content_size.height.max(f64::from(container.scroll_height())),
        );
        viewport.set_scroll(Vec2::new(
            f64::from(container.scroll_left()),
            f64::from(container.scroll_top()),
        ));
    }

    /// Process a DOM event. Returns true when held-back moves need a frame
    /// callback.
    fn handle(&mut self, event: &Event) -> bool {
        let rect = self.container.get_bounding_client_rect();
        let Some(raw) = raw_input(event, Point::new(rect.left(), rect.top())) else {
            return false;
        };
        for sample in self.input.push(&raw) {
            self.dispatch(&sample);
        }
        if is_move(&raw) && (self.controller.is_panning() || self.controller.is_dragging_item()) {
            // Keep the browser from selecting text while dragging.
            event.prevent_default();
        }
        self.input.take_frame_request()
    }

    fn dispatch(&mut self, sample: &PointerSample) {
        if sample.phase == Phase::Down {
            self.measure();
        }
        for drag_event in self.controller.handle(sample, &mut self.deck) {
            self.apply(drag_event);
        }
    }

    /// Apply the moves coalesced during the last frame.
    fn end_frame(&mut self) {
        for sample in self.input.end_frame() {
            self.dispatch(&sample);
        }
    }

    fn element(&self, id: ItemId) -> Option<&HtmlElement> {
        self.elements
            .iter()
            .find(|(item, _)| *item == id)
            .map(|(_, element)| element)
    }

    fn apply(&self, event: DragEvent) {
        match event {
            DragEvent::PanStarted { scroll, .. }
            | DragEvent::Panned { scroll, .. }
            | DragEvent::PanEnded { scroll, .. } => {
                self.container.set_scroll_left(scroll.x.round() as i32);
                self.container.set_scroll_top(scroll.y.round() as i32);
            }
            DragEvent::ItemDragStarted { item, position, .. }
            | DragEvent::ItemMoved { item, position, .. }
            | DragEvent::ItemDropped {
                item,
                position,
                placement: Placement::Absolute { .. },
                ..
            } => {
                if let Some(element) = self.element(item) {
                    set_absolute(element, position);
                }
            }
            DragEvent::ItemDropped {
                item,
                placement: Placement::Flow,
                ..
            } => {
                if let Some(element) = self.element(item) {
                    clear_absolute(element);
                }
            }
        }
    }
}

fn set_absolute(element: &HtmlElement, position: Point) {
    let style = element.style();
    let result = style
        .set_property("position", "absolute")
        .and_then(|_| style.set_property("left", &format!("{}px", position.x)))
        .and_then(|_| style.set_property("top", &format!("{}px", position.y)));
    if let Err(err) = result {
        log::warn!("Failed to position item: {:?}", err);
    }
}

fn clear_absolute(element: &HtmlElement) {
    let style = element.style();
    for property in ["position", "left", "top"] {
        if let Err(err) = style.remove_property(property) {
            log::warn!("Failed to reset {}: {:?}", property, err);
        }
    }
}

/// A DOM container whose children can be panned and dragged.
#[wasm_bindgen]
pub struct WebDeck {
    state: Rc<RefCell<State>>,
    listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

#[wasm_bindgen]
impl WebDeck {
    /// Attach to `container`. Its element children become the deck items.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, config_json: Option<String>) -> Result<WebDeck, JsValue> {
        let config = match config_json {
            Some(json) => DeckConfig::from_json(&json).map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => DeckConfig::default(),
        };

        let client = Size::new(
            f64::from(container.client_width()),
            f64::from(container.client_height()),
        );
        let mut deck = Deck::new(client, &config);
        let mut elements = Vec::new();
        let children = container.children();
        for index in 0..children.length() {
            let Some(element) = children.item(index).and_then(|e| e.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let item = Item::new(Size::new(
                f64::from(element.offset_width()),
                f64::from(element.offset_height()),
            ));
            let id = item.id;
            deck.insert_item(item)
                .map_err(|err| JsValue::from_str(&err.to_string()))?;
            elements.push((id, element));
        }
        log::info!("DragDeck attached with {} items", elements.len());
        if elements.iter().any(|(_, element)| !is_offset_parent(&container, element)) {
            log::info!("Positioning container so item offsets are relative to it");
            container.style().set_property("position", "relative")?;
        }

        let capture = ElementCapture {
            element: container.clone().into(),
        };
        let mut state = State {
            input: InputPipeline::new(&config),
            controller: InteractionController::with_capture(config, capture),
            container: container.clone(),
            deck,
            elements,
            layout_warned: false,
        };
        state.measure();
        let state = Rc::new(RefCell::new(state));

        let frame_state = Rc::clone(&state);
        let frame = Rc::new(Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            if let Ok(mut state) = frame_state.try_borrow_mut() {
                state.end_frame();
            }
        }));

        let mut listeners = Vec::with_capacity(EVENTS.len());
        for name in EVENTS {
            let handler_state = Rc::clone(&state);
            let handler_frame = Rc::clone(&frame);
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let wants_frame = match handler_state.try_borrow_mut() {
                    Ok(mut state) => state.handle(&event),
                    Err(_) => false,
                };
                if wants_frame && !request_frame(&handler_frame) {
                    if let Ok(mut state) = handler_state.try_borrow_mut() {
                        state.end_frame();
                    }
                }
            });
            container.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            listeners.push((name, closure));
        }

        Ok(WebDeck { state, listeners })
    }

    /// Re-read layout after the container or its items changed size.
    pub fn refresh(&self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.measure();
        }
    }

    /// End all drags, e.g. when the page loses focus.
    pub fn cancel(&self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            let state = &mut *state;
            let events = state.controller.cancel_all(&mut state.deck);
            for event in events {
                state.apply(event);
            }
        }
    }

    /// Current scroll offset as `[x, y]`.
    #[wasm_bindgen(js_name = scrollOffset)]
    pub fn scroll_offset(&self) -> js_sys::Array {
        let scroll = self.state.borrow().deck.viewport.scroll;
        js_sys::Array::of2(&JsValue::from_f64(scroll.x), &JsValue::from_f64(scroll.y))
    }
}

impl Drop for WebDeck {
    fn drop(&mut self) {
        let state = self.state.borrow();
        for (name, closure) in &self.listeners {
            let removed = state
                .container
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            if let Err(err) = removed {
                log::warn!("Failed to remove {} listener: {:?}", name, err);
            }
        }
    }
}

/// Initialize logging for the WASM build.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"DragDeck logger already initialized".into());
    }
    log::info!("DragDeck (WASM) ready");
}
