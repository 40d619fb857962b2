//! Replay of recorded input traces against a deck scene.
//!
//! A scene file describes the container and its items; a trace file holds
//! raw input grouped into rendering frames:
//!
//! ```json
//! { "frames": [
//!     [ { "source": "mouse", "phase": "down", "x": 300, "y": 200 } ],
//!     [ { "source": "mouse", "phase": "move", "x": 200, "y": 200 } ]
//! ] }
//! ```

use crate::host::InputPipeline;
use dragdeck_core::{
    ConfigError, Deck, DeckConfig, DeckError, DragEvent, FrameOutput, InteractionController, Item,
    ItemId, Placement, RawInput, RecordingCapture,
};
use kurbo::{Point, Size, Vec2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

fn read_json<T: DeserializeOwned>(path: &Path) -> ReplayResult<T> {
    let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ReplayError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Container geometry, items and configuration to replay against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub config: DeckConfig,
    /// Visible size of the container.
    pub client_size: Size,
    /// Initial scroll offset.
    #[serde(default)]
    pub scroll: Vec2,
    pub items: Vec<Item>,
}

impl Scene {
    pub fn load(path: &Path) -> ReplayResult<Self> {
        read_json(path)
    }

    /// Build the deck described by this scene.
    pub fn build(&self) -> ReplayResult<Deck> {
        self.config.validate()?;
        let mut deck = Deck::new(self.client_size, &self.config);
        for item in &self.items {
            deck.insert_item(item.clone())?;
        }
        deck.viewport.set_scroll(self.scroll);
        Ok(deck)
    }
}

/// Recorded raw input, one inner list per rendering frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    pub frames: Vec<Vec<RawInput>>,
}

impl Trace {
    pub fn load(path: &Path) -> ReplayResult<Self> {
        read_json(path)
    }

    /// Number of raw inputs across all frames.
    pub fn input_count(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }
}

/// Final state of one item after a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemState {
    pub id: ItemId,
    pub position: Point,
    pub placement: Placement,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub events: Vec<DragEvent>,
    /// Presentation state at the end of each frame.
    pub frames: Vec<FrameOutput>,
    pub scroll: Vec2,
    pub items: Vec<ItemState>,
}

/// Run a trace against a scene.
pub fn replay(scene: &Scene, trace: &Trace) -> ReplayResult<ReplayOutcome> {
    let mut deck = scene.build()?;
    let config = scene.config.clone();
    let mut pipeline = InputPipeline::new(&config);
    let mut controller = InteractionController::with_capture(config, RecordingCapture::new());
    let mut events = Vec::new();
    let mut frames = Vec::with_capacity(trace.frames.len());

    for (index, frame) in trace.frames.iter().enumerate() {
        for raw in frame {
            for sample in pipeline.push(raw) {
                events.extend(controller.handle(&sample, &mut deck));
            }
        }
        for sample in pipeline.end_frame() {
            events.extend(controller.handle(&sample, &mut deck));
        }
        let output = controller.frame_output(&deck);
        log::trace!("Frame {}: {:?}", index, output);
        frames.push(output);
    }

    let items = deck
        .items()
        .iter()
        .filter_map(|item| {
            deck.item_position(item.id).map(|position| ItemState {
                id: item.id,
                position,
                placement: item.placement,
            })
        })
        .collect();

    log::info!(
        "Replayed {} inputs in {} frames, {} events",
        trace.input_count(),
        trace.frames.len(),
        events.len()
    );

    Ok(ReplayOutcome {
        events,
        frames,
        scroll: deck.viewport.scroll,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENE: &str = r#"{
        "config": { "pan_speed": 3, "item_gap": 10 },
        "client_size": { "width": 300, "height": 200 },
        "items": [
            { "id": "6b1f3a2e-0000-4000-8000-000000000001", "size": { "width": 100, "height": 100 } },
            { "id": "6b1f3a2e-0000-4000-8000-000000000002", "size": { "width": 100, "height": 100 } },
            { "id": "6b1f3a2e-0000-4000-8000-000000000003", "size": { "width": 100, "height": 100 } },
            { "id": "6b1f3a2e-0000-4000-8000-000000000004", "size": { "width": 100, "height": 100 } }
        ]
    }"#;

    fn scene() -> Scene {
        serde_json::from_str(SCENE).unwrap()
    }

    fn trace(json: &str) -> Trace {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_scene_builds_deck() {
        let deck = scene().build().unwrap();
        assert_eq!(deck.len(), 4);
        assert!((deck.viewport.content_size.width - 430.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_replay_pan() {
        let trace = trace(
            r#"{ "frames": [
                [ { "source": "mouse", "phase": "down", "x": 200, "y": 150 } ],
                [ { "source": "mouse", "phase": "move", "x": 180, "y": 150 } ],
                [ { "source": "mouse", "phase": "up", "x": 180, "y": 150 } ]
            ] }"#,
        );
        let outcome = replay(&scene(), &trace).unwrap();

        assert_eq!(outcome.frames.len(), 3);
        assert_eq!(outcome.frames[1].scroll, Vec2::new(60.0, 0.0));
        assert_eq!(outcome.scroll, Vec2::new(60.0, 0.0));
        assert!(matches!(outcome.events.last(), Some(DragEvent::PanEnded { .. })));
    }

    #[test]
    fn test_replay_item_drag() {
        let trace = trace(
            r#"{ "frames": [
                [ { "source": "pointer", "phase": "down", "pointer_id": 2, "pointer_type": "touch", "x": 150, "y": 50 } ],
                [ { "source": "pointer", "phase": "move", "pointer_id": 2, "pointer_type": "touch", "x": 170, "y": 80 } ],
                [ { "source": "pointer", "phase": "up", "pointer_id": 2, "pointer_type": "touch", "x": 170, "y": 80 } ]
            ] }"#,
        );
        let outcome = replay(&scene(), &trace).unwrap();
        let moved = outcome
            .items
            .iter()
            .find(|item| item.placement != Placement::Flow)
            .unwrap();
        assert_eq!(moved.position, Point::new(130.0, 30.0));
    }

    #[test]
    fn test_replay_coalesces_moves() {
        let mut scene = scene();
        scene.config.coalesce_moves = true;
        let trace = trace(
            r#"{ "frames": [
                [ { "source": "mouse", "phase": "down", "x": 200, "y": 150 },
                  { "source": "mouse", "phase": "move", "x": 195, "y": 150 },
                  { "source": "mouse", "phase": "move", "x": 190, "y": 150 } ]
            ] }"#,
        );
        let outcome = replay(&scene, &trace).unwrap();
        let panned = outcome
            .events
            .iter()
            .filter(|event| matches!(event, DragEvent::Panned { .. }))
            .count();
        assert_eq!(panned, 1);
        assert_eq!(outcome.scroll, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn test_invalid_scene_config() {
        let mut scene = scene();
        scene.config.pan_speed = -1.0;
        let err = replay(&scene, &Trace::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Config(_)));
    }

    #[test]
    fn test_load_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENE.as_bytes()).unwrap();
        let scene = Scene::load(file.path()).unwrap();
        assert_eq!(scene.items.len(), 4);

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        broken.write_all(b"{ \"frames\": [").unwrap();
        assert!(matches!(Trace::load(broken.path()), Err(ReplayError::Json { .. })));
    }
}
