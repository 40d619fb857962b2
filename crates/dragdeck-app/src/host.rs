//! Input pipeline shared by the replay and browser hosts.

use dragdeck_core::{DeckConfig, InputNormalizer, MoveCoalescer, PointerSample, RawInput};

/// Normalizes raw input and, when `coalesce_moves` is set, holds moves back
/// until the end of the rendering frame.
#[derive(Debug, Clone)]
pub struct InputPipeline {
    normalizer: InputNormalizer,
    coalescer: MoveCoalescer,
    coalesce: bool,
    frame_requested: bool,
}

impl InputPipeline {
    pub fn new(config: &DeckConfig) -> Self {
        Self {
            normalizer: InputNormalizer::new(config.primary_button_only),
            coalescer: MoveCoalescer::new(),
            coalesce: config.coalesce_moves,
            frame_requested: false,
        }
    }

    /// Feed one raw input. Returns the samples ready to process now.
    pub fn push(&mut self, raw: &RawInput) -> Vec<PointerSample> {
        let Some(sample) = self.normalizer.normalize(raw) else {
            return Vec::new();
        };
        if self.coalesce {
            self.coalescer.push(sample)
        } else {
            vec![sample]
        }
    }

    /// Whether the host should schedule a frame callback.
    ///
    /// True once while moves are pending, until [`end_frame`](Self::end_frame).
    pub fn take_frame_request(&mut self) -> bool {
        if self.frame_requested || !self.coalescer.has_pending() {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// End of a rendering frame: release the pending moves.
    pub fn end_frame(&mut self) -> Vec<PointerSample> {
        self.frame_requested = false;
        self.coalescer.flush()
    }
}
