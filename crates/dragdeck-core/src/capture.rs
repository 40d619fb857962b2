//! Exclusive pointer capture.
//!
//! Capture keeps delivering a pointer's samples to the deck after it leaves
//! the container. It is optional: the controller checks pointer ids on every
//! sample, so a backend that cannot capture only loses samples, never
//! correctness.

use crate::error::CaptureError;
use crate::input::PointerId;
use std::collections::HashSet;

/// Platform capability for routing a pointer's input exclusively to the deck.
pub trait PointerCapture {
    /// Start capturing `pointer_id`.
    fn capture(&mut self, pointer_id: PointerId) -> Result<(), CaptureError>;

    /// Stop capturing `pointer_id`.
    fn release(&mut self, pointer_id: PointerId) -> Result<(), CaptureError>;

    /// Whether `pointer_id` is currently captured.
    fn has_capture(&self, pointer_id: PointerId) -> bool;
}

/// Backend without capture support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn capture(&mut self, _pointer_id: PointerId) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    fn release(&mut self, _pointer_id: PointerId) -> Result<(), CaptureError> {
        Err(CaptureError::Unsupported)
    }

    fn has_capture(&self, _pointer_id: PointerId) -> bool {
        false
    }
}

/// In-memory capture bookkeeping, for replay and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingCapture {
    captured: HashSet<PointerId>,
}

impl RecordingCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently captured pointers.
    pub fn captured(&self) -> impl Iterator<Item = PointerId> + '_ {
        self.captured.iter().copied()
    }
}

impl PointerCapture for RecordingCapture {
    fn capture(&mut self, pointer_id: PointerId) -> Result<(), CaptureError> {
        self.captured.insert(pointer_id);
        Ok(())
    }

    fn release(&mut self, pointer_id: PointerId) -> Result<(), CaptureError> {
        if self.captured.remove(&pointer_id) {
            Ok(())
        } else {
            Err(CaptureError::InvalidPointer(pointer_id))
        }
    }

    fn has_capture(&self, pointer_id: PointerId) -> bool {
        self.captured.contains(&pointer_id)
    }
}
