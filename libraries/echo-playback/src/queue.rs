//! Playback queue
//!
//! Ordered tracks from the most recent "play this" action. The queue is
//! replaced wholesale on every load; there is no merging or appending.
//!
//! The current index lives in [`crate::types::PlaybackState`] so that a
//! transition can move it together with the rest of the state. The queue only
//! answers index arithmetic questions about its own length.

use crate::types::Track;

#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// Replace all tracks
    ///
    /// Returns the previous tracks so callers can log what was discarded.
    pub fn replace(&mut self, tracks: Vec<Track>) -> Vec<Track> {
        std::mem::replace(&mut self.tracks, tracks)
    }

    /// Track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Clamp a requested start index into `0..len`
///
/// Returns `None` for an empty queue.
pub fn clamp_index(index: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(index.min(len - 1))
    }
}

/// Next index in linear order, wrapping to the start
pub fn next_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some((current + 1) % len)
    }
}

/// Previous index in linear order, wrapping to the end
pub fn previous_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some((current % len + len - 1) % len)
    }
}
