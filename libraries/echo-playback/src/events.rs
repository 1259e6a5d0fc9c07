//! Playback Events
//!
//! Event-based communication for the rendering layer. Events are queued by
//! the controller whenever a committed transition changes something a view
//! would show, and drained with
//! [`PlaybackController::drain_events`](crate::PlaybackController::drain_events).

use crate::types::{Phase, PlaybackState};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlaybackEvent {
    /// Phase or play intent changed
    StateChanged {
        phase: Phase,
        is_playing: bool,
    },

    /// A different queue entry became current
    TrackChanged {
        /// Index of the new track
        index: usize,
        /// ID of the new (current) track
        track_id: String,
        /// ID of the previous track (if any)
        previous_track_id: Option<String>,
    },

    /// Queue replaced by a new play action
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Shuffle or repeat flag changed
    ModeChanged { is_shuffle: bool, is_repeat: bool },

    /// Position or duration changed
    PositionUpdate {
        /// Current playback position in seconds
        current_time: f64,
        /// Total track duration in seconds
        duration: f64,
    },

    /// Transport bar shown or hidden
    VisibilityChanged { is_visible: bool },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Recoverable playback failure
    Error {
        /// Error message
        message: String,
    },
}

/// Derive the non-track events implied by moving from `before` to `after`
///
/// Track and queue changes need the queue to resolve IDs and are emitted by
/// the controller itself.
pub fn diff_events(before: &PlaybackState, after: &PlaybackState) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();

    if before.phase != after.phase || before.is_playing != after.is_playing {
        events.push(PlaybackEvent::StateChanged {
            phase: after.phase,
            is_playing: after.is_playing,
        });
    }

    if before.volume != after.volume {
        events.push(PlaybackEvent::VolumeChanged {
            level: after.volume.level(),
            is_muted: after.volume.is_muted(),
        });
    }

    if before.is_shuffle != after.is_shuffle || before.is_repeat != after.is_repeat {
        events.push(PlaybackEvent::ModeChanged {
            is_shuffle: after.is_shuffle,
            is_repeat: after.is_repeat,
        });
    }

    if before.current_time != after.current_time || before.duration != after.duration {
        events.push(PlaybackEvent::PositionUpdate {
            current_time: after.current_time,
            duration: after.duration,
        });
    }

    if before.is_visible != after.is_visible {
        events.push(PlaybackEvent::VisibilityChanged {
            is_visible: after.is_visible,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_state_emits_nothing() {
        let state = PlaybackState::default();
        assert!(diff_events(&state, &state).is_empty());
    }

    #[test]
    fn play_intent_change_emits_state_changed() {
        let before = PlaybackState::default();
        let after = PlaybackState {
            is_playing: true,
            phase: Phase::Loading,
            ..before
        };

        assert_eq!(
            diff_events(&before, &after),
            vec![PlaybackEvent::StateChanged {
                phase: Phase::Loading,
                is_playing: true
            }]
        );
    }

    #[test]
    fn mute_emits_volume_changed() {
        let before = PlaybackState::default();
        let mut after = before;
        after.volume.mute();

        assert_eq!(
            diff_events(&before, &after),
            vec![PlaybackEvent::VolumeChanged {
                level: 80,
                is_muted: true
            }]
        );
    }

    #[test]
    fn close_emits_state_and_visibility() {
        let before = PlaybackState {
            phase: Phase::Playing,
            is_playing: true,
            is_visible: true,
            ..PlaybackState::default()
        };
        let after = PlaybackState {
            phase: Phase::Paused,
            is_playing: false,
            is_visible: false,
            ..before
        };

        let events = diff_events(&before, &after);
        assert_eq!(events.len(), 2);
        assert!(events.contains(&PlaybackEvent::VisibilityChanged { is_visible: false }));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlaybackEvent::QueueChanged { length: 3 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"queueChanged","length":3}"#);
    }
}
