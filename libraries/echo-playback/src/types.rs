//! Core types for playback control

use crate::time::{format_clock, parse_clock};
use crate::volume::Volume;
use serde::{Deserialize, Deserializer, Serialize};

/// Artist reference carried by a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRef {
    /// Catalog identifier, absent for ad-hoc uploads
    #[serde(default)]
    pub id: Option<String>,

    /// Display name
    pub name: String,
}

/// Playable media item supplied by the catalog
///
/// Immutable once loaded into a queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Catalog identifier
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist reference
    pub artist: ArtistRef,

    /// Cover image URL
    #[serde(default)]
    pub cover: Option<String>,

    /// Streamable source URL handed to the media element
    pub src: String,

    /// Duration in seconds, when the catalog knows it
    ///
    /// Accepts either seconds or a clock string (`"3:45"`).
    #[serde(default, deserialize_with = "deserialize_duration")]
    pub duration: Option<f64>,
}

/// Seconds or clock-string duration; unparseable labels become `None`
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CatalogDuration {
        Seconds(f64),
        Clock(String),
    }

    Ok(match Option::<CatalogDuration>::deserialize(deserializer)? {
        Some(CatalogDuration::Seconds(seconds)) => Some(seconds),
        Some(CatalogDuration::Clock(label)) => parse_clock(&label),
        None => None,
    })
}

impl Track {
    /// Duration rendered as a clock string (`3:45`), if known
    pub fn duration_label(&self) -> Option<String> {
        self.duration.map(format_clock)
    }
}

/// Per-track lifecycle phase
///
/// ```text
/// Idle → Loading → Playing ⇄ Paused → Ended → Playing (repeat)
///                                           → Loading (next track)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing loaded
    #[default]
    Idle,

    /// Source handed to the media element, waiting for metadata
    Loading,

    /// Media is running
    Playing,

    /// Media is halted mid-track
    Paused,

    /// Media reached its end
    ///
    /// Transient: end of track always continues (repeat or next), so this
    /// phase only exists inside that transition and is never committed.
    Ended,
}

impl Phase {
    /// Whether media notifications for the loaded source should be honored
    pub fn has_media(self) -> bool {
        matches!(self, Phase::Playing | Phase::Paused | Phase::Ended)
    }
}

/// Transient playback state
///
/// A single value describes "what is playing and how". Transitions replace it
/// wholesale, see [`crate::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Lifecycle phase of the current track
    pub phase: Phase,

    /// Index into the queue, `None` when the queue is empty
    pub current_index: Option<usize>,

    /// User intent to be playing
    pub is_playing: bool,

    /// Volume level and mute flag
    #[serde(flatten)]
    pub volume: Volume,

    /// Shuffle flag, consulted by `next`
    pub is_shuffle: bool,

    /// Repeat-one flag, consulted at end of track
    pub is_repeat: bool,

    /// Media position in seconds
    pub current_time: f64,

    /// Media duration in seconds (0 until metadata arrives)
    pub duration: f64,

    /// Whether the transport bar is shown
    pub is_visible: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            current_index: None,
            is_playing: false,
            volume: Volume::default(),
            is_shuffle: false,
            is_repeat: false,
            current_time: 0.0,
            duration: 0.0,
            is_visible: false,
        }
    }
}

/// Read-only view handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub current_track: Option<Track>,
    pub queue_length: usize,
    pub progress: f64,
    /// Audible gain (0 while muted)
    pub gain: f64,
    pub current_time_label: String,
    pub duration_label: String,
}
