//! Echo Player - Playback Controller
//!
//! Platform-agnostic playback state for the Echo Player web app.
//!
//! This crate provides:
//! - A single playback controller owning the queue and the media element
//! - Linear and shuffled navigation with repeat-one
//! - Seek by seconds, by fraction, or relative to the position
//! - Volume control (0-100, mute/unmute, linear or logarithmic gain)
//! - Playback events for the rendering layer
//! - Layered configuration (defaults, TOML file, environment)
//!
//! # Architecture
//!
//! `echo-playback` knows nothing about the DOM:
//! - State changes are computed by a pure transition function
//! - The controller commits the new state, then drives a [`MediaElement`]
//! - Media notifications come back in as [`MediaEvent`]s
//!
//! The browser binding (`wasm` feature) wraps an `HTMLAudioElement` and
//! exposes the controller to JavaScript.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use echo_playback::{ArtistRef, NullMedia, PlaybackController, Track};
//!
//! let mut controller = PlaybackController::<NullMedia>::default();
//!
//! let track = Track {
//!     id: "t1".to_string(),
//!     title: "My Song".to_string(),
//!     artist: ArtistRef {
//!         id: Some("a1".to_string()),
//!         name: "Artist Name".to_string(),
//!     },
//!     cover: None,
//!     src: "https://cdn.example.com/t1.mp3".to_string(),
//!     duration: Some(180.0),
//! };
//!
//! controller.load_queue_and_play(vec![track], 0);
//! assert!(controller.is_playing());
//!
//! controller.toggle_play_pause();
//! assert!(!controller.is_playing());
//! ```
//!
//! # Example: Shuffle, Repeat and Volume
//!
//! ```rust
//! use echo_playback::{NullMedia, PlaybackController};
//!
//! let mut controller = PlaybackController::<NullMedia>::default();
//!
//! controller.toggle_shuffle();
//! controller.toggle_repeat();
//!
//! controller.set_volume(0);
//! assert!(controller.is_muted());
//!
//! controller.set_volume(50);
//! assert!(!controller.is_muted());
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust
//! use echo_playback::{MediaElement, MediaEvent, PlaybackConfig, PlaybackController, Result};
//!
//! // Implement MediaElement for your platform
//! struct MyPlayer;
//!
//! impl MediaElement for MyPlayer {
//!     fn load(&mut self, _src: &str) {}
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: f64) {}
//!     fn set_volume(&mut self, _gain: f64) {}
//!     fn set_muted(&mut self, _muted: bool) {}
//! }
//!
//! let mut controller = PlaybackController::new(MyPlayer, PlaybackConfig::default());
//!
//! // Forward platform notifications
//! controller.handle_media_event(MediaEvent::MetadataLoaded { duration: 200.0 });
//!
//! // Render from events
//! for event in controller.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod config;
mod controller;
mod error;
pub mod events;
pub mod media;
pub mod queue;
pub mod shuffle;
pub mod time;
pub mod transition;
pub mod types;
pub mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use media::{MediaCall, MediaCommand, MediaElement, MediaEvent, NullMedia, RecordingMedia};
pub use types::{ArtistRef, Phase, PlaybackState, PlayerSnapshot, Track};
pub use volume::{Volume, VolumeCurve};
