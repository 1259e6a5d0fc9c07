//! Platform-agnostic media element
//!
//! Abstracts the streaming media primitive the controller drives. In the
//! browser this is an `HTMLAudioElement` (see the `wasm` feature); headless
//! hosts and tests use [`NullMedia`] or [`RecordingMedia`].

use crate::error::{PlaybackError, Result};

/// Streaming media primitive
///
/// The controller is the only writer. Every method is fire-and-forget except
/// [`MediaElement::play`], whose synchronous failure is reported back to the
/// controller as a rejected start. Asynchronous outcomes (metadata, time
/// updates, end of media, late rejections) arrive as [`MediaEvent`]s.
pub trait MediaElement {
    /// Point the element at a new source, discarding the previous one
    fn load(&mut self, src: &str);

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Halt playback, keeping the position
    fn pause(&mut self);

    /// Move the playback position (seconds)
    fn seek(&mut self, position: f64);

    /// Set output gain (`0.0..=1.0`)
    fn set_volume(&mut self, gain: f64);

    /// Mute or unmute without touching the gain
    fn set_muted(&mut self, muted: bool);
}

/// Instruction issued to the media element by a committed transition
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    /// Load the queue entry at `index`
    Load { index: usize },
    Play,
    Pause,
    Seek(f64),
    /// Gain in `0.0..=1.0`
    SetVolume(f64),
    SetMuted(bool),
}

/// Notification raised by the media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration became known for the loaded source
    MetadataLoaded { duration: f64 },

    /// Position advanced
    TimeUpdate { current_time: f64 },

    /// Playback actually started
    Playing,

    /// Playback halted by the platform (headset unplugged, OS media keys)
    Paused,

    /// Reached end of media
    Ended,

    /// Playback could not start (autoplay policy, network, bad source)
    PlayRejected { reason: String },
}

/// Media element that does nothing
///
/// For hosts that only need queue/transport state (server-side rendering,
/// remote-control views).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMedia;

impl MediaElement for NullMedia {
    fn load(&mut self, _src: &str) {}

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, _position: f64) {}

    fn set_volume(&mut self, _gain: f64) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Call recorded by [`RecordingMedia`]
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
}

/// Media element that records every call
///
/// Mirrors what a real element would hold (source, position, gain, mute) so
/// tests can assert on the effect of a command sequence. Can be told to
/// reject `play()` to simulate autoplay policy failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingMedia {
    pub calls: Vec<MediaCall>,
    pub src: Option<String>,
    pub position: f64,
    pub gain: f64,
    pub muted: bool,
    pub playing: bool,
    reject_play: Option<String>,
}

impl RecordingMedia {
    pub fn new() -> Self {
        Self {
            gain: 1.0,
            ..Self::default()
        }
    }

    /// Make subsequent `play()` calls fail with `reason`
    pub fn reject_play(&mut self, reason: impl Into<String>) {
        self.reject_play = Some(reason.into());
    }

    /// Let `play()` succeed again
    pub fn allow_play(&mut self) {
        self.reject_play = None;
    }

    /// Drop recorded calls, keeping element state
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl MediaElement for RecordingMedia {
    fn load(&mut self, src: &str) {
        self.calls.push(MediaCall::Load(src.to_string()));
        self.src = Some(src.to_string());
        self.position = 0.0;
        self.playing = false;
    }

    fn play(&mut self) -> Result<()> {
        self.calls.push(MediaCall::Play);
        if let Some(reason) = &self.reject_play {
            self.playing = false;
            return Err(PlaybackError::MediaRejected(reason.clone()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(MediaCall::Pause);
        self.playing = false;
    }

    fn seek(&mut self, position: f64) {
        self.calls.push(MediaCall::Seek(position));
        self.position = position;
    }

    fn set_volume(&mut self, gain: f64) {
        self.calls.push(MediaCall::SetVolume(gain));
        self.gain = gain;
    }

    fn set_muted(&mut self, muted: bool) {
        self.calls.push(MediaCall::SetMuted(muted));
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_media_tracks_element_state() {
        let mut media = RecordingMedia::new();
        media.load("https://stream.test/a.mp3");
        media.play().unwrap();
        media.seek(42.0);
        media.set_volume(0.5);
        media.set_muted(true);

        assert_eq!(media.src.as_deref(), Some("https://stream.test/a.mp3"));
        assert!(media.playing);
        assert_eq!(media.position, 42.0);
        assert_eq!(media.gain, 0.5);
        assert!(media.muted);
        assert_eq!(media.calls.len(), 5);
    }

    #[test]
    fn load_resets_position() {
        let mut media = RecordingMedia::new();
        media.load("a");
        media.seek(10.0);
        media.load("b");
        assert_eq!(media.position, 0.0);
    }

    #[test]
    fn rejected_play_reports_reason() {
        let mut media = RecordingMedia::new();
        media.reject_play("NotAllowedError");

        let err = media.play().unwrap_err();
        assert_eq!(
            err,
            PlaybackError::MediaRejected("NotAllowedError".to_string())
        );
        assert!(!media.playing);

        media.allow_play();
        assert!(media.play().is_ok());
    }
}
