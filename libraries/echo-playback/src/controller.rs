//! Playback controller - single source of truth for what is playing
//!
//! Owns the queue, the playback state and the media element. Every intent
//! runs one [`transition::step`], commits the resulting state, then issues the
//! media commands and queues events for the rendering layer.

use crate::{
    config::PlaybackConfig,
    error::{PlaybackError, Result},
    events::{diff_events, PlaybackEvent},
    media::{MediaCommand, MediaElement, MediaEvent, NullMedia},
    queue::Queue,
    time::format_clock,
    transition::{self, Context, Intent},
    types::{PlaybackState, PlayerSnapshot, Track},
    volume::Volume,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Playback controller
///
/// One instance per application session. Consumers receive it (or a handle
/// to it) explicitly; there is no global.
pub struct PlaybackController<M: MediaElement> {
    /// Current playback state, replaced wholesale by each transition
    state: PlaybackState,

    /// Tracks of the active play action
    queue: Queue,

    /// Streaming media primitive, exclusively driven from here
    media: M,

    config: PlaybackConfig,

    /// Randomness for shuffle picks
    rng: StdRng,

    /// ID of the track whose source the media element currently holds
    loaded_track_id: Option<String>,

    /// Events emitted since the last drain
    pending_events: Vec<PlaybackEvent>,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Create a new controller around a media element
    pub fn new(media: M, config: PlaybackConfig) -> Self {
        let config = config.validate();

        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let state = PlaybackState {
            volume: Volume::new(config.volume),
            is_shuffle: config.shuffle,
            is_repeat: config.repeat,
            ..PlaybackState::default()
        };

        let mut controller = Self {
            state,
            queue: Queue::new(),
            media,
            config,
            rng,
            loaded_track_id: None,
            pending_events: Vec::new(),
        };

        // Bring the element in line with the configured volume
        controller
            .media
            .set_volume(state.volume.gain(controller.config.volume_curve));
        controller.media.set_muted(state.volume.is_muted());

        controller
    }

    // ===== Queue =====

    /// Replace the queue and start playing at `start_index`
    ///
    /// The index is clamped into range. An empty track list is ignored and
    /// leaves the current queue untouched.
    pub fn load_queue_and_play(&mut self, tracks: Vec<Track>, start_index: usize) {
        if tracks.is_empty() {
            debug!("Ignoring play request with empty track list");
            return;
        }

        let len = tracks.len();
        let discarded = self.queue.replace(tracks);
        info!(
            "Loaded queue of {} tracks at index {} (discarded {})",
            len,
            start_index.min(len - 1),
            discarded.len()
        );

        self.pending_events
            .push(PlaybackEvent::QueueChanged { length: len });
        self.dispatch(Intent::Load {
            len,
            start: start_index,
        });
    }

    /// Jump to a queue entry and play it
    pub fn play_index(&mut self, index: usize) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        if index >= self.queue.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        self.dispatch(Intent::JumpTo(index));
        Ok(())
    }

    // ===== Transport =====

    /// Flip between playing and paused
    pub fn toggle_play_pause(&mut self) {
        self.dispatch(Intent::TogglePlayPause);
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.dispatch(Intent::Play);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.dispatch(Intent::Pause);
    }

    /// Skip to next track (random pick when shuffling)
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.dispatch(Intent::Next);
    }

    /// Go to previous track (always linear)
    pub fn previous(&mut self) {
        self.dispatch(Intent::Previous);
    }

    /// Hide the player and pause; the queue is kept
    pub fn close(&mut self) {
        self.dispatch(Intent::Close);
    }

    /// Reveal a closed player without resuming it
    pub fn show(&mut self) {
        self.dispatch(Intent::Show);
    }

    // ===== Seek =====

    /// Seek to position in seconds
    ///
    /// Play intent is unchanged: a playing track keeps playing.
    pub fn seek(&mut self, to_seconds: f64) {
        self.dispatch(Intent::Seek(to_seconds));
    }

    /// Seek by progress-bar fraction (0.0 - 1.0)
    pub fn seek_to_percent(&mut self, fraction: f64) -> Result<()> {
        if self.current_track().is_none() {
            return Err(PlaybackError::QueueEmpty);
        }

        let duration = self.effective_duration();
        if duration <= 0.0 {
            return Err(PlaybackError::DurationUnknown);
        }

        self.dispatch(Intent::Seek(fraction.clamp(0.0, 1.0) * duration));
        Ok(())
    }

    /// Seek relative to the current position
    pub fn seek_by(&mut self, delta_seconds: f64) {
        self.dispatch(Intent::Seek(self.state.current_time + delta_seconds));
    }

    /// Skip ahead by the configured seek step
    pub fn skip_forward(&mut self) {
        self.seek_by(self.config.seek_step_secs);
    }

    /// Skip back by the configured seek step
    pub fn skip_backward(&mut self) {
        self.seek_by(-self.config.seek_step_secs);
    }

    // ===== Volume =====

    /// Set volume (0-100); 0 mutes, anything else unmutes
    pub fn set_volume(&mut self, level: u8) {
        self.dispatch(Intent::SetVolume(level));
    }

    /// Flip mute, keeping the stored volume
    pub fn toggle_mute(&mut self) {
        self.dispatch(Intent::ToggleMute);
    }

    pub fn mute(&mut self) {
        self.dispatch(Intent::Mute);
    }

    pub fn unmute(&mut self) {
        self.dispatch(Intent::Unmute);
    }

    // ===== Shuffle & Repeat =====

    pub fn toggle_shuffle(&mut self) {
        self.dispatch(Intent::ToggleShuffle);
    }

    pub fn toggle_repeat(&mut self) {
        self.dispatch(Intent::ToggleRepeat);
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.dispatch(Intent::SetShuffle(on));
    }

    pub fn set_repeat(&mut self, on: bool) {
        self.dispatch(Intent::SetRepeat(on));
    }

    // ===== Media notifications =====

    /// Current track reached its end
    ///
    /// Repeats the track when repeat is on, otherwise behaves as [`Self::next`].
    pub fn on_track_ended(&mut self) {
        if let Some(track) = self.current_track() {
            let track_id = track.id.clone();
            self.pending_events
                .push(PlaybackEvent::TrackFinished { track_id });
        }

        self.dispatch(Intent::TrackEnded);
    }

    /// Duration of the loaded source became known
    pub fn on_metadata_loaded(&mut self, duration: f64) {
        self.dispatch(Intent::MetadataLoaded(duration));
    }

    /// Media position advanced
    pub fn on_time_update(&mut self, current_time: f64) {
        self.dispatch(Intent::TimeUpdate(current_time));
    }

    /// Media started running
    pub fn on_playing(&mut self) {
        self.dispatch(Intent::MediaPlaying);
    }

    /// Media was halted by the platform
    pub fn on_paused(&mut self) {
        self.dispatch(Intent::MediaPaused);
    }

    /// Media refused to start
    ///
    /// Recoverable: the transport falls back to paused so the user can retry.
    pub fn on_play_rejected(&mut self, reason: &str) {
        warn!(
            "Playback rejected for {:?}: {}",
            self.loaded_track_id, reason
        );
        self.pending_events.push(PlaybackEvent::Error {
            message: PlaybackError::MediaRejected(reason.to_string()).to_string(),
        });
        self.dispatch(Intent::PlayRejected);
    }

    /// Route a media element notification
    ///
    /// Position and end-of-media notifications that arrive while the next
    /// source is still loading belong to the previous source and are dropped.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        let has_media = self.state.phase.has_media();

        match event {
            MediaEvent::MetadataLoaded { duration } if self.state.current_index.is_some() => {
                self.on_metadata_loaded(duration);
            }
            MediaEvent::TimeUpdate { current_time } if has_media => {
                self.on_time_update(current_time);
            }
            MediaEvent::Ended if has_media => self.on_track_ended(),
            MediaEvent::Playing => self.on_playing(),
            MediaEvent::Paused => self.on_paused(),
            MediaEvent::PlayRejected { reason } => self.on_play_rejected(&reason),
            stale => debug!("Dropping stale media event {:?} in {:?}", stale, self.state.phase),
        }
    }

    // ===== State Queries =====

    /// Get current playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Currently playing track, `None` when the queue is empty
    pub fn current_track(&self) -> Option<&Track> {
        self.state
            .current_index
            .and_then(|index| self.queue.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    /// All tracks in the active queue
    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    pub fn has_track(&self) -> bool {
        self.current_track().is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible
    }

    /// Get current volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.state.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.state.volume.is_muted()
    }

    /// Position as a fraction of the duration (0.0 - 1.0)
    pub fn progress(&self) -> f64 {
        let duration = self.effective_duration();
        if duration > 0.0 {
            (self.state.current_time / duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Everything a transport view needs to render
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.state,
            current_track: self.current_track().cloned(),
            queue_length: self.queue.len(),
            progress: self.progress(),
            gain: self.state.volume.effective_gain(self.config.volume_curve),
            current_time_label: format_clock(self.state.current_time),
            duration_label: format_clock(self.effective_duration()),
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internal =====

    /// Media duration, falling back to the catalog value before metadata
    fn effective_duration(&self) -> f64 {
        if self.state.duration > 0.0 {
            return self.state.duration;
        }

        self.current_track()
            .and_then(|track| track.duration)
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(0.0)
    }

    /// Run one transition and commit it
    fn dispatch(&mut self, intent: Intent) {
        let before = self.state;

        let step = {
            let mut ctx = Context {
                queue_len: self.queue.len(),
                curve: self.config.volume_curve,
                rng: &mut self.rng,
            };
            transition::step(&before, &intent, &mut ctx)
        };

        // Commit before touching the element so re-entrant notifications
        // observe the new state
        self.state = step.state;

        if before != self.state {
            debug!(
                "{:?}: {:?} -> {:?} (index {:?}, playing {})",
                intent, before.phase, self.state.phase, self.state.current_index, self.state.is_playing
            );
        }

        self.pending_events.extend(diff_events(&before, &self.state));

        let mut rejection = None;
        for command in step.commands {
            if let Err(err) = self.issue(command) {
                rejection = Some(err);
            }
        }

        if let Some(err) = rejection {
            let reason = match err {
                PlaybackError::MediaRejected(reason) => reason,
                other => other.to_string(),
            };
            self.on_play_rejected(&reason);
        }
    }

    fn issue(&mut self, command: MediaCommand) -> Result<()> {
        match command {
            MediaCommand::Load { index } => {
                let Some(track) = self.queue.get(index) else {
                    warn!("Load for missing queue index {}", index);
                    return Err(PlaybackError::IndexOutOfBounds(index));
                };

                let track_id = track.id.clone();
                self.media.load(&track.src);

                let previous_track_id = self.loaded_track_id.replace(track_id.clone());
                self.pending_events.push(PlaybackEvent::TrackChanged {
                    index,
                    track_id,
                    previous_track_id,
                });
            }
            MediaCommand::Play => self.media.play()?,
            MediaCommand::Pause => self.media.pause(),
            MediaCommand::Seek(position) => self.media.seek(position),
            MediaCommand::SetVolume(gain) => self.media.set_volume(gain),
            MediaCommand::SetMuted(muted) => self.media.set_muted(muted),
        }

        Ok(())
    }
}

impl Default for PlaybackController<NullMedia> {
    fn default() -> Self {
        Self::new(NullMedia, PlaybackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaCall, RecordingMedia};
    use crate::types::{ArtistRef, Phase};

    fn create_test_track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist: ArtistRef {
                id: None,
                name: "Test Artist".to_string(),
            },
            cover: None,
            src: format!("https://stream.test/{}.mp3", id),
            duration: Some(180.0),
        }
    }

    fn tracks(ids: &[&str]) -> Vec<Track> {
        ids.iter().map(|id| create_test_track(id)).collect()
    }

    fn recording() -> PlaybackController<RecordingMedia> {
        PlaybackController::new(
            RecordingMedia::new(),
            PlaybackConfig {
                shuffle_seed: Some(5),
                ..PlaybackConfig::default()
            },
        )
    }

    #[test]
    fn create_controller() {
        let controller = PlaybackController::<NullMedia>::default();
        assert_eq!(controller.state().phase, Phase::Idle);
        assert_eq!(controller.volume(), 80);
        assert!(controller.current_track().is_none());
        assert!(!controller.is_visible());
    }

    #[test]
    fn new_pushes_configured_volume_to_media() {
        let controller = PlaybackController::new(
            RecordingMedia::new(),
            PlaybackConfig {
                volume: 40,
                ..PlaybackConfig::default()
            },
        );
        assert!((controller.media().gain - 0.4).abs() < 1e-9);
        assert!(!controller.media().muted);
    }

    #[test]
    fn load_hands_source_to_media() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a", "b"]), 1);

        assert_eq!(
            controller.media().src.as_deref(),
            Some("https://stream.test/b.mp3")
        );
        assert!(controller.media().playing);
        assert_eq!(controller.current_track().unwrap().id, "b");
    }

    #[test]
    fn load_emits_queue_and_track_events() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a", "b"]), 0);

        let events = controller.drain_events();
        assert!(events.contains(&PlaybackEvent::QueueChanged { length: 2 }));
        assert!(events.contains(&PlaybackEvent::TrackChanged {
            index: 0,
            track_id: "a".to_string(),
            previous_track_id: None,
        }));
        assert!(!controller.has_pending_events());
    }

    #[test]
    fn next_reports_previous_track() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a", "b"]), 0);
        controller.drain_events();

        controller.next();

        let events = controller.drain_events();
        assert!(events.contains(&PlaybackEvent::TrackChanged {
            index: 1,
            track_id: "b".to_string(),
            previous_track_id: Some("a".to_string()),
        }));
    }

    #[test]
    fn synchronous_rejection_pauses_transport() {
        let mut controller = recording();
        controller.media_mut().reject_play("NotAllowedError");

        controller.load_queue_and_play(tracks(&["a"]), 0);

        assert!(!controller.is_playing());
        assert!(controller.is_visible());
        assert!(controller
            .drain_events()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::Error { .. })));

        // User retries once the policy allows it
        controller.media_mut().allow_play();
        controller.toggle_play_pause();
        assert!(controller.is_playing());
        assert!(controller.media().playing);
    }

    #[test]
    fn stale_ended_during_loading_is_dropped() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a", "b", "c"]), 0);
        controller.handle_media_event(MediaEvent::MetadataLoaded { duration: 180.0 });

        // User skips; the old source's ended notification lands afterwards
        controller.next();
        controller.handle_media_event(MediaEvent::Ended);

        assert_eq!(controller.current_index(), Some(1));
        assert_eq!(controller.state().phase, Phase::Loading);
    }

    #[test]
    fn ended_notification_advances_once_loaded() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a", "b"]), 0);
        controller.handle_media_event(MediaEvent::MetadataLoaded { duration: 180.0 });
        controller.handle_media_event(MediaEvent::Ended);

        assert_eq!(controller.current_index(), Some(1));
        assert!(controller
            .drain_events()
            .contains(&PlaybackEvent::TrackFinished {
                track_id: "a".to_string()
            }));
    }

    #[test]
    fn repeat_seeks_media_back_to_start() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a", "b"]), 0);
        controller.on_metadata_loaded(180.0);
        controller.on_time_update(179.5);
        controller.toggle_repeat();
        controller.media_mut().clear_calls();

        controller.on_track_ended();

        assert_eq!(controller.current_index(), Some(0));
        assert_eq!(controller.state().current_time, 0.0);
        assert_eq!(
            controller.media().calls,
            vec![MediaCall::Seek(0.0), MediaCall::Play]
        );
    }

    #[test]
    fn seek_to_percent_uses_catalog_duration_before_metadata() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a"]), 0);

        controller.seek_to_percent(0.5).unwrap();
        assert_eq!(controller.media().position, 90.0);
    }

    #[test]
    fn seek_to_percent_without_duration_fails() {
        let mut controller = recording();
        let mut track = create_test_track("live");
        track.duration = None;
        controller.load_queue_and_play(vec![track], 0);

        assert_eq!(
            controller.seek_to_percent(0.5),
            Err(PlaybackError::DurationUnknown)
        );
    }

    #[test]
    fn seek_to_percent_on_empty_queue_fails() {
        let mut controller = recording();
        assert_eq!(
            controller.seek_to_percent(0.5),
            Err(PlaybackError::QueueEmpty)
        );
    }

    #[test]
    fn seek_by_is_relative() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a"]), 0);
        controller.on_metadata_loaded(180.0);
        controller.on_time_update(30.0);

        controller.seek_by(10.0);
        assert_eq!(controller.state().current_time, 40.0);

        controller.seek_by(-100.0);
        assert_eq!(controller.state().current_time, 0.0);
    }

    #[test]
    fn skip_uses_configured_step() {
        let mut controller = PlaybackController::new(
            RecordingMedia::new(),
            PlaybackConfig {
                seek_step_secs: 15.0,
                ..PlaybackConfig::default()
            },
        );
        controller.load_queue_and_play(tracks(&["a"]), 0);
        controller.on_metadata_loaded(180.0);

        controller.skip_forward();
        controller.skip_forward();
        assert_eq!(controller.state().current_time, 30.0);

        controller.skip_backward();
        assert_eq!(controller.media().position, 15.0);
    }

    #[test]
    fn play_index_validates_range() {
        let mut controller = recording();
        assert_eq!(controller.play_index(0), Err(PlaybackError::QueueEmpty));

        controller.load_queue_and_play(tracks(&["a", "b", "c"]), 0);
        assert_eq!(
            controller.play_index(3),
            Err(PlaybackError::IndexOutOfBounds(3))
        );
        assert_eq!(controller.current_index(), Some(0));

        controller.play_index(2).unwrap();
        assert_eq!(controller.current_track().unwrap().id, "c");
    }

    #[test]
    fn platform_pause_clears_play_intent() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a"]), 0);
        controller.on_metadata_loaded(180.0);

        controller.handle_media_event(MediaEvent::Paused);
        assert!(!controller.is_playing());
        assert_eq!(controller.state().phase, Phase::Paused);
    }

    #[test]
    fn snapshot_carries_labels() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a"]), 0);
        controller.on_metadata_loaded(180.0);
        controller.on_time_update(45.0);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.current_time_label, "0:45");
        assert_eq!(snapshot.duration_label, "3:00");
        assert_eq!(snapshot.queue_length, 1);
        assert!((snapshot.progress - 0.25).abs() < 1e-9);
        assert!((snapshot.gain - 0.8).abs() < 1e-9);

        controller.toggle_mute();
        assert_eq!(controller.snapshot().gain, 0.0);
        assert_eq!(controller.snapshot().state.volume.level(), 80);
    }

    #[test]
    fn show_reveals_closed_player_without_playing() {
        let mut controller = recording();
        controller.load_queue_and_play(tracks(&["a"]), 0);
        controller.close();
        controller.show();

        assert!(controller.is_visible());
        assert!(!controller.is_playing());
    }
}
