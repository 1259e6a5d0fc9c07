//! Playback state machine
//!
//! Every intent is a pure step from one complete [`PlaybackState`] to the next,
//! together with the media commands that realize it. The controller commits
//! the returned state in one assignment, so a callback arriving between two
//! intents never sees a half-updated index.
//!
//! ```text
//! Idle ──load──▶ Loading ──metadata──▶ Playing ⇄ Paused
//!                   ▲                     │
//!                   │                   ended
//!                   │                     ▼
//!                   └────── next ◀────── Ended ──repeat──▶ Playing
//! ```

use crate::media::MediaCommand;
use crate::queue::{clamp_index, next_index, previous_index};
use crate::shuffle::pick_index;
use crate::types::{Phase, PlaybackState};
use crate::volume::VolumeCurve;
use rand::Rng;

/// Something that can move the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// A new queue of `len` tracks was installed, start at `start`
    Load { len: usize, start: usize },
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    /// Jump to a queue entry
    JumpTo(usize),
    TrackEnded,
    /// Seek to an absolute position in seconds
    Seek(f64),
    SetVolume(u8),
    Mute,
    Unmute,
    ToggleMute,
    SetShuffle(bool),
    SetRepeat(bool),
    ToggleShuffle,
    ToggleRepeat,
    Close,
    Show,
    MetadataLoaded(f64),
    TimeUpdate(f64),
    MediaPlaying,
    MediaPaused,
    PlayRejected,
}

/// Result of one transition
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Complete next state
    pub state: PlaybackState,

    /// Commands to issue, in order, after committing `state`
    pub commands: Vec<MediaCommand>,
}

impl Step {
    fn unchanged(state: &PlaybackState) -> Self {
        Self {
            state: *state,
            commands: Vec::new(),
        }
    }

    fn with(state: PlaybackState, commands: Vec<MediaCommand>) -> Self {
        Self { state, commands }
    }
}

/// Everything outside the state a transition may consult
pub struct Context<'a, R: Rng + ?Sized> {
    /// Length of the installed queue
    pub queue_len: usize,

    /// Gain mapping for volume commands
    pub curve: VolumeCurve,

    /// Randomness for shuffle
    pub rng: &'a mut R,
}

/// Compute the next state for `intent`
pub fn step<R: Rng + ?Sized>(
    state: &PlaybackState,
    intent: &Intent,
    ctx: &mut Context<'_, R>,
) -> Step {
    let len = ctx.queue_len;

    match *intent {
        Intent::Load { len, start } => load(state, len, start),
        Intent::Play => play(state, len),
        Intent::Pause => pause(state),
        Intent::TogglePlayPause => {
            if len == 0 {
                Step::unchanged(state)
            } else if state.is_playing {
                pause(state)
            } else {
                play(state, len)
            }
        }
        Intent::Next => next(state, ctx),
        Intent::Previous => match state.current_index.and_then(|i| previous_index(i, len)) {
            Some(index) => start_track(state, index),
            None => Step::unchanged(state),
        },
        Intent::JumpTo(index) if index < len => start_track(state, index),
        Intent::JumpTo(_) => Step::unchanged(state),
        Intent::TrackEnded => track_ended(state, ctx),
        Intent::Seek(position) => seek(state, position),
        Intent::SetVolume(level) => {
            let mut next = *state;
            next.volume.set_level(level);
            volume_step(next, ctx.curve)
        }
        Intent::Mute | Intent::Unmute | Intent::ToggleMute => {
            let mut next = *state;
            match intent {
                Intent::Mute => next.volume.mute(),
                Intent::Unmute => next.volume.unmute(),
                _ => next.volume.toggle_mute(),
            }
            Step::with(next, vec![MediaCommand::SetMuted(next.volume.is_muted())])
        }
        Intent::SetShuffle(on) => Step::with(
            PlaybackState {
                is_shuffle: on,
                ..*state
            },
            Vec::new(),
        ),
        Intent::SetRepeat(on) => Step::with(
            PlaybackState {
                is_repeat: on,
                ..*state
            },
            Vec::new(),
        ),
        Intent::ToggleShuffle => Step::with(
            PlaybackState {
                is_shuffle: !state.is_shuffle,
                ..*state
            },
            Vec::new(),
        ),
        Intent::ToggleRepeat => Step::with(
            PlaybackState {
                is_repeat: !state.is_repeat,
                ..*state
            },
            Vec::new(),
        ),
        Intent::Close => close(state),
        Intent::Show if state.current_index.is_some() => Step::with(
            PlaybackState {
                is_visible: true,
                ..*state
            },
            Vec::new(),
        ),
        Intent::Show => Step::unchanged(state),
        Intent::MetadataLoaded(duration) => metadata_loaded(state, duration),
        Intent::TimeUpdate(current_time) => Step::with(
            PlaybackState {
                current_time: sanitize_seconds(current_time),
                ..*state
            },
            Vec::new(),
        ),
        Intent::MediaPlaying if state.current_index.is_some() => Step::with(
            PlaybackState {
                phase: Phase::Playing,
                is_playing: true,
                ..*state
            },
            Vec::new(),
        ),
        Intent::MediaPlaying => Step::unchanged(state),
        Intent::MediaPaused if state.phase.has_media() => Step::with(
            PlaybackState {
                phase: Phase::Paused,
                is_playing: false,
                ..*state
            },
            Vec::new(),
        ),
        Intent::MediaPaused => Step::unchanged(state),
        Intent::PlayRejected => Step::with(
            PlaybackState {
                is_playing: false,
                phase: match state.phase {
                    Phase::Playing => Phase::Paused,
                    other => other,
                },
                ..*state
            },
            Vec::new(),
        ),
    }
}

/// Install a fresh queue and start at the clamped index
fn load(state: &PlaybackState, len: usize, start: usize) -> Step {
    let Some(index) = clamp_index(start, len) else {
        return Step::unchanged(state);
    };

    let mut step = begin(state, index);
    step.state.is_visible = true;
    step
}

/// Make `index` current and start it
///
/// Moving onto the index that is already current restarts it in place
/// instead of reloading the source.
fn start_track(state: &PlaybackState, index: usize) -> Step {
    if state.current_index == Some(index) && state.phase.has_media() {
        return Step::with(
            PlaybackState {
                phase: Phase::Playing,
                is_playing: true,
                current_time: 0.0,
                ..*state
            },
            vec![MediaCommand::Seek(0.0), MediaCommand::Play],
        );
    }

    begin(state, index)
}

fn begin(state: &PlaybackState, index: usize) -> Step {
    Step::with(
        PlaybackState {
            phase: Phase::Loading,
            current_index: Some(index),
            is_playing: true,
            current_time: 0.0,
            duration: 0.0,
            ..*state
        },
        vec![MediaCommand::Load { index }, MediaCommand::Play],
    )
}

fn play(state: &PlaybackState, len: usize) -> Step {
    if len == 0 || state.current_index.is_none() || state.is_playing {
        return Step::unchanged(state);
    }

    let phase = match state.phase {
        Phase::Paused => Phase::Playing,
        other => other,
    };

    Step::with(
        PlaybackState {
            phase,
            is_playing: true,
            ..*state
        },
        vec![MediaCommand::Play],
    )
}

fn pause(state: &PlaybackState) -> Step {
    if !state.is_playing {
        return Step::unchanged(state);
    }

    let phase = match state.phase {
        Phase::Playing => Phase::Paused,
        other => other,
    };

    Step::with(
        PlaybackState {
            phase,
            is_playing: false,
            ..*state
        },
        vec![MediaCommand::Pause],
    )
}

fn next<R: Rng + ?Sized>(state: &PlaybackState, ctx: &mut Context<'_, R>) -> Step {
    let len = ctx.queue_len;
    let current = state.current_index.unwrap_or(0);

    let index = if state.is_shuffle {
        pick_index(&mut *ctx.rng, current, len)
    } else {
        next_index(current, len)
    };

    match index {
        Some(index) => start_track(state, index),
        None => Step::unchanged(state),
    }
}

fn track_ended<R: Rng + ?Sized>(state: &PlaybackState, ctx: &mut Context<'_, R>) -> Step {
    if state.current_index.is_none() || ctx.queue_len == 0 {
        return Step::unchanged(state);
    }

    if state.is_repeat {
        return Step::with(
            PlaybackState {
                phase: Phase::Playing,
                is_playing: true,
                current_time: 0.0,
                ..*state
            },
            vec![MediaCommand::Seek(0.0), MediaCommand::Play],
        );
    }

    let ended = PlaybackState {
        phase: Phase::Ended,
        ..*state
    };
    next(&ended, ctx)
}

fn seek(state: &PlaybackState, position: f64) -> Step {
    if state.current_index.is_none() {
        return Step::unchanged(state);
    }

    let mut position = sanitize_seconds(position);
    if state.duration > 0.0 {
        position = position.min(state.duration);
    }

    Step::with(
        PlaybackState {
            current_time: position,
            ..*state
        },
        vec![MediaCommand::Seek(position)],
    )
}

fn close(state: &PlaybackState) -> Step {
    let phase = match state.phase {
        Phase::Playing => Phase::Paused,
        other => other,
    };

    let commands = if state.is_playing {
        vec![MediaCommand::Pause]
    } else {
        Vec::new()
    };

    Step::with(
        PlaybackState {
            phase,
            is_playing: false,
            is_visible: false,
            ..*state
        },
        commands,
    )
}

fn metadata_loaded(state: &PlaybackState, duration: f64) -> Step {
    let phase = match state.phase {
        Phase::Loading if state.is_playing => Phase::Playing,
        Phase::Loading => Phase::Paused,
        other => other,
    };

    let duration = sanitize_seconds(duration);
    let current_time = if duration > 0.0 {
        state.current_time.min(duration)
    } else {
        state.current_time
    };

    Step::with(
        PlaybackState {
            phase,
            duration,
            current_time,
            ..*state
        },
        Vec::new(),
    )
}

fn volume_step(state: PlaybackState, curve: VolumeCurve) -> Step {
    Step::with(
        state,
        vec![
            MediaCommand::SetVolume(state.volume.gain(curve)),
            MediaCommand::SetMuted(state.volume.is_muted()),
        ],
    )
}

/// Media elements report NaN/Infinity for live or unknown streams
fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
