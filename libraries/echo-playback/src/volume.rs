//! Volume and mute
//!
//! Volume range is 0-100%. Mute is a separate flag so unmuting restores the
//! stored level. The two are coupled in one direction only: the level setter
//! derives the mute flag (0 mutes, anything else unmutes), while toggling mute
//! never touches the level.

use serde::{Deserialize, Serialize};

/// Mapping from volume level to the gain handed to the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeCurve {
    /// `level / 100`, what `HTMLMediaElement.volume` expects
    #[default]
    Linear,

    /// 0% = -60 dB, 100% = 0 dB
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume level (0-100)
    #[serde(rename = "volume")]
    level: u8,

    /// Mute state (preserves volume level)
    #[serde(rename = "isMuted")]
    muted: bool,
}

impl Volume {
    /// Create new volume
    ///
    /// A level of 0 starts muted, matching what the setter would derive.
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: level == 0,
        }
    }

    /// Set volume level (0-100)
    ///
    /// Zero implies muted; any other level implies unmuted.
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        self.muted = self.level == 0;
    }

    /// Get current volume level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain for the media element in `0.0..=1.0`
    ///
    /// Ignores the mute flag; mute is issued to the element separately so the
    /// element keeps the level while muted.
    pub fn gain(&self, curve: VolumeCurve) -> f64 {
        if self.level == 0 {
            return 0.0;
        }

        match curve {
            VolumeCurve::Linear => f64::from(self.level) / 100.0,
            VolumeCurve::Logarithmic => {
                // Map 0-100% to -60 dB to 0 dB
                let db = (f64::from(self.level) - 100.0) * 0.6;
                10.0_f64.powf(db / 20.0)
            }
        }
    }

    /// Gain that is actually audible (0 while muted)
    pub fn effective_gain(&self, curve: VolumeCurve) -> f64 {
        if self.muted {
            0.0
        } else {
            self.gain(curve)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(80)
    }
}
