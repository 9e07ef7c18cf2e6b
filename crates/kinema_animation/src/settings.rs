//! Animation Runtime Settings
//!
//! Defaults applied by the state graph when authoring new states and links,
//! and by every [`Animator`](crate::animator::Animator) when ticking.
//!
//! ```rust,ignore
//! let settings = AnimationSettings {
//!     max_delta_time: 1.0 / 30.0,
//!     ..Default::default()
//! };
//!
//! let settings = AnimationSettings::from_json_str(r#"{ "play_on_start": false }"#)?;
//! ```

use kinema_core::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Upper bound for a single tick's delta, in seconds.
    pub max_delta_time: f32,
    /// Duration given to newly added links, in seconds.
    pub default_transition_duration: f32,
    /// Playback speed given to newly added states.
    pub default_state_speed: f32,
    /// Loop flag given to newly added states.
    pub default_state_looping: bool,
    /// Whether a new Animator starts in play mode.
    pub play_on_start: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            max_delta_time: 0.1,
            default_transition_duration: 0.25,
            default_state_speed: 1.0,
            default_state_looping: true,
            play_on_start: true,
        }
    }
}

impl AnimationSettings {
    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamps a frame delta into `[0, max_delta_time]`.
    #[inline]
    #[must_use]
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        if self.max_delta_time > 0.0 {
            dt.min(self.max_delta_time)
        } else {
            dt
        }
    }
}
