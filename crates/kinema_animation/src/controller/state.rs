use glam::Vec2;

use crate::clip::ClipHandle;

/// A node of the state graph: a clip plus its playback settings.
///
/// A state without a clip is an "empty" state and holds the bind pose.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub(crate) name: String,
    pub clip: Option<ClipHandle>,
    pub looping: bool,
    pub speed: f32,
    /// Editor layout position. Persisted, ignored at runtime.
    pub position: Vec2,
}

impl AnimationState {
    #[must_use]
    pub fn new(name: impl Into<String>, looping: bool, speed: f32) -> Self {
        Self {
            name: name.into(),
            clip: None,
            looping,
            speed,
            position: Vec2::ZERO,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Clip duration in seconds. `None` while the clip is still loading,
    /// `Some(0.0)` for an empty state.
    #[must_use]
    pub fn duration(&self) -> Option<f32> {
        match &self.clip {
            None => Some(0.0),
            Some(handle) => handle.get().map(|clip| clip.duration()),
        }
    }

    /// Normalized progress of `time` through the clip.
    ///
    /// Empty states count as finished; a clip that is not loaded yet counts
    /// as not started.
    #[must_use]
    pub fn progress(&self, time: f32) -> f32 {
        match self.duration() {
            None => 0.0,
            Some(duration) if duration <= 0.0 => 1.0,
            Some(duration) => (time / duration).clamp(0.0, 1.0),
        }
    }
}

/// Advances `time` by `delta` within a clip of `duration` seconds.
///
/// Looping wraps modulo the duration, otherwise the result is clamped to
/// `[0, duration]`. The flag reports whether a loop boundary was crossed.
#[must_use]
pub fn advance_clip_time(time: f32, delta: f32, duration: f32, looping: bool) -> (f32, bool) {
    if duration <= 0.0 {
        return (0.0, false);
    }
    let next = time + delta;
    if looping {
        if (0.0..duration).contains(&next) {
            (next, false)
        } else {
            (next.rem_euclid(duration), true)
        }
    } else {
        (next.clamp(0.0, duration), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_when_looping() {
        let (time, wrapped) = advance_clip_time(0.9, 0.2, 1.0, true);
        assert!((time - 0.1).abs() < 1e-5);
        assert!(wrapped);

        let (time, wrapped) = advance_clip_time(0.2, 0.3, 1.0, true);
        assert!((time - 0.5).abs() < 1e-5);
        assert!(!wrapped);
    }

    #[test]
    fn test_advance_clamps_when_not_looping() {
        assert_eq!(advance_clip_time(0.9, 0.5, 1.0, false), (1.0, false));
        assert_eq!(advance_clip_time(0.1, -0.5, 1.0, false), (0.0, false));
    }

    #[test]
    fn test_advance_negative_speed_wraps_backwards() {
        let (time, wrapped) = advance_clip_time(0.1, -0.3, 1.0, true);
        assert!((time - 0.8).abs() < 1e-5);
        assert!(wrapped);
    }

    #[test]
    fn test_zero_duration_pins_time() {
        assert_eq!(advance_clip_time(3.0, 1.0, 0.0, true), (0.0, false));
    }

    #[test]
    fn test_empty_state_progress_is_complete() {
        let state = AnimationState::new("Empty", true, 1.0);
        assert_eq!(state.duration(), Some(0.0));
        assert_eq!(state.progress(0.0), 1.0);
    }

    #[test]
    fn test_pending_clip_progress_is_zero() {
        let mut state = AnimationState::new("Loading", true, 1.0);
        state.clip = Some(ClipHandle::pending("late.clip"));
        assert_eq!(state.duration(), None);
        assert_eq!(state.progress(0.5), 0.0);
    }
}
