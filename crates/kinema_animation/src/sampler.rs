//! Keyframe sampling.
//!
//! Stateless: every call converts `time` to a fractional frame index and
//! interpolates between the bracketing keys of the bone's sparse tables.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::clip::AnimationClip;
use crate::values::Interpolatable;

/// Result of sampling one bone. A channel is `None` when the clip has no key
/// for it, in which case the caller substitutes the bind pose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneSample {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
}

impl BoneSample {
    /// Fills missing channels from the given bind pose.
    #[must_use]
    pub fn or_default(self, position: Vec3, rotation: Quat) -> (Vec3, Quat) {
        (
            self.position.unwrap_or(position),
            self.rotation.unwrap_or(rotation),
        )
    }
}

/// Samples `clip` for `bone_index` at `time` seconds.
#[must_use]
pub fn sample(clip: &AnimationClip, bone_index: usize, time: f32) -> BoneSample {
    let Some(keys) = clip.bone_keys(bone_index) else {
        return BoneSample::default();
    };
    let frame = frame_at(clip, time);
    BoneSample {
        position: sample_keys(&keys.positions, frame),
        rotation: sample_keys(&keys.rotations, frame),
    }
}

/// Like [`sample`], with missing channels taken from the bind pose.
#[must_use]
pub fn sample_or(
    clip: &AnimationClip,
    bone_index: usize,
    time: f32,
    default_position: Vec3,
    default_rotation: Quat,
) -> (Vec3, Quat) {
    sample(clip, bone_index, time).or_default(default_position, default_rotation)
}

fn frame_at(clip: &AnimationClip, time: f32) -> f32 {
    if clip.frame_rate <= 0.0 || !time.is_finite() {
        return 0.0;
    }
    (time * clip.frame_rate).max(0.0)
}

fn sample_keys<T: Interpolatable>(keys: &BTreeMap<u32, T>, frame: f32) -> Option<T> {
    let (_, first) = keys.first_key_value()?;
    let whole = frame.floor() as u32;

    // Key at or before the sample point
    let Some((&f0, v0)) = keys.range(..=whole).next_back() else {
        return Some(*first);
    };

    // Next key after it; none means we are at or past the last key
    let Some((&f1, v1)) = keys.range(whole.saturating_add(1)..).next() else {
        return Some(*v0);
    };

    let span = (f1 - f0) as f32;
    // Prevent division by zero
    let t = if span > 1e-6 {
        (frame - f0 as f32) / span
    } else {
        0.0
    };
    Some(T::interpolate_linear(v0, v1, t.clamp(0.0, 1.0)))
}
