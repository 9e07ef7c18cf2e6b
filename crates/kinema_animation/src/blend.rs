//! Two-way cross-fade between an outgoing and an incoming pose.

use glam::{Mat4, Quat, Vec3};

use crate::clip::AnimationClip;
use crate::sampler;
use crate::values::Interpolatable;

/// Blend weight of the incoming pose after `elapsed` seconds of a
/// `duration`-second transition, clamped to `[0, 1]`.
///
/// A zero or negative duration is an immediate transition and yields `1.0`.
#[inline]
#[must_use]
pub fn blend_factor(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 || !duration.is_finite() {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Local transform of one bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl BoneTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    #[must_use]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Lerps position and slerps rotation towards `other` by `factor`.
    #[must_use]
    pub fn blend(&self, other: &BoneTransform, factor: f32) -> BoneTransform {
        BoneTransform {
            position: Vec3::interpolate_linear(&self.position, &other.position, factor),
            rotation: Quat::interpolate_linear(&self.rotation, &other.rotation, factor),
        }
    }

    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One side of a cross-fade: a clip (absent if empty or still loading) and
/// the time it is sampled at.
#[derive(Debug, Clone, Copy)]
pub struct ClipPlayback<'a> {
    pub clip: Option<&'a AnimationClip>,
    pub time: f32,
}

impl<'a> ClipPlayback<'a> {
    #[must_use]
    pub fn new(clip: Option<&'a AnimationClip>, time: f32) -> Self {
        Self { clip, time }
    }

    /// Samples `bone`, falling back to `bind` for missing data.
    #[must_use]
    pub fn sample(&self, bone: usize, bind: BoneTransform) -> BoneTransform {
        match self.clip {
            Some(clip) => {
                let (position, rotation) =
                    sampler::sample_or(clip, bone, self.time, bind.position, bind.rotation);
                BoneTransform { position, rotation }
            }
            None => bind,
        }
    }
}
