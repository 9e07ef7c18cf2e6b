//! Skeletal animation for Kinema.
//!
//! - [`clip`] / [`sampler`]: immutable keyframe clips and their interpolation
//! - [`skeleton`]: the bone tree that receives sampled poses
//! - [`blend`]: two-way cross-fades between an outgoing and an incoming clip
//! - [`controller`]: the shared, editable state graph
//! - [`animator`]: one runtime cursor per character
//!
//! Per frame, the driver calls [`Animator::game_update`], which evaluates the
//! graph's links, advances or finishes the active transition, samples the
//! clip(s) and writes local bone transforms into the Animator's skeleton.

pub mod animator;
pub mod blend;
pub mod clip;
pub mod controller;
pub mod sampler;
pub mod settings;
pub mod skeleton;
pub mod values;

pub use animator::Animator;
pub use blend::{BoneTransform, ClipPlayback, blend_factor};
pub use clip::{AnimationClip, BoneKeys, ClipHandle, MAX_CLIP_BONES};
pub use controller::{
    AnimationController, AnimationState, Condition, LinkKey, Parameter, SharedController,
    StateKey, StateLink,
};
pub use sampler::{BoneSample, sample, sample_or};
pub use settings::AnimationSettings;
pub use skeleton::{Bone, Skeleton};
pub use values::Interpolatable;
