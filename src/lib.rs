//! Kinema: an animation state machine driving skeletal cross-fades.
//!
//! The umbrella crate re-exports the engine crates:
//!
//! - [`core`]: errors, change tracking, asset readiness flags
//! - [`animation`]: clips, skeletons, blending, the state graph and the
//!   per-instance [`Animator`]
//! - [`assets`]: text formats and the [`AssetServer`]
//!
//! ```rust,ignore
//! use kinema::prelude::*;
//!
//! let assets = AssetServer::new("assets");
//! let controller = assets.load_controller("hero.controller")?;
//! let mut animator = Animator::new(controller, skeleton);
//!
//! animator.set_boolean("moving", true);
//! animator.game_update(dt);
//! let pose = animator.skeleton().local_matrices();
//! ```

pub use glam;
pub use kinema_animation as animation;
pub use kinema_assets as assets;
pub use kinema_core as core;

pub use kinema_animation::{
    AnimationClip, AnimationController, AnimationSettings, AnimationState, Animator, Bone,
    ClipHandle, Condition, LinkKey, SharedController, Skeleton, StateKey, StateLink,
};
pub use kinema_assets::AssetServer;
pub use kinema_core::{KinemaError, Result};

pub mod prelude {
    pub use glam::{Mat4, Quat, Vec2, Vec3};

    pub use kinema_animation::{
        AnimationClip, AnimationController, AnimationSettings, Animator, ClipHandle,
        SharedController, Skeleton, StateKey,
    };
    pub use kinema_assets::AssetServer;
    pub use kinema_core::{KinemaError, Result};
}
