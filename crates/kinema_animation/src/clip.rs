use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Quat, Vec3};
use kinema_core::AssetState;
use parking_lot::RwLock;

/// Upper bound on bone tables per clip. Keys for higher bone ids are
/// rejected.
pub const MAX_CLIP_BONES: usize = 65_536;

/// Sparse keyframes of a single bone, keyed by frame index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneKeys {
    pub positions: BTreeMap<u32, Vec3>,
    pub rotations: BTreeMap<u32, Quat>,
}

impl BoneKeys {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.rotations.is_empty()
    }
}

/// Immutable keyframe store for one skeletal animation.
///
/// Bone tables are indexed by bone id, so a clip stays valid against any
/// clone of the skeleton it was authored for.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub frame_rate: f32,
    pub key_count: usize,
    pub bones: Vec<BoneKeys>,
}

impl AnimationClip {
    #[must_use]
    pub fn new(name: impl Into<String>, frame_rate: f32, key_count: usize) -> Self {
        Self {
            name: name.into(),
            frame_rate,
            key_count,
            bones: Vec::new(),
        }
    }

    /// Time of the last key, in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        if self.frame_rate <= 0.0 || self.key_count <= 1 {
            return 0.0;
        }
        (self.key_count - 1) as f32 / self.frame_rate
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn bone_keys(&self, bone: usize) -> Option<&BoneKeys> {
        self.bones.get(bone)
    }

    #[must_use]
    pub fn has_keys(&self, bone: usize) -> bool {
        self.bones.get(bone).is_some_and(|keys| !keys.is_empty())
    }

    pub fn insert_position(&mut self, bone: usize, frame: u32, position: Vec3) {
        if let Some(keys) = self.keys_mut(bone) {
            keys.positions.insert(frame, position);
        }
    }

    pub fn insert_rotation(&mut self, bone: usize, frame: u32, rotation: Quat) {
        if let Some(keys) = self.keys_mut(bone) {
            keys.rotations.insert(frame, rotation.normalize());
        }
    }

    fn keys_mut(&mut self, bone: usize) -> Option<&mut BoneKeys> {
        if bone >= MAX_CLIP_BONES {
            log::warn!(
                "clip '{}': bone {bone} exceeds the {MAX_CLIP_BONES} bone limit, key dropped",
                self.name
            );
            return None;
        }
        if bone >= self.bones.len() {
            self.bones.resize_with(bone + 1, BoneKeys::default);
        }
        self.bones.get_mut(bone)
    }
}

#[derive(Debug)]
struct ClipSlot {
    path: String,
    state: AssetState,
    data: RwLock<Option<Arc<AnimationClip>>>,
}

/// Shared reference to a clip that may still be loading.
///
/// Cloning is cheap; every clone observes the same readiness flags. States
/// hold one, and an Animator holds one for the outgoing side of a blend so
/// the faded-out clip stays alive until the blend ends.
#[derive(Debug, Clone)]
pub struct ClipHandle(Arc<ClipSlot>);

impl ClipHandle {
    /// Handle whose data will be published later by a loader.
    #[must_use]
    pub fn pending(path: impl Into<String>) -> Self {
        Self(Arc::new(ClipSlot {
            path: path.into(),
            state: AssetState::new(),
            data: RwLock::new(None),
        }))
    }

    /// Handle for a clip that is already in memory.
    #[must_use]
    pub fn ready(path: impl Into<String>, clip: AnimationClip) -> Self {
        Self(Arc::new(ClipSlot {
            path: path.into(),
            state: AssetState::loaded(),
            data: RwLock::new(Some(Arc::new(clip))),
        }))
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.0.path
    }

    /// Stores the payload, then raises the loaded flag.
    pub fn publish(&self, clip: AnimationClip) {
        *self.0.data.write() = Some(Arc::new(clip));
        self.0.state.mark_loaded();
    }

    pub fn fail(&self) {
        self.0.state.mark_failed();
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.0.state.is_loaded()
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.0.state.has_failed()
    }

    #[must_use]
    pub fn has_been_sent(&self) -> bool {
        self.0.state.has_been_sent()
    }

    pub fn mark_sent(&self) {
        self.0.state.mark_sent();
    }

    /// The clip, or `None` while it is not ready. Never blocks on a loader.
    #[must_use]
    pub fn get(&self) -> Option<Arc<AnimationClip>> {
        if !self.0.state.is_loaded() {
            return None;
        }
        self.0.data.read().clone()
    }

    /// Whether two handles share the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &ClipHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
