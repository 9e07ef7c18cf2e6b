use glam::{Mat4, Quat, Vec3};
use kinema_core::{KinemaError, Result};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::blend::{BoneTransform, ClipPlayback, blend_factor};
use crate::clip::AnimationClip;

/// One joint of a [`Skeleton`].
///
/// Bones live in the skeleton's flat arena; `parent` and `children` are
/// indices into it, `id` is the bone's own index.
#[derive(Debug, Clone)]
pub struct Bone {
    pub(crate) id: usize,
    pub name: String,
    pub(crate) parent: Option<usize>,
    pub(crate) children: SmallVec<[usize; 4]>,

    // === Bind Pose ===
    pub default_position: Vec3,
    pub default_rotation: Quat,
    pub default_matrix: Mat4,

    // === Runtime Pose ===
    pub(crate) local_position: Vec3,
    pub(crate) local_rotation: Quat,
    pub(crate) local_matrix: Mat4,
}

impl Bone {
    /// Stable index of this bone within its skeleton.
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Current local matrix, read by the skinning pipeline.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn local_transform(&self) -> BoneTransform {
        BoneTransform::new(self.local_position, self.local_rotation)
    }

    #[inline]
    #[must_use]
    pub fn default_transform(&self) -> BoneTransform {
        BoneTransform::new(self.default_position, self.default_rotation)
    }

    /// Whether the runtime pose equals the bind pose.
    #[must_use]
    pub fn is_at_bind_pose(&self) -> bool {
        self.local_position == self.default_position && self.local_rotation == self.default_rotation
    }

    fn apply(&mut self, transform: BoneTransform) {
        self.local_position = transform.position;
        self.local_rotation = transform.rotation;
        self.local_matrix = transform.to_matrix();
    }
}

/// The bone hierarchy of a rigged mesh.
///
/// Invariant: `bones[i].id == i`, and a parent always has a lower index than
/// its children.
#[derive(Debug)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    bones: Vec<Bone>,
    root_bone: Option<usize>,

    /// Maximum bone influences per vertex. Consumed by skinning only.
    max_bone_weight: u32,
    mesh_users: usize,
}

impl Skeleton {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones: Vec::new(),
            root_bone: None,
            max_bone_weight: 4,
            mesh_users: 0,
        }
    }

    /// Appends a bone and returns its id.
    ///
    /// The first bone without a parent becomes the root bone.
    pub fn add_bone(
        &mut self,
        name: &str,
        parent: Option<usize>,
        position: Vec3,
        rotation: Quat,
    ) -> Result<usize> {
        let id = self.bones.len();
        match parent {
            Some(parent_id) if parent_id >= id => {
                return Err(KinemaError::InvalidBone {
                    context: format!("parent of bone '{name}'"),
                    index: parent_id,
                });
            }
            None if self.root_bone.is_some() => {
                return Err(KinemaError::DuplicateRoot(self.name.clone()));
            }
            _ => {}
        }

        let rotation = rotation.normalize();
        let matrix = Mat4::from_rotation_translation(rotation, position);
        self.bones.push(Bone {
            id,
            name: name.to_string(),
            parent,
            children: SmallVec::new(),
            default_position: position,
            default_rotation: rotation,
            default_matrix: matrix,
            local_position: position,
            local_rotation: rotation,
            local_matrix: matrix,
        });

        match parent {
            Some(parent_id) => self.bones[parent_id].children.push(id),
            None => self.root_bone = Some(id),
        }
        Ok(id)
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, id: usize) -> Option<&Bone> {
        self.bones.get(id)
    }

    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|bone| bone.name == name)
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<usize> {
        self.root_bone
    }

    #[inline]
    #[must_use]
    pub fn max_bone_weight(&self) -> u32 {
        self.max_bone_weight
    }

    pub fn set_max_bone_weight(&mut self, weight: u32) {
        self.max_bone_weight = weight;
    }

    /// Local matrices in bone id order.
    #[must_use]
    pub fn local_matrices(&self) -> Vec<Mat4> {
        self.bones.iter().map(|bone| bone.local_matrix).collect()
    }

    #[must_use]
    pub fn is_at_bind_pose(&self) -> bool {
        self.bones.iter().all(Bone::is_at_bind_pose)
    }

    // ========================================================================
    // Mesh usage
    // ========================================================================

    pub fn add_mesh(&mut self) {
        self.mesh_users += 1;
    }

    pub fn remove_mesh(&mut self) {
        self.mesh_users = self.mesh_users.saturating_sub(1);
    }

    #[inline]
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.mesh_users
    }

    // ========================================================================
    // Pose updates
    // ========================================================================

    /// Samples `clip` at `time` for `start` and every bone below it.
    ///
    /// With no clip the subtree is reset to its bind pose.
    pub fn update_bone(&mut self, start: usize, clip: Option<&AnimationClip>, time: f32) {
        let playback = ClipPlayback::new(clip, time);
        self.walk(start, |bone| {
            let sampled = playback.sample(bone.id, bone.default_transform());
            bone.apply(sampled);
        });
    }

    /// Cross-fades the subtree under `start` from `outgoing` to `incoming`
    /// with factor `elapsed / duration`.
    pub fn cross_update(
        &mut self,
        start: usize,
        duration: f32,
        elapsed: f32,
        outgoing: ClipPlayback<'_>,
        incoming: ClipPlayback<'_>,
    ) {
        let factor = blend_factor(elapsed, duration);
        self.walk(start, |bone| {
            let bind = bone.default_transform();
            let from = outgoing.sample(bone.id, bind);
            let to = incoming.sample(bone.id, bind);
            bone.apply(from.blend(&to, factor));
        });
    }

    /// Resets `start` and its descendants to the bind pose.
    pub fn set_default(&mut self, start: usize) {
        self.walk(start, |bone| {
            let bind = bone.default_transform();
            bone.apply(bind);
        });
    }

    /// [`update_bone`](Self::update_bone) from the root bone.
    pub fn update_pose(&mut self, clip: Option<&AnimationClip>, time: f32) {
        if let Some(root) = self.root_bone {
            self.update_bone(root, clip, time);
        }
    }

    /// [`cross_update`](Self::cross_update) from the root bone.
    pub fn cross_fade(
        &mut self,
        duration: f32,
        elapsed: f32,
        outgoing: ClipPlayback<'_>,
        incoming: ClipPlayback<'_>,
    ) {
        if let Some(root) = self.root_bone {
            self.cross_update(root, duration, elapsed, outgoing, incoming);
        }
    }

    /// [`set_default`](Self::set_default) from the root bone.
    pub fn reset_to_bind_pose(&mut self) {
        if let Some(root) = self.root_bone {
            self.set_default(root);
        }
    }

    /// Depth-first walk with an explicit work list.
    fn walk(&mut self, start: usize, mut visit: impl FnMut(&mut Bone)) {
        if start >= self.bones.len() {
            log::warn!(
                "Skeleton '{}': bone {start} out of range ({} bones)",
                self.name,
                self.bones.len()
            );
            return;
        }
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        stack.push(start);
        while let Some(id) = stack.pop() {
            let bone = &mut self.bones[id];
            visit(bone);
            stack.extend(bone.children.iter().rev().copied());
        }
    }
}

impl Clone for Skeleton {
    /// Structural deep copy: same bone ids, tree and poses, fresh identity,
    /// no mesh users.
    fn clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            bones: self.bones.clone(),
            root_bone: self.root_bone,
            max_bone_weight: self.max_bone_weight,
            mesh_users: 0,
        }
    }
}
