//! Skeleton Tests
//!
//! Tests for:
//! - Bone tree construction (root, parent/children, id ordering)
//! - Clone preserving bone ids with a fresh identity
//! - Pose updates: clip sampling, cross-fade, bind pose reset
//! - Mesh usage counting

use glam::{Mat4, Quat, Vec3};

use kinema::animation::blend::ClipPlayback;
use kinema::animation::clip::AnimationClip;
use kinema::animation::skeleton::Skeleton;
use kinema::core::KinemaError;

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

/// hips -> spine -> head, hips -> leg
fn make_skeleton() -> Skeleton {
    let mut skeleton = Skeleton::new("rig");
    let hips = skeleton
        .add_bone("hips", None, Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY)
        .unwrap();
    let spine = skeleton
        .add_bone("spine", Some(hips), Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY)
        .unwrap();
    skeleton
        .add_bone("head", Some(spine), Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY)
        .unwrap();
    skeleton
        .add_bone("leg", Some(hips), Vec3::new(0.2, -0.5, 0.0), Quat::IDENTITY)
        .unwrap();
    skeleton
}

/// Moves every bone of a 4-bone rig to `offset` over one second.
fn make_offset_clip(name: &str, offset: Vec3) -> AnimationClip {
    let mut clip = AnimationClip::new(name, 10.0, 11);
    for bone in 0..4 {
        clip.insert_position(bone, 0, offset);
        clip.insert_position(bone, 10, offset);
    }
    clip
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn skeleton_builds_tree() {
    let skeleton = make_skeleton();
    assert_eq!(skeleton.bone_count(), 4);
    assert_eq!(skeleton.root_bone(), Some(0));

    let hips = skeleton.bone(0).unwrap();
    assert_eq!(hips.parent(), None);
    assert_eq!(hips.children(), &[1, 3]);

    let head = skeleton.bone_by_name("head").unwrap();
    assert_eq!(head.id(), 2);
    assert_eq!(head.parent(), Some(1));
}

#[test]
fn bone_ids_match_arena_index() {
    let skeleton = make_skeleton();
    for (index, bone) in skeleton.bones().iter().enumerate() {
        assert_eq!(bone.id(), index);
    }
}

#[test]
fn second_root_is_rejected() {
    let mut skeleton = make_skeleton();
    let err = skeleton
        .add_bone("extra", None, Vec3::ZERO, Quat::IDENTITY)
        .unwrap_err();
    assert!(matches!(err, KinemaError::DuplicateRoot(_)));
    assert_eq!(skeleton.bone_count(), 4);
}

#[test]
fn unknown_parent_is_rejected() {
    let mut skeleton = make_skeleton();
    let err = skeleton
        .add_bone("orphan", Some(42), Vec3::ZERO, Quat::IDENTITY)
        .unwrap_err();
    assert!(matches!(err, KinemaError::InvalidBone { index: 42, .. }));
}

#[test]
fn bind_pose_matrix_matches_transform() {
    let skeleton = make_skeleton();
    let hips = skeleton.bone(0).unwrap();
    let expected = Mat4::from_rotation_translation(Quat::IDENTITY, Vec3::new(0.0, 1.0, 0.0));
    assert!(hips.default_matrix.abs_diff_eq(expected, EPSILON));
    assert!(hips.local_matrix().abs_diff_eq(expected, EPSILON));
    assert!(skeleton.is_at_bind_pose());
}

#[test]
fn max_bone_weight_defaults_to_four() {
    let mut skeleton = make_skeleton();
    assert_eq!(skeleton.max_bone_weight(), 4);
    skeleton.set_max_bone_weight(8);
    assert_eq!(skeleton.max_bone_weight(), 8);
}

// ============================================================================
// Clone
// ============================================================================

#[test]
fn clone_preserves_bone_ids_and_tree() {
    let mut original = make_skeleton();
    original.add_mesh();
    let copy = original.clone();

    assert_ne!(copy.id, original.id);
    assert_eq!(copy.bone_count(), original.bone_count());
    assert_eq!(copy.root_bone(), original.root_bone());
    for (a, b) in original.bones().iter().zip(copy.bones()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.name, b.name);
        assert_eq!(a.parent(), b.parent());
        assert_eq!(a.children(), b.children());
        assert_eq!(a.default_position, b.default_position);
    }
    assert_eq!(copy.mesh_count(), 0);
}

#[test]
fn clone_poses_independently() {
    let original = make_skeleton();
    let mut copy = original.clone();
    let clip = make_offset_clip("up", Vec3::new(0.0, 3.0, 0.0));

    copy.update_pose(Some(&clip), 0.5);
    assert!(!copy.is_at_bind_pose());
    assert!(original.is_at_bind_pose());
}

// ============================================================================
// Pose updates
// ============================================================================

#[test]
fn update_bone_poses_subtree_only() {
    let mut skeleton = make_skeleton();
    let clip = make_offset_clip("up", Vec3::new(0.0, 3.0, 0.0));

    // spine and head, not hips or leg
    skeleton.update_bone(1, Some(&clip), 0.2);
    assert!(skeleton.bone(0).unwrap().is_at_bind_pose());
    assert!(!skeleton.bone(1).unwrap().is_at_bind_pose());
    assert!(!skeleton.bone(2).unwrap().is_at_bind_pose());
    assert!(skeleton.bone(3).unwrap().is_at_bind_pose());
}

#[test]
fn update_pose_without_clip_is_bind_pose() {
    let mut skeleton = make_skeleton();
    let clip = make_offset_clip("up", Vec3::new(0.0, 3.0, 0.0));
    skeleton.update_pose(Some(&clip), 0.5);
    assert!(!skeleton.is_at_bind_pose());

    skeleton.update_pose(None, 0.5);
    assert!(skeleton.is_at_bind_pose());
}

#[test]
fn unkeyed_bones_keep_bind_pose() {
    let mut skeleton = make_skeleton();
    let mut clip = AnimationClip::new("hips_only", 10.0, 11);
    clip.insert_position(0, 0, Vec3::new(0.0, 2.0, 0.0));

    skeleton.update_pose(Some(&clip), 0.5);
    assert!(!skeleton.bone(0).unwrap().is_at_bind_pose());
    assert!(skeleton.bone(3).unwrap().is_at_bind_pose());
}

#[test]
fn cross_fade_blends_halfway() {
    let mut skeleton = make_skeleton();
    let from = make_offset_clip("from", Vec3::ZERO);
    let to = make_offset_clip("to", Vec3::new(4.0, 0.0, 0.0));

    skeleton.cross_fade(
        0.5,
        0.25,
        ClipPlayback::new(Some(&from), 0.0),
        ClipPlayback::new(Some(&to), 0.0),
    );
    let p = skeleton.bone(0).unwrap().local_transform().position;
    assert!(approx_vec3(p, Vec3::new(2.0, 0.0, 0.0)), "got {p:?}");
}

#[test]
fn cross_fade_endpoints() {
    let mut skeleton = make_skeleton();
    let from = make_offset_clip("from", Vec3::ZERO);
    let to = make_offset_clip("to", Vec3::new(4.0, 0.0, 0.0));

    skeleton.cross_fade(
        0.5,
        0.0,
        ClipPlayback::new(Some(&from), 0.0),
        ClipPlayback::new(Some(&to), 0.0),
    );
    let p = skeleton.bone(0).unwrap().local_transform().position;
    assert!(approx_vec3(p, Vec3::ZERO));

    skeleton.cross_fade(
        0.5,
        0.5,
        ClipPlayback::new(Some(&from), 0.0),
        ClipPlayback::new(Some(&to), 0.0),
    );
    let p = skeleton.bone(0).unwrap().local_transform().position;
    assert!(approx_vec3(p, Vec3::new(4.0, 0.0, 0.0)));
}

#[test]
fn cross_fade_zero_duration_takes_incoming() {
    let mut skeleton = make_skeleton();
    let from = make_offset_clip("from", Vec3::ZERO);
    let to = make_offset_clip("to", Vec3::new(4.0, 0.0, 0.0));

    skeleton.cross_fade(
        0.0,
        0.0,
        ClipPlayback::new(Some(&from), 0.0),
        ClipPlayback::new(Some(&to), 0.0),
    );
    let p = skeleton.bone(0).unwrap().local_transform().position;
    assert!(approx_vec3(p, Vec3::new(4.0, 0.0, 0.0)));
}

#[test]
fn cross_fade_from_unloaded_clip_uses_bind_pose() {
    let mut skeleton = make_skeleton();
    let to = make_offset_clip("to", Vec3::new(0.0, 3.0, 0.0));

    skeleton.cross_fade(
        1.0,
        0.5,
        ClipPlayback::new(None, 0.0),
        ClipPlayback::new(Some(&to), 0.0),
    );
    // halfway between bind (0, 1, 0) and (0, 3, 0)
    let p = skeleton.bone(0).unwrap().local_transform().position;
    assert!(approx_vec3(p, Vec3::new(0.0, 2.0, 0.0)), "got {p:?}");
}

#[test]
fn local_matrices_follow_pose() {
    let mut skeleton = make_skeleton();
    let clip = make_offset_clip("up", Vec3::new(0.0, 3.0, 0.0));
    skeleton.update_pose(Some(&clip), 0.0);

    let matrices = skeleton.local_matrices();
    assert_eq!(matrices.len(), 4);
    let expected = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
    assert!(matrices[2].abs_diff_eq(expected, EPSILON));
}

#[test]
fn reset_to_bind_pose_restores_every_bone() {
    let mut skeleton = make_skeleton();
    let clip = make_offset_clip("up", Vec3::new(0.0, 3.0, 0.0));
    skeleton.update_pose(Some(&clip), 0.5);
    skeleton.reset_to_bind_pose();
    assert!(skeleton.is_at_bind_pose());
}

#[test]
fn out_of_range_start_bone_is_ignored() {
    let mut skeleton = make_skeleton();
    let clip = make_offset_clip("up", Vec3::new(0.0, 3.0, 0.0));
    skeleton.update_bone(99, Some(&clip), 0.5);
    assert!(skeleton.is_at_bind_pose());
}

// ============================================================================
// Mesh usage
// ============================================================================

#[test]
fn mesh_count_saturates_at_zero() {
    let mut skeleton = make_skeleton();
    skeleton.add_mesh();
    skeleton.add_mesh();
    assert_eq!(skeleton.mesh_count(), 2);
    skeleton.remove_mesh();
    skeleton.remove_mesh();
    skeleton.remove_mesh();
    assert_eq!(skeleton.mesh_count(), 0);
}
