//! Asset Loading Tests
//!
//! Tests for:
//! - Background clip loading and readiness flags
//! - Clip cache deduplication
//! - Blocking clip loads and error mapping
//! - Controller load / save through the asset server

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use glam::{Quat, Vec3};

use kinema::animation::{AnimationClip, AnimationSettings, Animator, ClipHandle, Skeleton};
use kinema::assets::AssetServer;
use kinema::core::KinemaError;

const WALK_CLIP: &str = "\
clip walk
frame_rate 30
key_count 31
bone 0
position 0 3 0 0
position 30 3 0 0
";

const CONTROLLER: &str = "\
controller hero
parameter isWalking false
state Idle - true 1 0 0
state Walk clips/walk.clip true 1 100 0
link Idle Walk false 1 0
condition isWalking true
";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Polls until the handle leaves the pending state or the timeout expires.
fn wait_for(handle: &ClipHandle) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_loaded() && !handle.has_failed() {
        assert!(Instant::now() < deadline, "timed out loading '{}'", handle.path());
        thread::sleep(Duration::from_millis(5));
    }
}

// ============================================================================
// Background clip loading
// ============================================================================

#[test]
fn background_load_publishes_clip() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "walk.clip", WALK_CLIP);
    let server = AssetServer::new(dir.path());

    let handle = server.get_or_load_clip("walk.clip");
    assert_eq!(handle.path(), "walk.clip");
    wait_for(&handle);

    assert!(handle.is_loaded());
    let clip = handle.get().unwrap();
    assert_eq!(clip.name, "walk");
    assert_eq!(clip.key_count, 31);
    assert_eq!(server.pending_clip_count(), 0);
}

#[test]
fn same_path_shares_one_handle() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "walk.clip", WALK_CLIP);
    let server = AssetServer::new(dir.path());

    let first = server.get_or_load_clip("walk.clip");
    let second = server.get_or_load_clip("walk.clip");
    assert!(first.ptr_eq(&second));
    assert_eq!(server.clip_count(), 1);

    let clone = server.clone();
    assert!(clone.get_or_load_clip("walk.clip").ptr_eq(&first));
    wait_for(&first);
}

#[test]
fn missing_file_marks_handle_failed() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let server = AssetServer::new(dir.path());

    let handle = server.get_or_load_clip("nope.clip");
    wait_for(&handle);
    assert!(handle.has_failed());
    assert!(handle.get().is_none());
}

#[test]
fn malformed_file_marks_handle_failed() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "bad.clip", "clip bad\nkey_count 3\n");
    let server = AssetServer::new(dir.path());

    let handle = server.get_or_load_clip("bad.clip");
    wait_for(&handle);
    assert!(handle.has_failed());
}

// ============================================================================
// Blocking loads & cache
// ============================================================================

#[test]
fn blocking_load_returns_ready_handle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "walk.clip", WALK_CLIP);
    let server = AssetServer::new(dir.path());

    let handle = server.load_clip_blocking("walk.clip")?;
    assert!(handle.is_loaded());
    assert!(server.cached_clip("walk.clip").unwrap().ptr_eq(&handle));

    // Second call is a cache hit
    let again = server.load_clip_blocking("walk.clip")?;
    assert!(again.ptr_eq(&handle));
    Ok(())
}

#[test]
fn blocking_load_of_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let server = AssetServer::new(dir.path());
    let err = server.load_clip_blocking("nope.clip").unwrap_err();
    assert!(matches!(err, KinemaError::AssetNotFound(path) if path == "nope.clip"));
}

#[test]
fn blocking_load_of_malformed_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "bad.clip", "clip bad\n");
    let server = AssetServer::new(dir.path());
    let err = server.load_clip_blocking("bad.clip").unwrap_err();
    assert!(matches!(err, KinemaError::AssetLoadFailed { path, .. } if path == "bad.clip"));
}

#[test]
fn blocking_load_replaces_failed_handle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let server = AssetServer::new(dir.path());

    let failed = server.get_or_load_clip("late.clip");
    wait_for(&failed);
    assert!(failed.has_failed());

    write_file(dir.path(), "late.clip", WALK_CLIP);
    let handle = server.load_clip_blocking("late.clip")?;
    assert!(handle.is_loaded());
    assert!(!handle.ptr_eq(&failed));
    Ok(())
}

#[test]
fn inserted_clip_is_cached() {
    let dir = tempfile::tempdir().unwrap();
    let server = AssetServer::new(dir.path());

    let handle = server.insert_clip("mem.clip", AnimationClip::new("mem", 30.0, 2));
    assert!(handle.is_loaded());
    assert!(server.get_or_load_clip("mem.clip").ptr_eq(&handle));
    assert_eq!(server.clip_count(), 1);
}

#[test]
fn saved_clip_loads_back() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let server = AssetServer::new(dir.path());

    let mut clip = AnimationClip::new("wave", 24.0, 13);
    clip.insert_position(0, 0, Vec3::new(0.0, 1.5, 0.0));
    clip.insert_rotation(1, 12, Quat::IDENTITY);
    server.save_clip(&clip, "out/wave.clip")?;
    assert!(dir.path().join("out/wave.clip").is_file());

    let loaded = server.load_clip_blocking("out/wave.clip")?;
    let loaded = loaded.get().unwrap();
    assert_eq!(loaded.name, "wave");
    assert_eq!(loaded.bone_count(), 2);
    assert_eq!(loaded.bone_keys(0).unwrap().positions[&0], Vec3::new(0.0, 1.5, 0.0));
    Ok(())
}

// ============================================================================
// Controllers
// ============================================================================

#[test]
fn load_controller_resolves_clips_in_background() -> anyhow::Result<()> {
    init_logger();
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "hero.controller", CONTROLLER);
    write_file(dir.path(), "clips/walk.clip", WALK_CLIP);
    let server = AssetServer::new(dir.path());

    let controller = server.load_controller("hero.controller")?;
    let handle = {
        let graph = controller.read();
        assert_eq!(graph.name(), "hero");
        assert_eq!(graph.state_count(), 2);
        let walk = graph.state_by_name("Walk").unwrap();
        graph.state(walk).unwrap().clip.clone().unwrap()
    };
    assert!(server.cached_clip("clips/walk.clip").unwrap().ptr_eq(&handle));
    wait_for(&handle);
    assert!(handle.is_loaded());

    let mut skeleton = Skeleton::new("rig");
    skeleton.add_bone("root", None, Vec3::ZERO, Quat::IDENTITY)?;
    let mut animator = Animator::new(controller, skeleton);
    animator.set_boolean("isWalking", true);
    animator.game_update(0.05);
    animator.game_update(0.05);

    assert_eq!(animator.current_state_name().as_deref(), Some("Walk"));
    let x = animator.skeleton().bone(0).unwrap().local_transform().position.x;
    assert!((x - 3.0).abs() < 1e-5, "got {x}");
    Ok(())
}

#[test]
fn load_controller_applies_server_settings() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "hero.controller", CONTROLLER);
    let settings = AnimationSettings {
        max_delta_time: 0.02,
        ..Default::default()
    };
    let server = AssetServer::with_settings(dir.path(), settings);

    let controller = server.load_controller("hero.controller")?;
    assert_eq!(*controller.read().settings(), settings);
    Ok(())
}

#[test]
fn saved_controller_loads_back() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "hero.controller", CONTROLLER);
    let server = AssetServer::new(dir.path());

    let controller = server.load_controller("hero.controller")?;
    server.save_controller(&controller.read(), "copy.controller")?;
    let copy = server.load_controller("copy.controller")?;

    let copy = copy.read();
    assert_eq!(copy.name(), "hero");
    assert_eq!(copy.link_count(), 1);
    assert!(copy.has_parameter("isWalking"));

    // Both controllers share the cached clip
    let walk = copy.state(copy.state_by_name("Walk").unwrap()).unwrap();
    let cached = server.cached_clip("clips/walk.clip").unwrap();
    assert!(walk.clip.as_ref().unwrap().ptr_eq(&cached));
    Ok(())
}

#[test]
fn missing_controller_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let server = AssetServer::new(dir.path());
    let err = server.load_controller("ghost.controller").unwrap_err();
    assert!(matches!(err, KinemaError::AssetNotFound(_)));
}

#[test]
fn malformed_controller_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "bad.controller", "controller c\nstate A\n");
    let server = AssetServer::new(dir.path());
    let err = server.load_controller("bad.controller").unwrap_err();
    assert!(matches!(err, KinemaError::AssetLoadFailed { path, .. } if path == "bad.controller"));
}
