use glam::{Quat, Vec3};
use kinema_animation::{AnimationClip, MAX_CLIP_BONES};
use kinema_core::{KinemaError, Result};

use super::tokens::{self, push_line, quote};

/// Parses a clip file.
///
/// ```text
/// clip walk
/// frame_rate 30
/// key_count 31
/// bone 0
/// position 0 0 0 0
/// rotation 30 0 0.7071068 0 0.7071068
/// ```
pub fn parse_clip(text: &str) -> Result<AnimationClip> {
    let mut name = String::new();
    let mut frame_rate = None;
    let mut key_count = 0usize;
    let mut bone: Option<usize> = None;
    let mut positions: Vec<(usize, u32, Vec3)> = Vec::new();
    let mut rotations: Vec<(usize, u32, Quat)> = Vec::new();
    let mut bone_count = 0usize;

    for record in tokens::records(text)? {
        match record.keyword() {
            "clip" => {
                record.expect_args(1)?;
                name = record.str(1).to_string();
            }
            "frame_rate" => {
                record.expect_args(1)?;
                let rate: f32 = record.parse(1, "frame rate")?;
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(KinemaError::parse(
                        record.line,
                        format!("frame rate must be positive, got {rate}"),
                    ));
                }
                frame_rate = Some(rate);
            }
            "key_count" => {
                record.expect_args(1)?;
                key_count = record.parse(1, "key count")?;
            }
            "bone" => {
                record.expect_args(1)?;
                let index: usize = record.parse(1, "bone index")?;
                if index >= MAX_CLIP_BONES {
                    return Err(KinemaError::parse(
                        record.line,
                        format!("bone index {index} exceeds the limit of {MAX_CLIP_BONES}"),
                    ));
                }
                bone_count = bone_count.max(index + 1);
                bone = Some(index);
            }
            "position" => {
                record.expect_args(4)?;
                let index = current_bone(bone, record.line)?;
                let frame = record.parse(1, "frame")?;
                let value = Vec3::new(
                    record.parse(2, "x")?,
                    record.parse(3, "y")?,
                    record.parse(4, "z")?,
                );
                positions.push((index, frame, value));
            }
            "rotation" => {
                record.expect_args(5)?;
                let index = current_bone(bone, record.line)?;
                let frame = record.parse(1, "frame")?;
                let value = Quat::from_xyzw(
                    record.parse(2, "x")?,
                    record.parse(3, "y")?,
                    record.parse(4, "z")?,
                    record.parse(5, "w")?,
                );
                if value.length_squared() <= f32::EPSILON {
                    return Err(KinemaError::parse(record.line, "zero-length rotation"));
                }
                rotations.push((index, frame, value));
            }
            other => {
                log::warn!("clip '{name}': ignoring unknown record '{other}' at line {}", record.line);
            }
        }
    }

    let frame_rate = frame_rate.ok_or_else(|| KinemaError::parse(0, "missing frame_rate"))?;
    let mut clip = AnimationClip::new(name, frame_rate, key_count);
    clip.bones.resize_with(bone_count, Default::default);
    for (index, frame, value) in positions {
        clip.insert_position(index, frame, value);
    }
    for (index, frame, value) in rotations {
        clip.insert_rotation(index, frame, value);
    }
    Ok(clip)
}

fn current_bone(bone: Option<usize>, line: usize) -> Result<usize> {
    bone.ok_or_else(|| KinemaError::parse(line, "key record before any 'bone' record"))
}

/// Writes a clip in the format read by [`parse_clip`].
#[must_use]
pub fn write_clip(clip: &AnimationClip) -> String {
    let mut out = String::new();
    push_line(&mut out, &["clip", &quote(&clip.name)]);
    push_line(&mut out, &["frame_rate", &clip.frame_rate.to_string()]);
    push_line(&mut out, &["key_count", &clip.key_count.to_string()]);

    for (index, keys) in clip.bones.iter().enumerate() {
        push_line(&mut out, &["bone", &index.to_string()]);
        for (frame, p) in &keys.positions {
            push_line(
                &mut out,
                &[
                    "position",
                    &frame.to_string(),
                    &p.x.to_string(),
                    &p.y.to_string(),
                    &p.z.to_string(),
                ],
            );
        }
        for (frame, r) in &keys.rotations {
            push_line(
                &mut out,
                &[
                    "rotation",
                    &frame.to_string(),
                    &r.x.to_string(),
                    &r.y.to_string(),
                    &r.z.to_string(),
                    &r.w.to_string(),
                ],
            );
        }
    }
    out
}
