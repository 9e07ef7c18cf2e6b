use glam::Vec2;
use kinema_animation::{AnimationController, AnimationSettings, ClipHandle, Condition, LinkKey};
use kinema_core::{KinemaError, Result};

use super::tokens::{self, push_line, quote};

const NO_CLIP: &str = "-";

/// Link that following `condition` records attach to. `Skipped` when the
/// link itself was dropped, so its conditions go with it.
#[derive(Clone, Copy)]
enum Target {
    None,
    Link(LinkKey),
    Skipped,
}

/// Parses a controller file with default [`AnimationSettings`].
///
/// `resolver` turns each clip path into a handle; the asset server hands
/// out pending handles here so clips load in the background.
pub fn parse_controller(
    text: &str,
    resolver: impl FnMut(&str) -> ClipHandle,
) -> Result<AnimationController> {
    parse_controller_with_settings(text, AnimationSettings::default(), resolver)
}

pub fn parse_controller_with_settings(
    text: &str,
    settings: AnimationSettings,
    mut resolver: impl FnMut(&str) -> ClipHandle,
) -> Result<AnimationController> {
    let mut controller = AnimationController::with_settings("", settings);
    let mut target = Target::None;

    for record in tokens::records(text)? {
        match record.keyword() {
            "controller" => {
                record.expect_args(1)?;
                controller.set_name(record.str(1));
            }
            "parameter" => {
                record.expect_args(2)?;
                let default = record.bool(2, "parameter default")?;
                controller.add_parameter(record.str(1), default)?;
            }
            "state" => {
                record.expect_args(6)?;
                let clip = match record.str(2) {
                    NO_CLIP => None,
                    path => Some(resolver(path)),
                };
                let looping = record.bool(3, "loop flag")?;
                let speed = record.parse(4, "speed")?;
                let position = Vec2::new(record.parse(5, "x")?, record.parse(6, "y")?);
                let key = controller.add_state_with_clip(record.str(1), clip, looping, speed)?;
                controller.set_state_position(key, position)?;
            }
            "link" => {
                record.expect_args(5)?;
                let has_exit_time = record.bool(3, "exit time flag")?;
                let exit_time: f32 = record.parse(4, "exit time")?;
                let duration: f32 = record.parse(5, "transition duration")?;

                let (source, destination) = match (
                    controller.state_by_name(record.str(1)),
                    controller.state_by_name(record.str(2)),
                ) {
                    (Some(source), Some(destination)) => (source, destination),
                    _ => {
                        log::warn!(
                            "controller '{}': link '{}' -> '{}' at line {} names an unknown state, skipped",
                            controller.name(),
                            record.str(1),
                            record.str(2),
                            record.line
                        );
                        target = Target::Skipped;
                        continue;
                    }
                };

                let key = controller.add_link(source, destination)?;
                controller.set_exit_time(key, has_exit_time.then_some(exit_time))?;
                if let Some(link) = controller.link_mut(key) {
                    link.exit_time = exit_time.clamp(0.0, 1.0);
                }
                controller.set_transition_duration(key, duration)?;
                target = Target::Link(key);
            }
            "condition" => {
                record.expect_args(2)?;
                let parameter = record.str(1);
                let required = record.bool(2, "condition value")?;
                let key = match target {
                    Target::Link(key) => key,
                    Target::Skipped => continue,
                    Target::None => {
                        return Err(KinemaError::parse(
                            record.line,
                            "'condition' record before any 'link' record",
                        ));
                    }
                };
                if !controller.has_parameter(parameter) {
                    log::warn!(
                        "controller '{}': condition at line {} references undeclared parameter '{parameter}'",
                        controller.name(),
                        record.line
                    );
                }
                if let Some(link) = controller.link_mut(key) {
                    link.conditions.push(Condition::new(parameter, required));
                }
            }
            other => {
                log::warn!(
                    "controller '{}': ignoring unknown record '{other}' at line {}",
                    controller.name(),
                    record.line
                );
            }
        }
    }

    log::debug!(
        "Parsed controller '{}': {} states, {} links, {} parameters",
        controller.name(),
        controller.state_count(),
        controller.link_count(),
        controller.parameters().len()
    );
    Ok(controller)
}

/// Writes a controller in the format read by [`parse_controller`].
///
/// States and links keep their declaration order, so the first state is
/// still the entry state after a round trip.
#[must_use]
pub fn write_controller(controller: &AnimationController) -> String {
    let mut out = String::new();
    push_line(&mut out, &["controller", &quote(controller.name())]);

    for parameter in controller.parameters() {
        push_line(
            &mut out,
            &["parameter", &quote(&parameter.name), bool_token(parameter.default)],
        );
    }

    for (_, state) in controller.states() {
        let clip = state.clip.as_ref().map_or(NO_CLIP, ClipHandle::path);
        push_line(
            &mut out,
            &[
                "state",
                &quote(state.name()),
                &quote(clip),
                bool_token(state.looping),
                &state.speed.to_string(),
                &state.position.x.to_string(),
                &state.position.y.to_string(),
            ],
        );
    }

    for (_, link) in controller.links() {
        let (Some(source), Some(destination)) = (
            controller.state(link.source()),
            controller.state(link.destination()),
        ) else {
            continue;
        };
        push_line(
            &mut out,
            &[
                "link",
                &quote(source.name()),
                &quote(destination.name()),
                bool_token(link.has_exit_time),
                &link.exit_time.to_string(),
                &link.transition_duration.to_string(),
            ],
        );
        for condition in &link.conditions {
            push_line(
                &mut out,
                &[
                    "condition",
                    &quote(&condition.parameter),
                    bool_token(condition.required),
                ],
            );
        }
    }
    out
}

fn bool_token(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
