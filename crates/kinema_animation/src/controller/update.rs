//! Per-frame evaluation of an Animator against the graph.
//!
//! Order within one tick:
//! 1. parameter resync
//! 2. cursor validation (states or links deleted under the cursor)
//! 3. condition scan of the current state's outgoing links
//! 4. exit-time latch release
//! 5. transition advance, then pose sampling (blended while transitioning)
//! 6. clip time advance

use crate::animator::{Animator, OutgoingClip};
use crate::blend::ClipPlayback;
use crate::clip::ClipHandle;

use super::graph::{AnimationController, LinkKey, StateKey};
use super::parameters;
use super::state::advance_clip_time;

impl AnimationController {
    /// Advances `animator` by `dt` seconds against this graph.
    pub fn update(&self, animator: &mut Animator, dt: f32) {
        self.update_parameters(animator);
        if !self.validate_cursor(animator) {
            return;
        }
        self.update_conditions(animator);
        animator.exit_latch = None;
        self.update_transition(animator, dt);
        self.advance_time(animator, dt);
    }

    fn update_parameters(&self, animator: &mut Animator) {
        let stale = self
            .parameters_version
            .is_newer_than(animator.synced_parameters);
        if !stale && !animator.condition_updated {
            return;
        }
        parameters::resync(&mut animator.parameters, &self.parameters);
        animator.synced_parameters = self.parameters_version.version();
        animator.condition_updated = false;
        if stale {
            log::debug!(
                "Controller '{}': animator parameters resynced ({} declared)",
                self.name,
                self.parameters.len()
            );
        }
    }

    /// Repairs a cursor whose state or link was removed. Returns `false`
    /// when the tick must stop here, with the skeleton at bind pose.
    pub(crate) fn validate_cursor(&self, animator: &mut Animator) -> bool {
        let structure_changed = self
            .structure_version
            .is_newer_than(animator.synced_structure);
        animator.synced_structure = self.structure_version.version();

        let state_valid = animator
            .current_state
            .is_some_and(|key| self.states.contains_key(key));
        if !state_valid {
            if animator.current_state.is_some() || structure_changed {
                log::warn!(
                    "Controller '{}': animator state vanished, resetting to entry state",
                    self.name
                );
            }
            animator.current_state = self.entry_state();
            animator.current_time = 0.0;
            animator.exit_latch = None;
            animator.missing_clip_reported = false;
            animator.clear_transition();
            animator.skeleton.reset_to_bind_pose();
            return false;
        }

        if let Some(link) = animator.transition_link
            && !self.links.contains_key(link)
        {
            log::warn!(
                "Controller '{}': in-flight transition removed, dropping blend",
                self.name
            );
            animator.clear_transition();
        }
        true
    }

    /// Starts the first outgoing link, in declaration order, whose
    /// conditions and exit time are satisfied.
    fn update_conditions(&self, animator: &mut Animator) {
        if animator.transition_link.is_some() {
            return;
        }
        let Some(current) = animator.current_state else {
            return;
        };
        let Some(state) = self.states.get(current) else {
            return;
        };
        let progress = state.progress(animator.current_time);

        let found = self
            .outgoing_links(current)
            .find(|(_, link)| {
                link.conditions_met(&animator.parameters)
                    && link.exit_time_reached(progress, animator.exit_latch)
            })
            .map(|(key, _)| key);

        if let Some(link) = found {
            self.change_animation(link, animator);
        }
    }

    /// Captures the outgoing clip at its current time, then moves the
    /// cursor to the link's destination.
    fn change_animation(&self, key: LinkKey, animator: &mut Animator) {
        let Some(link) = self.links.get(key) else {
            return;
        };
        let outgoing = animator
            .current_state
            .and_then(|state| self.states.get(state))
            .map(|state| OutgoingClip {
                clip: state.clip.clone(),
                time: animator.current_time,
                speed: state.speed,
                looping: state.looping,
            });

        log::debug!(
            "Controller '{}': transition '{}' -> '{}' ({}s)",
            self.name,
            self.state_name(link.source),
            self.state_name(link.destination),
            link.transition_duration
        );

        animator.last_animation = outgoing;
        animator.transition_link = Some(key);
        animator.transition_duration = link.transition_duration;
        animator.elapsed_time = 0.0;
        animator.current_state = Some(link.destination);
        animator.current_time = 0.0;
        animator.exit_latch = None;
        animator.missing_clip_reported = false;
    }

    fn update_transition(&self, animator: &mut Animator, dt: f32) {
        if let Some(key) = animator.transition_link {
            match self.links.get(key) {
                Some(link) => {
                    animator.elapsed_time += dt;
                    animator.transition_duration = link.transition_duration;
                    if animator.elapsed_time >= link.transition_duration {
                        log::debug!(
                            "Controller '{}': transition into '{}' finished",
                            self.name,
                            self.state_name(link.destination)
                        );
                        animator.clear_transition();
                    }
                }
                None => animator.clear_transition(),
            }
        }
        self.update_animation(animator);
    }

    /// Poses the skeleton from the cursor: a single clip, or a cross-fade
    /// while a transition is in flight.
    pub(crate) fn update_animation(&self, animator: &mut Animator) {
        let Some(state) = animator.current_state.and_then(|key| self.states.get(key)) else {
            animator.skeleton.reset_to_bind_pose();
            return;
        };

        let clip = state.clip.as_ref().and_then(ClipHandle::get);
        if state.clip.is_some() && clip.is_none() && !animator.missing_clip_reported {
            log::warn!(
                "Controller '{}': clip for state '{}' is not loaded, using bind pose",
                self.name,
                state.name
            );
            animator.missing_clip_reported = true;
        }
        let incoming = ClipPlayback::new(clip.as_deref(), animator.current_time);

        match (&animator.last_animation, animator.transition_link) {
            (Some(outgoing), Some(link)) => {
                let outgoing_clip = outgoing.clip.as_ref().and_then(ClipHandle::get);
                let outgoing = ClipPlayback::new(outgoing_clip.as_deref(), outgoing.time);
                let duration = self
                    .links
                    .get(link)
                    .map_or(0.0, |link| link.transition_duration);
                animator
                    .skeleton
                    .cross_fade(duration, animator.elapsed_time, outgoing, incoming);
            }
            _ => animator.skeleton.update_pose(incoming.clip, incoming.time),
        }
    }

    fn advance_time(&self, animator: &mut Animator, dt: f32) {
        if let Some(state) = animator.current_state.and_then(|key| self.states.get(key))
            && let Some(duration) = state.duration()
        {
            let delta = dt * state.speed;
            let prior = state.progress(animator.current_time);
            let (time, wrapped) =
                advance_clip_time(animator.current_time, delta, duration, state.looping);
            log::trace!("state '{}' time {time:.4}", state.name);
            animator.current_time = time;
            if wrapped && delta > 0.0 {
                // A whole clip or more in one tick sweeps every threshold
                animator.exit_latch = Some(if delta >= duration { 0.0 } else { prior });
            }
        }

        if let Some(outgoing) = animator.last_animation.as_mut() {
            let duration = outgoing
                .clip
                .as_ref()
                .and_then(ClipHandle::get)
                .map(|clip| clip.duration());
            if let Some(duration) = duration {
                let (time, _) = advance_clip_time(
                    outgoing.time,
                    dt * outgoing.speed,
                    duration,
                    outgoing.looping,
                );
                outgoing.time = time;
            }
        }
    }

    fn state_name(&self, key: StateKey) -> &str {
        self.states.get(key).map_or("<removed>", |state| state.name.as_str())
    }
}
