use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::blend::blend_factor;
use crate::clip::ClipHandle;
use crate::controller::parameters;
use crate::controller::{LinkKey, SharedController, StateKey, advance_clip_time};
use crate::settings::AnimationSettings;
use crate::skeleton::Skeleton;

/// The clip being faded out during a transition, sampled at its own
/// advancing time.
#[derive(Debug, Clone)]
pub(crate) struct OutgoingClip {
    pub(crate) clip: Option<ClipHandle>,
    pub(crate) time: f32,
    pub(crate) speed: f32,
    pub(crate) looping: bool,
}

/// Runtime cursor of one character through a shared [`AnimationController`].
///
/// The graph is referenced, never copied: the cursor only stores keys into
/// it, plus a private parameter snapshot and its own skeleton instance.
///
/// [`AnimationController`]: crate::controller::AnimationController
#[derive(Debug)]
pub struct Animator {
    controller: SharedController,
    pub(crate) skeleton: Skeleton,
    settings: AnimationSettings,
    play: bool,

    // === Cursor ===
    pub(crate) current_state: Option<StateKey>,
    pub(crate) current_time: f32,
    pub(crate) last_animation: Option<OutgoingClip>,
    pub(crate) transition_link: Option<LinkKey>,
    pub(crate) transition_duration: f32,
    pub(crate) elapsed_time: f32,
    /// Progress before a loop wrap, held for one evaluation.
    pub(crate) exit_latch: Option<f32>,
    pub(crate) missing_clip_reported: bool,

    // === Parameters ===
    pub(crate) parameters: FxHashMap<String, bool>,
    pub(crate) synced_parameters: u64,
    pub(crate) synced_structure: u64,
    pub(crate) condition_updated: bool,
}

impl Animator {
    /// Creates an Animator positioned at the graph's entry state, using the
    /// graph's settings.
    #[must_use]
    pub fn new(controller: SharedController, skeleton: Skeleton) -> Self {
        let settings = *controller.read().settings();
        Self::with_settings(controller, skeleton, settings)
    }

    #[must_use]
    pub fn with_settings(
        controller: SharedController,
        skeleton: Skeleton,
        settings: AnimationSettings,
    ) -> Self {
        let (entry, snapshot, parameters_version, structure_version) = {
            let graph = controller.read();
            (
                graph.entry_state(),
                parameters::seed(graph.parameters()),
                graph.parameters_version(),
                graph.structure_version(),
            )
        };
        Self {
            controller,
            skeleton,
            settings,
            play: settings.play_on_start,
            current_state: entry,
            current_time: 0.0,
            last_animation: None,
            transition_link: None,
            transition_duration: 0.0,
            elapsed_time: 0.0,
            exit_latch: None,
            missing_clip_reported: false,
            parameters: snapshot,
            synced_parameters: parameters_version,
            synced_structure: structure_version,
            condition_updated: false,
        }
    }

    // ========================================================================
    // Per-frame entry point
    // ========================================================================

    /// Advances the state machine by `dt` seconds and poses the skeleton.
    ///
    /// Does nothing while paused: the skeleton keeps its last pose.
    pub fn game_update(&mut self, dt: f32) {
        if !self.play {
            return;
        }
        let dt = self.settings.clamp_delta(dt);
        let controller = Arc::clone(&self.controller);
        let graph = controller.read();
        graph.update(self, dt);
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Sets a parameter in this Animator's snapshot. Undeclared names are
    /// ignored.
    pub fn set_boolean(&mut self, name: &str, value: bool) {
        if let Some(slot) = self.parameters.get_mut(name) {
            *slot = value;
            self.condition_updated = true;
            return;
        }
        // Declared after our last resync
        if self.controller.read().has_parameter(name) {
            self.parameters.insert(name.to_string(), value);
            self.condition_updated = true;
        } else {
            log::trace!("set_boolean: '{name}' is not a declared parameter");
        }
    }

    #[must_use]
    pub fn get_boolean(&self, name: &str) -> Option<bool> {
        self.parameters.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &FxHashMap<String, bool> {
        &self.parameters
    }

    /// Forces a parameter resync on the next tick.
    pub fn mark_conditions_dirty(&mut self) {
        self.condition_updated = true;
    }

    // ========================================================================
    // Play mode & editor stepping
    // ========================================================================

    pub fn play(&mut self) {
        self.play = true;
    }

    pub fn pause(&mut self) {
        self.play = false;
    }

    pub fn set_playing(&mut self, play: bool) {
        self.play = play;
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.play
    }

    /// Advances `current_time` by `dt` scaled by the current state's speed,
    /// wrapping or clamping per the state's loop flag.
    pub fn increment_time(&mut self, dt: f32) {
        self.move_time(dt, true);
    }

    /// Editor stepping: advances the current state and samples it, without
    /// evaluating transitions.
    pub fn step(&mut self, dt: f32) {
        self.increment_time(dt);
        self.sample_current();
    }

    /// Editor scrubbing: jumps to `time` seconds into the current state's
    /// clip and samples it.
    pub fn scrub(&mut self, time: f32) {
        self.current_time = 0.0;
        self.move_time(time, false);
        self.sample_current();
    }

    fn move_time(&mut self, delta: f32, scale_by_speed: bool) {
        let graph = self.controller.read();
        let Some(state) = self.current_state.and_then(|key| graph.state(key)) else {
            return;
        };
        let Some(duration) = state.duration() else {
            return;
        };
        let delta = if scale_by_speed {
            delta * state.speed
        } else {
            delta
        };
        let (time, _) = advance_clip_time(self.current_time, delta, duration, state.looping);
        self.current_time = time;
    }

    fn sample_current(&mut self) {
        let controller = Arc::clone(&self.controller);
        let graph = controller.read();
        graph.validate_cursor(self);
        graph.update_animation(self);
    }

    /// Back to the entry state with fresh parameter defaults.
    pub fn reset(&mut self) {
        let graph = self.controller.read();
        self.current_state = graph.entry_state();
        self.parameters = parameters::seed(graph.parameters());
        self.synced_parameters = graph.parameters_version();
        self.synced_structure = graph.structure_version();
        drop(graph);

        self.current_time = 0.0;
        self.clear_transition();
        self.exit_latch = None;
        self.missing_clip_reported = false;
        self.condition_updated = false;
    }

    pub(crate) fn clear_transition(&mut self) {
        self.last_animation = None;
        self.transition_link = None;
        self.transition_duration = 0.0;
        self.elapsed_time = 0.0;
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn controller(&self) -> &SharedController {
        &self.controller
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[inline]
    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn current_state(&self) -> Option<StateKey> {
        self.current_state
    }

    #[must_use]
    pub fn current_state_name(&self) -> Option<String> {
        let graph = self.controller.read();
        self.current_state
            .and_then(|key| graph.state(key))
            .map(|state| state.name().to_string())
    }

    /// Seconds into the current state's clip.
    #[inline]
    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Progress through the current state's clip, in `[0, 1]`.
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        let graph = self.controller.read();
        self.current_state
            .and_then(|key| graph.state(key))
            .map_or(0.0, |state| state.progress(self.current_time))
    }

    #[inline]
    #[must_use]
    pub fn transition_link(&self) -> Option<LinkKey> {
        self.transition_link
    }

    #[inline]
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.transition_link.is_some()
    }

    /// Whether an outgoing clip is still held for blending.
    #[inline]
    #[must_use]
    pub fn has_last_animation(&self) -> bool {
        self.last_animation.is_some()
    }

    /// Seconds the in-flight transition has been blending.
    #[inline]
    #[must_use]
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Weight of the incoming pose; `1.0` when not transitioning.
    #[must_use]
    pub fn blend_factor(&self) -> f32 {
        if self.transition_link.is_none() {
            return 1.0;
        }
        blend_factor(self.elapsed_time, self.transition_duration)
    }
}
