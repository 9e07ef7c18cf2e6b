use std::sync::Arc;

use glam::Vec2;
use kinema_core::{ChangeTracker, KinemaError, Result};
use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use super::link::{Condition, StateLink};
use super::parameters::Parameter;
use super::state::AnimationState;
use crate::clip::ClipHandle;
use crate::settings::AnimationSettings;

new_key_type! {
    pub struct StateKey;
    pub struct LinkKey;
}

/// A graph shared between the editor and any number of Animators.
///
/// Animators take the read lock once per tick. Structural edits take the
/// write lock and must only happen while no Animator is playing against it.
pub type SharedController = Arc<RwLock<AnimationController>>;

/// The animation state graph: states, the links between them, and the
/// boolean parameters their conditions read.
///
/// Declaration order of states, links and parameters is kept separately
/// from the arenas. Link order decides which of several simultaneously
/// satisfied links fires: the first one declared.
#[derive(Debug, Clone)]
pub struct AnimationController {
    pub(super) name: String,

    pub(super) states: SlotMap<StateKey, AnimationState>,
    pub(super) state_order: Vec<StateKey>,

    pub(super) links: SlotMap<LinkKey, StateLink>,
    pub(super) link_order: Vec<LinkKey>,

    pub(super) parameters: Vec<Parameter>,

    pub(super) parameters_version: ChangeTracker,
    pub(super) structure_version: ChangeTracker,

    pub(super) settings: AnimationSettings,
}

impl AnimationController {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_settings(name, AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(name: &str, settings: AnimationSettings) -> Self {
        Self {
            name: name.to_string(),
            states: SlotMap::with_key(),
            state_order: Vec::new(),
            links: SlotMap::with_key(),
            link_order: Vec::new(),
            parameters: Vec::new(),
            parameters_version: ChangeTracker::new(),
            structure_version: ChangeTracker::new(),
            settings,
        }
    }

    /// Wraps the graph for sharing between the editor and Animators.
    #[must_use]
    pub fn into_shared(self) -> SharedController {
        Arc::new(RwLock::new(self))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    /// Bumped whenever the declared parameter set or a default changes.
    #[inline]
    #[must_use]
    pub fn parameters_version(&self) -> u64 {
        self.parameters_version.version()
    }

    /// Bumped whenever a state or link is removed.
    #[inline]
    #[must_use]
    pub fn structure_version(&self) -> u64 {
        self.structure_version.version()
    }

    // ========================================================================
    // States
    // ========================================================================

    /// Adds an empty state with the default loop flag and speed.
    pub fn add_state(&mut self, name: &str) -> Result<StateKey> {
        let state = AnimationState::new(
            name,
            self.settings.default_state_looping,
            self.settings.default_state_speed,
        );
        self.insert_state(state)
    }

    pub fn add_state_with_clip(
        &mut self,
        name: &str,
        clip: Option<ClipHandle>,
        looping: bool,
        speed: f32,
    ) -> Result<StateKey> {
        let mut state = AnimationState::new(name, looping, speed);
        state.clip = clip;
        self.insert_state(state)
    }

    fn insert_state(&mut self, state: AnimationState) -> Result<StateKey> {
        if self.state_by_name(&state.name).is_some() {
            return Err(KinemaError::DuplicateState(state.name));
        }
        let key = self.states.insert(state);
        self.state_order.push(key);
        Ok(key)
    }

    pub fn rename_state(&mut self, key: StateKey, new_name: &str) -> Result<()> {
        if let Some(existing) = self.state_by_name(new_name) {
            if existing == key {
                return Ok(());
            }
            return Err(KinemaError::DuplicateState(new_name.to_string()));
        }
        let state = self
            .states
            .get_mut(key)
            .ok_or_else(|| KinemaError::UnknownState(format!("{key:?}")))?;
        state.name = new_name.to_string();
        Ok(())
    }

    /// Removes a state together with every link that starts or ends at it.
    pub fn remove_state(&mut self, key: StateKey) -> Result<AnimationState> {
        let state = self
            .states
            .remove(key)
            .ok_or_else(|| KinemaError::UnknownState(format!("{key:?}")))?;
        self.state_order.retain(|k| *k != key);

        let links = &mut self.links;
        let before = self.link_order.len();
        self.link_order.retain(|link_key| {
            let dangling = links
                .get(*link_key)
                .is_none_or(|link| link.source == key || link.destination == key);
            if dangling {
                links.remove(*link_key);
            }
            !dangling
        });
        log::debug!(
            "Controller '{}': removed state '{}' and {} link(s)",
            self.name,
            state.name,
            before - self.link_order.len()
        );

        self.structure_version.changed();
        Ok(state)
    }

    #[inline]
    #[must_use]
    pub fn state(&self, key: StateKey) -> Option<&AnimationState> {
        self.states.get(key)
    }

    #[inline]
    pub fn state_mut(&mut self, key: StateKey) -> Option<&mut AnimationState> {
        self.states.get_mut(key)
    }

    #[must_use]
    pub fn state_by_name(&self, name: &str) -> Option<StateKey> {
        self.state_order
            .iter()
            .copied()
            .find(|key| self.states[*key].name == name)
    }

    /// States in declaration order.
    pub fn states(&self) -> impl Iterator<Item = (StateKey, &AnimationState)> + '_ {
        self.state_order.iter().map(|key| (*key, &self.states[*key]))
    }

    #[inline]
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.state_order.len()
    }

    #[inline]
    #[must_use]
    pub fn contains_state(&self, key: StateKey) -> bool {
        self.states.contains_key(key)
    }

    /// The first declared state, where Animators start and fall back to.
    #[inline]
    #[must_use]
    pub fn entry_state(&self) -> Option<StateKey> {
        self.state_order.first().copied()
    }

    pub fn set_state_clip(&mut self, key: StateKey, clip: Option<ClipHandle>) -> Result<()> {
        self.state_entry(key)?.clip = clip;
        Ok(())
    }

    pub fn set_state_looping(&mut self, key: StateKey, looping: bool) -> Result<()> {
        self.state_entry(key)?.looping = looping;
        Ok(())
    }

    pub fn set_state_speed(&mut self, key: StateKey, speed: f32) -> Result<()> {
        self.state_entry(key)?.speed = speed;
        Ok(())
    }

    pub fn set_state_position(&mut self, key: StateKey, position: Vec2) -> Result<()> {
        self.state_entry(key)?.position = position;
        Ok(())
    }

    fn state_entry(&mut self, key: StateKey) -> Result<&mut AnimationState> {
        self.states
            .get_mut(key)
            .ok_or_else(|| KinemaError::UnknownState(format!("{key:?}")))
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Appends a link from `source` to `destination`, with no exit time and
    /// no conditions.
    pub fn add_link(&mut self, source: StateKey, destination: StateKey) -> Result<LinkKey> {
        for key in [source, destination] {
            if !self.states.contains_key(key) {
                return Err(KinemaError::UnknownState(format!("{key:?}")));
            }
        }
        let link = StateLink::new(
            source,
            destination,
            self.settings.default_transition_duration,
        );
        let key = self.links.insert(link);
        self.link_order.push(key);
        Ok(key)
    }

    pub fn remove_link(&mut self, key: LinkKey) -> Result<StateLink> {
        let link = self.links.remove(key).ok_or(KinemaError::UnknownLink)?;
        self.link_order.retain(|k| *k != key);
        self.structure_version.changed();
        Ok(link)
    }

    #[inline]
    #[must_use]
    pub fn link(&self, key: LinkKey) -> Option<&StateLink> {
        self.links.get(key)
    }

    #[inline]
    pub fn link_mut(&mut self, key: LinkKey) -> Option<&mut StateLink> {
        self.links.get_mut(key)
    }

    /// Links in declaration order.
    pub fn links(&self) -> impl Iterator<Item = (LinkKey, &StateLink)> + '_ {
        self.link_order.iter().map(|key| (*key, &self.links[*key]))
    }

    /// Links leaving `state`, in declaration order.
    pub fn outgoing_links(
        &self,
        state: StateKey,
    ) -> impl Iterator<Item = (LinkKey, &StateLink)> + '_ {
        self.links().filter(move |(_, link)| link.source == state)
    }

    #[inline]
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.link_order.len()
    }

    /// `Some(t)` gates the link at normalized progress `t` (clamped to
    /// `[0, 1]`), `None` removes the gate.
    pub fn set_exit_time(&mut self, key: LinkKey, exit_time: Option<f32>) -> Result<()> {
        let link = self.link_entry(key)?;
        match exit_time {
            Some(t) => {
                link.has_exit_time = true;
                link.exit_time = t.clamp(0.0, 1.0);
            }
            None => link.has_exit_time = false,
        }
        Ok(())
    }

    pub fn set_transition_duration(&mut self, key: LinkKey, duration: f32) -> Result<()> {
        self.link_entry(key)?.transition_duration = duration;
        Ok(())
    }

    /// Appends `parameter == required` to the link's conditions.
    pub fn add_condition(&mut self, key: LinkKey, parameter: &str, required: bool) -> Result<()> {
        if self.parameter(parameter).is_none() {
            return Err(KinemaError::UnknownParameter(parameter.to_string()));
        }
        self.link_entry(key)?
            .conditions
            .push(Condition::new(parameter, required));
        Ok(())
    }

    pub fn remove_condition(&mut self, key: LinkKey, index: usize) -> Result<Condition> {
        let link = self.link_entry(key)?;
        if index >= link.conditions.len() {
            return Err(KinemaError::IndexOutOfBounds {
                context: "link condition".to_string(),
                index,
            });
        }
        Ok(link.conditions.remove(index))
    }

    fn link_entry(&mut self, key: LinkKey) -> Result<&mut StateLink> {
        self.links.get_mut(key).ok_or(KinemaError::UnknownLink)
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    pub fn add_parameter(&mut self, name: &str, default: bool) -> Result<()> {
        if self.parameter(name).is_some() {
            return Err(KinemaError::DuplicateParameter(name.to_string()));
        }
        self.parameters.push(Parameter::new(name, default));
        self.parameters_version.changed();
        Ok(())
    }

    /// Renames a parameter and every condition that reads it.
    pub fn rename_parameter(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if old_name == new_name {
            return Ok(());
        }
        if self.parameter(new_name).is_some() {
            return Err(KinemaError::DuplicateParameter(new_name.to_string()));
        }
        let parameter = self
            .parameters
            .iter_mut()
            .find(|p| p.name == old_name)
            .ok_or_else(|| KinemaError::UnknownParameter(old_name.to_string()))?;
        parameter.name = new_name.to_string();

        for link in self.links.values_mut() {
            for condition in &mut link.conditions {
                if condition.parameter == old_name {
                    condition.parameter = new_name.to_string();
                }
            }
        }
        self.parameters_version.changed();
        Ok(())
    }

    /// Removes a parameter. Conditions that read it stay on their links and
    /// evaluate to false from now on.
    pub fn delete_parameter(&mut self, name: &str) -> Result<()> {
        let index = self
            .parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| KinemaError::UnknownParameter(name.to_string()))?;
        self.parameters.remove(index);
        self.parameters_version.changed();
        Ok(())
    }

    pub fn set_parameter_default(&mut self, name: &str, default: bool) -> Result<()> {
        let parameter = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| KinemaError::UnknownParameter(name.to_string()))?;
        parameter.default = default;
        self.parameters_version.changed();
        Ok(())
    }

    /// Declared parameters in declaration order.
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    #[inline]
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }
}
