use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::graph::StateKey;

/// `parameter == required`. A parameter missing from the snapshot never
/// satisfies a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub parameter: String,
    pub required: bool,
}

impl Condition {
    #[must_use]
    pub fn new(parameter: impl Into<String>, required: bool) -> Self {
        Self {
            parameter: parameter.into(),
            required,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_met(&self, parameters: &FxHashMap<String, bool>) -> bool {
        parameters.get(&self.parameter) == Some(&self.required)
    }
}

/// A directed transition between two states.
#[derive(Debug, Clone)]
pub struct StateLink {
    pub(crate) source: StateKey,
    pub(crate) destination: StateKey,

    /// Gate the link on the source clip's normalized progress.
    pub has_exit_time: bool,
    /// Normalized progress in `[0, 1]`, only used with `has_exit_time`.
    pub exit_time: f32,
    /// Cross-fade length in seconds. `<= 0` switches in a single tick.
    pub transition_duration: f32,
    /// All must hold (logical AND). Evaluated in order.
    pub conditions: SmallVec<[Condition; 4]>,
}

impl StateLink {
    #[must_use]
    pub(crate) fn new(source: StateKey, destination: StateKey, transition_duration: f32) -> Self {
        Self {
            source,
            destination,
            has_exit_time: false,
            exit_time: 1.0,
            transition_duration,
            conditions: SmallVec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> StateKey {
        self.source
    }

    #[inline]
    #[must_use]
    pub fn destination(&self) -> StateKey {
        self.destination
    }

    /// `None` when the link has no exit-time gate.
    #[must_use]
    pub fn exit_time(&self) -> Option<f32> {
        self.has_exit_time.then_some(self.exit_time)
    }

    /// Every condition holds. Trivially true with no conditions.
    #[must_use]
    pub fn conditions_met(&self, parameters: &FxHashMap<String, bool>) -> bool {
        self.conditions.iter().all(|c| c.is_met(parameters))
    }

    /// The exit-time gate is open for the given source progress.
    ///
    /// `wrapped_from` is the progress a looping clip had before it wrapped on
    /// the previous tick. Only thresholds above it were swept past.
    #[must_use]
    pub fn exit_time_reached(&self, progress: f32, wrapped_from: Option<f32>) -> bool {
        !self.has_exit_time
            || progress >= self.exit_time
            || wrapped_from.is_some_and(|prior| self.exit_time > prior)
    }
}
