/// Edit counter for one part of a state graph.
///
/// The graph bumps it on every edit that running Animators must pick up,
/// such as a parameter declaration or a state removal. Each Animator keeps
/// the [`version`](Self::version) it last synchronized against and resyncs
/// when the graph's counter differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    version: u64,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { version: 0 }
    }

    /// Records an edit. Animators holding an older version resync on their
    /// next tick.
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// The version an Animator stores after synchronizing.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether a consumer that last saw `seen` is out of date.
    #[inline]
    #[must_use]
    pub fn is_newer_than(&self, seen: u64) -> bool {
        self.version != seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_bumps_version() {
        let mut tracker = ChangeTracker::new();
        let seen = tracker.version();
        assert!(!tracker.is_newer_than(seen));

        tracker.changed();
        assert_eq!(tracker.version(), seen + 1);
        assert!(tracker.is_newer_than(seen));
    }

    #[test]
    fn test_version_wraps() {
        let mut tracker = ChangeTracker { version: u64::MAX };
        tracker.changed();
        assert_eq!(tracker.version(), 0);
    }
}
