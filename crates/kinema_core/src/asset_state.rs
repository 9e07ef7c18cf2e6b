//! Asset readiness flags
//!
//! Background loaders publish their progress through [`AssetState`] so the
//! simulation thread can poll without blocking. Writers use `Release`,
//! readers `Acquire`: once `is_loaded()` returns true, the payload stored
//! before `mark_loaded()` is visible.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct AssetState {
    loaded: AtomicBool,
    sent: AtomicBool,
    failed: AtomicBool,
}

impl AssetState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for data that exists before anything asks for it.
    #[must_use]
    pub fn loaded() -> Self {
        Self {
            loaded: AtomicBool::new(true),
            sent: AtomicBool::new(false),
            failed: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Marks the data as handed to its consumers (e.g. uploaded).
    #[inline]
    pub fn mark_sent(&self) {
        self.sent.store(true, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn has_been_sent(&self) -> bool {
        self.sent.load(Ordering::Acquire)
    }

    /// Loading gave up. The asset will never become ready.
    #[inline]
    pub fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Neither loaded nor failed yet.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.is_loaded() && !self.has_failed()
    }
}
