//! Foundational types shared by every Kinema crate.
//!
//! - [`errors`]: the [`KinemaError`] type and the crate-wide [`Result`] alias
//! - [`version`]: monotonically increasing change counters
//! - [`asset_state`]: atomic readiness flags published by background loaders

pub mod asset_state;
pub mod errors;
pub mod version;

pub use asset_state::AssetState;
pub use errors::{KinemaError, Result};
pub use version::ChangeTracker;
