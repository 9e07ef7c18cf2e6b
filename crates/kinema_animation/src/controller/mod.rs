//! Animation state graph.
//!
//! An [`AnimationController`] is an editable asset shared by many
//! [`Animator`](crate::animator::Animator)s. States and links live in
//! slot-map arenas, so a cursor holding a [`StateKey`] or [`LinkKey`] can
//! detect that the element was deleted instead of dangling.

mod graph;
pub mod link;
pub mod parameters;
pub mod state;
mod update;

pub use graph::{AnimationController, LinkKey, SharedController, StateKey};
pub use link::{Condition, StateLink};
pub use parameters::Parameter;
pub use state::{AnimationState, advance_clip_time};
