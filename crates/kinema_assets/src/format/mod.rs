//! Persisted text formats.
//!
//! Both formats are line-oriented ASCII: one record per line, a leading
//! keyword, whitespace-separated tokens. `#` starts a comment line. Tokens
//! that would not survive splitting are written double-quoted.
//!
//! Record order is significant and preserved in both directions: link order
//! decides which of two simultaneously satisfied links fires.

mod clip_text;
mod controller_text;
mod tokens;

pub use clip_text::{parse_clip, write_clip};
pub use controller_text::{parse_controller, parse_controller_with_settings, write_controller};
