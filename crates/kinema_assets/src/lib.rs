//! Persisted formats and asset loading for the Kinema animation engine.
//!
//! - [`format`]: line-oriented text formats for clips and controllers
//! - [`io`]: file access relative to an asset root
//! - [`server`]: clip cache with background loading

pub mod format;
pub mod io;
pub mod server;

pub use format::{
    parse_clip, parse_controller, parse_controller_with_settings, write_clip, write_controller,
};
pub use io::FileAssetReader;
pub use server::AssetServer;
