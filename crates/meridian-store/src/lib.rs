// crates/meridian-store/src/lib.rs
//
// meridian-store: Persistence layer for the Meridian metagraph.
//
// Provides the keyed bundle codec that turns a Snapshot into bytes and back,
// and the file helpers that place one bundle per network under the user's
// config root.

pub mod bundle;
pub mod file;

// Re-export key items for ergonomic access from downstream crates.
pub use bundle::{deserialize, serialize};
pub use file::{
    default_root_dir, expand_tilde, load_from_path, save_to_path, snapshot_path,
    DEFAULT_ROOT_DIR, SNAPSHOT_EXTENSION,
};
