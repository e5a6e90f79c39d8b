// crates/meridian-cli/src/commands/mod.rs
//
// Command module declarations for the Meridian CLI.

pub mod show;
pub mod sync;
