//! Input handling root.
//!
//! Control-scheme bindings and the toggle/edge tracker that turns momentary
//! presses into persistent flags.

pub mod bindings;
pub mod toggle;
