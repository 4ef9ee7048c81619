//! Command handlers.
//!
//! Each handler is a thin wrapper: read its inputs, call into the audio or
//! core crate, format the result for the terminal.

pub mod ambient;
pub mod devices;
pub mod paths;
pub mod render;
pub mod script;
pub mod speak;
pub mod voices;
