//! Arena timeline — author and replay boss encounters on a 2D arena.
//!
//! `document` owns the scene and every edit to it, `engine` answers "what
//! does the arena look like at time T", and `player` drives the engine from a
//! terminal.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod menubar;
pub mod player;
pub mod types;
