//! Cake Factory
//!
//! A turn-based cake assembly game: rebuild each ordered cake one layer at a
//! time before running out of lives.
//!
//! This crate re-exports the engine and session crates and adds the terminal
//! front end pieces.

pub use cake_engine::*;
pub use cake_session as session;

pub mod config;
pub mod display;
