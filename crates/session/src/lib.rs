//! Session hosting and client side of the Cake Factory game
//!
//! This crate provides:
//! - JSON wire protocol (Request / Response)
//! - SessionHost: the engine host, one SessionState per session id
//! - Transport trait and LocalTransport
//! - PresentationState and the pure `compose` overlay (DisplaySnapshot)
//! - Client: intent dispatch with a single-flight guard and submission hold

mod client;
mod host;
mod presentation;
mod transport;
mod wire;

pub use client::*;
pub use host::*;
pub use presentation::*;
pub use transport::*;
pub use wire::*;
