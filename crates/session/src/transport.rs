//! Request/response channel between a client and an engine host

use cake_engine::OrderGenerator;
use thiserror::Error;

use crate::host::SessionHost;
use crate::wire::{self, Request, Response};

/// A call that could not complete. Recoverable: the caller keeps its state.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("engine host unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous request -> single response boundary
pub trait Transport {
    fn call(&mut self, request: &Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn call(&mut self, request: &Request) -> Result<Response, TransportError> {
        (**self).call(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&mut self, request: &Request) -> Result<Response, TransportError> {
        (**self).call(request)
    }
}

/// In-process transport. Every call goes through the JSON encoding so the
/// local path exercises the same codec a remote one would.
pub struct LocalTransport<G> {
    host: SessionHost<G>,
}

impl<G: OrderGenerator> LocalTransport<G> {
    pub fn new(host: SessionHost<G>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &SessionHost<G> {
        &self.host
    }

    pub fn into_host(self) -> SessionHost<G> {
        self.host
    }
}

impl<G: OrderGenerator> Transport for LocalTransport<G> {
    fn call(&mut self, request: &Request) -> Result<Response, TransportError> {
        let raw = wire::encode(request).map_err(TransportError::Encode)?;
        let reply = self.host.handle_json(&raw);
        wire::decode(&reply).map_err(TransportError::Decode)
    }
}
