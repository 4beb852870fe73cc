//! Engine host: one authoritative SessionState per session id

use std::collections::HashMap;

use cake_engine::{AssemblyEngine, OrderGenerator, SessionState, TransitionError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Builder;

use crate::wire::{self, Request, Response, SessionId};

/// Successful transition, before it is committed to the session table
enum Applied {
    State(SessionState),
    Submitted { state: SessionState, correct: bool },
}

/// Serves engine calls for any number of independent sessions.
///
/// Calls are serialized by `&mut self`; a session's state is replaced only
/// after its transition has fully succeeded.
pub struct SessionHost<G> {
    engine: AssemblyEngine<G>,
    sessions: HashMap<SessionId, SessionState>,
    ids: StdRng,
}

impl<G: OrderGenerator> SessionHost<G> {
    /// `seed` drives session id generation only
    pub fn new(engine: AssemblyEngine<G>, seed: u64) -> Self {
        Self {
            engine,
            sessions: HashMap::new(),
            ids: StdRng::seed_from_u64(seed),
        }
    }

    pub fn engine(&self) -> &AssemblyEngine<G> {
        &self.engine
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, id: SessionId) -> Option<&SessionState> {
        self.sessions.get(&id)
    }

    fn next_id(&mut self) -> SessionId {
        Builder::from_random_bytes(self.ids.random()).into_uuid()
    }

    /// Apply one request
    pub fn handle(&mut self, request: Request) -> Response {
        if let Request::NewGame { session } = request {
            return self.new_game(session);
        }

        let Some(session) = request.session() else {
            return Response::Malformed {
                reason: "request carries no session id".to_string(),
            };
        };
        let Some(state) = self.sessions.get(&session) else {
            tracing::debug!(session = %session, "request for unknown session");
            return Response::UnknownSession { session };
        };

        let result = match request {
            Request::State { .. } => Ok(Applied::State(state.clone())),
            Request::Confirm {
                category, value, ..
            } => self
                .engine
                .confirm(state, category, value)
                .map(Applied::State),
            Request::Undo { .. } => self.engine.undo(state).map(Applied::State),
            Request::Submit { .. } => self.engine.submit(state).map(|outcome| Applied::Submitted {
                state: outcome.state,
                correct: outcome.correct,
            }),
            Request::NewGame { .. } => unreachable!("handled above"),
        };

        self.settle(session, result)
    }

    fn new_game(&mut self, requested: Option<SessionId>) -> Response {
        let session = match requested {
            Some(id) if !self.sessions.contains_key(&id) => {
                return Response::UnknownSession { session: id };
            }
            Some(id) => id,
            None => self.next_id(),
        };

        let state = self.engine.new_game();
        if self.sessions.insert(session, state.clone()).is_some() {
            tracing::info!(session = %session, "session reset");
        } else {
            tracing::info!(session = %session, "session opened");
        }
        Response::Ok { session, state }
    }

    fn settle(&mut self, session: SessionId, result: Result<Applied, TransitionError>) -> Response {
        match result {
            Ok(Applied::State(state)) => {
                self.sessions.insert(session, state.clone());
                Response::Ok { session, state }
            }
            Ok(Applied::Submitted { state, correct }) => {
                tracing::info!(
                    session = %session,
                    correct,
                    score = state.score,
                    mistakes = state.mistakes,
                    phase = ?state.phase,
                    "submission scored"
                );
                self.sessions.insert(session, state.clone());
                Response::Submitted {
                    session,
                    correct,
                    state,
                }
            }
            Err(err) => {
                tracing::debug!(session = %session, %err, "transition rejected");
                match self.sessions.get(&session) {
                    Some(state) => Response::Rejected {
                        session,
                        reason: err.to_string(),
                        state: state.clone(),
                    },
                    None => Response::UnknownSession { session },
                }
            }
        }
    }

    /// Decode, apply and encode one JSON request
    pub fn handle_json(&mut self, raw: &str) -> String {
        let response = match wire::decode::<Request>(raw) {
            Ok(request) => self.handle(request),
            Err(err) => {
                tracing::debug!(%err, "malformed request");
                Response::Malformed {
                    reason: err.to_string(),
                }
            }
        };

        wire::encode(&response).unwrap_or_else(|err| {
            tracing::error!(%err, "failed to encode response");
            format!(
                r#"{{"status":"malformed","reason":"response encoding failed: {}"}}"#,
                err.to_string().replace('"', "'")
            )
        })
    }
}
