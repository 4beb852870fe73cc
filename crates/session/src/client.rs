//! Intent dispatch for one player
//!
//! The client keeps the last authoritative SessionState it received, a local
//! pending selection, and a single-flight guard. Intents that arrive while an
//! engine call or a submission hold is active are dropped.

use std::time::Duration;

use cake_engine::{Ingredient, Phase, SessionState};
use thiserror::Error;

use crate::presentation::{compose, DisplaySnapshot, PresentationState};
use crate::transport::{Transport, TransportError};
use crate::wire::{Request, Response, SessionId};

/// How long submission feedback stays up before the next state is shown
pub const DEFAULT_SUBMISSION_HOLD: Duration = Duration::from_millis(1300);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    pub submission_hold: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            submission_hold: DEFAULT_SUBMISSION_HOLD,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("engine rejected the request: {0}")]
    Rejected(String),
    #[error("engine has no session {0}")]
    UnknownSession(SessionId),
    #[error("unexpected reply from engine: {0}")]
    Protocol(String),
    #[error("no session is open")]
    NoSession,
}

/// What an intent did
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Dropped because a call or a submission hold is in progress
    Suppressed,
    /// Not applicable to the current state; nothing happened
    Ignored,
    /// Pending selection set, no engine call
    Previewed,
    /// Pending selection cleared, no engine call
    PendingCleared,
    /// Engine accepted the call and the new state is in place
    Applied,
    /// Submission scored; the new state is held until `finish_submission`
    SubmissionHeld { correct: bool },
}

enum Reply {
    State(SessionId, SessionState),
    Submitted(SessionId, SessionState, bool),
}

struct HeldSubmission {
    session: SessionId,
    state: SessionState,
    correct: bool,
}

pub struct Client<T> {
    transport: T,
    config: ClientConfig,
    session: Option<SessionId>,
    state: Option<SessionState>,
    presentation: PresentationState,
    in_flight: bool,
    held: Option<HeldSubmission>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            session: None,
            state: None,
            presentation: PresentationState::default(),
            in_flight: false,
            held: None,
        }
    }

    pub fn config(&self) -> ClientConfig {
        self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session
    }

    /// Last authoritative state received
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn pending(&self) -> Option<Ingredient> {
        self.presentation.pending()
    }

    /// True while intents are being dropped
    pub fn is_busy(&self) -> bool {
        self.in_flight || self.held.is_some()
    }

    /// Result of the submission currently being held, if any
    pub fn held_feedback(&self) -> Option<bool> {
        self.held.as_ref().map(|held| held.correct)
    }

    pub fn display(&self) -> Option<DisplaySnapshot> {
        self.state
            .as_ref()
            .map(|state| compose(state, self.presentation.pending()))
    }

    /// Attach to an existing session and fetch its state
    pub fn open(&mut self, session: SessionId) -> Result<Outcome, ClientError> {
        if self.is_busy() {
            return Ok(self.suppressed("open"));
        }
        self.fetch(Request::State { session })
    }

    /// Re-fetch the open session's state
    pub fn refresh(&mut self) -> Result<Outcome, ClientError> {
        let session = self.session.ok_or(ClientError::NoSession)?;
        self.open(session)
    }

    /// Start over, reusing the open session if there is one
    pub fn new_game(&mut self) -> Result<Outcome, ClientError> {
        if self.is_busy() {
            return Ok(self.suppressed("new_game"));
        }
        self.fetch(Request::NewGame {
            session: self.session,
        })
    }

    /// Preview an ingredient for the current step
    pub fn select(&mut self, ingredient: Ingredient) -> Outcome {
        if self.is_busy() {
            return self.suppressed("select");
        }
        let Some(state) = self.state.as_ref() else {
            return Outcome::Ignored;
        };
        if self.presentation.select(state, ingredient) {
            Outcome::Previewed
        } else {
            Outcome::Ignored
        }
    }

    /// Clear the pending selection, or undo the last confirmed step if there is none
    pub fn go_back(&mut self) -> Result<Outcome, ClientError> {
        if self.is_busy() {
            return Ok(self.suppressed("go_back"));
        }
        let (session, current_step) = match self.playing() {
            Some((session, state)) => (session, state.current_step),
            None => return Ok(Outcome::Ignored),
        };

        if self.presentation.clear() {
            return Ok(Outcome::PendingCleared);
        }
        if current_step == 0 {
            return Ok(Outcome::Ignored);
        }
        self.fetch(Request::Undo { session })
    }

    /// Submit when every step is confirmed, otherwise confirm the pending selection
    pub fn advance(&mut self) -> Result<Outcome, ClientError> {
        if self.is_busy() {
            return Ok(self.suppressed("advance"));
        }
        let (session, assembled, category) = match self.playing() {
            Some((session, state)) => (session, state.is_assembled(), state.current_category()),
            None => return Ok(Outcome::Ignored),
        };

        if assembled {
            return match self.dispatch(Request::Submit { session })? {
                Reply::Submitted(session, state, correct) => {
                    self.in_flight = true;
                    self.held = Some(HeldSubmission {
                        session,
                        state,
                        correct,
                    });
                    Ok(Outcome::SubmissionHeld { correct })
                }
                Reply::State(..) => Err(self.protocol("submit answered without a score")),
            };
        }

        match (category, self.presentation.pending()) {
            (Some(category), Some(value)) => self.fetch(Request::Confirm {
                session,
                category,
                value,
            }),
            _ => Ok(Outcome::Ignored),
        }
    }

    /// End the submission hold and show the state the engine returned
    pub fn finish_submission(&mut self) -> Outcome {
        match self.held.take() {
            Some(held) => {
                self.in_flight = false;
                self.adopt(held.session, held.state);
                Outcome::Applied
            }
            None => Outcome::Ignored,
        }
    }

    fn playing(&self) -> Option<(SessionId, &SessionState)> {
        let session = self.session?;
        let state = self.state.as_ref()?;
        (state.phase == Phase::Playing).then_some((session, state))
    }

    fn suppressed(&self, intent: &'static str) -> Outcome {
        tracing::trace!(intent, "intent dropped while busy");
        Outcome::Suppressed
    }

    fn protocol(&self, message: &str) -> ClientError {
        tracing::error!(message, "protocol violation");
        ClientError::Protocol(message.to_string())
    }

    /// Call the engine and adopt the returned state
    fn fetch(&mut self, request: Request) -> Result<Outcome, ClientError> {
        match self.dispatch(request)? {
            Reply::State(session, state) => {
                self.adopt(session, state);
                Ok(Outcome::Applied)
            }
            Reply::Submitted(..) => Err(self.protocol("score returned for a non-submit call")),
        }
    }

    fn adopt(&mut self, session: SessionId, state: SessionState) {
        self.session = Some(session);
        self.state = Some(state);
        self.presentation.clear();
    }

    /// One guarded engine call. On any failure the local state is left as it was
    /// and the guard is released.
    fn dispatch(&mut self, request: Request) -> Result<Reply, ClientError> {
        self.in_flight = true;
        let result = self.transport.call(&request);
        self.in_flight = false;

        match result {
            Ok(Response::Ok { session, state }) => Ok(Reply::State(session, state)),
            Ok(Response::Submitted {
                session,
                correct,
                state,
            }) => Ok(Reply::Submitted(session, state, correct)),
            Ok(Response::Rejected { reason, .. }) => {
                tracing::warn!(?request, %reason, "engine rejected request");
                Err(ClientError::Rejected(reason))
            }
            Ok(Response::UnknownSession { session }) => {
                tracing::warn!(session = %session, "engine does not know this session");
                Err(ClientError::UnknownSession(session))
            }
            Ok(Response::Malformed { reason }) => Err(self.protocol(&reason)),
            Err(err) => {
                tracing::error!(%err, ?request, "engine call failed");
                Err(ClientError::Transport(err))
            }
        }
    }
}
