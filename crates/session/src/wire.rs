//! JSON wire protocol between client and engine host

use cake_engine::{Category, Ingredient, SessionState};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one session on a host
pub type SessionId = Uuid;

/// One engine call
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Fetch the current snapshot
    State { session: SessionId },
    /// Reset `session`, or open a new one when absent
    NewGame {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session: Option<SessionId>,
    },
    Confirm {
        session: SessionId,
        category: Category,
        value: Ingredient,
    },
    Undo { session: SessionId },
    Submit { session: SessionId },
}

impl Request {
    pub fn session(&self) -> Option<SessionId> {
        match self {
            Request::State { session }
            | Request::Confirm { session, .. }
            | Request::Undo { session }
            | Request::Submit { session } => Some(*session),
            Request::NewGame { session } => *session,
        }
    }
}

/// The engine's single reply to a request
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        session: SessionId,
        state: SessionState,
    },
    Submitted {
        session: SessionId,
        correct: bool,
        state: SessionState,
    },
    /// Precondition failed; `state` is the unchanged snapshot
    Rejected {
        session: SessionId,
        reason: String,
        state: SessionState,
    },
    UnknownSession {
        session: SessionId,
    },
    Malformed {
        reason: String,
    },
}

pub fn encode<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_tags() {
        let session = Uuid::from_u128(7);
        let request = Request::Confirm {
            session,
            category: Category::Decoration,
            value: Ingredient::ChocolateChips,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "op": "confirm",
                "session": session.to_string(),
                "category": "decoration",
                "value": "chocolate_chips",
            })
        );
        assert_eq!(decode::<Request>(&encode(&request).unwrap()).unwrap(), request);
    }

    #[test]
    fn test_new_game_session_is_optional() {
        let request: Request = decode(r#"{"op":"new_game"}"#).unwrap();
        assert_eq!(request, Request::NewGame { session: None });
        assert_eq!(request.session(), None);
        assert_eq!(encode(&request).unwrap(), r#"{"op":"new_game"}"#);
    }

    #[test]
    fn test_unknown_ingredient_does_not_decode() {
        let raw = json!({
            "op": "confirm",
            "session": Uuid::nil().to_string(),
            "category": "base",
            "value": "marzipan",
        })
        .to_string();
        assert!(decode::<Request>(&raw).is_err());
    }
}
