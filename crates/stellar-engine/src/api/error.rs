use thiserror::Error;

use crate::api::types::EntityId;

/// Result type for fallible engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result returned by user notification handlers.
///
/// Handlers may fail with any error; the scheduler turns the failure into
/// [`EngineError::NotificationFault`] and keeps going.
pub type EventResult = anyhow::Result<()>;

/// Errors surfaced by the simulation core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The identifier does not resolve to a live entity or a known room.
    #[error("invalid reference: {what}")]
    InvalidReference { what: String },

    /// A creation asked for an identifier that is already taken.
    #[error("identifier {requested} is already taken")]
    DuplicateIdentifier { requested: EntityId },

    /// A user notification handler returned an error.
    #[error("{event} notification failed{}: {source}", entity_suffix(.entity))]
    NotificationFault {
        entity: Option<EntityId>,
        event: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A sprite manifest or configuration could not be parsed.
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    /// A sprite description is internally inconsistent.
    #[error("invalid asset {name}: {reason}")]
    InvalidAsset { name: String, reason: String },
}

impl EngineError {
    pub fn entity(id: EntityId) -> Self {
        EngineError::InvalidReference {
            what: format!("entity {id}"),
        }
    }

    pub fn room(index: usize) -> Self {
        EngineError::InvalidReference {
            what: format!("room {index}"),
        }
    }
}

fn entity_suffix(entity: &Option<EntityId>) -> String {
    match entity {
        Some(id) => format!(" for entity {id}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_message_names_entity_and_event() {
        let err = EngineError::NotificationFault {
            entity: Some(EntityId(7)),
            event: "step",
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(err.to_string(), "step notification failed for entity #7: boom");
    }

    #[test]
    fn invalid_reference_message() {
        assert_eq!(
            EngineError::entity(EntityId(3)).to_string(),
            "invalid reference: entity #3"
        );
        assert_eq!(EngineError::room(2).to_string(), "invalid reference: room 2");
    }
}
