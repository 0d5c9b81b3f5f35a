use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keydrop_core::ActorId;

use crate::Event;

/// Envelope for a log event, carrying the acting identity.
///
/// This is the unit handed to a [`LogSink`](crate::LogSink). Envelopes are never
/// read back by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEnvelope<E> {
    event_id: Uuid,
    actor_id: ActorId,
    event_type: String,
    payload: E,
}

impl<E> LogEnvelope<E> {
    pub fn new(event_id: Uuid, actor_id: ActorId, event_type: impl Into<String>, payload: E) -> Self {
        Self {
            event_id,
            actor_id,
            event_type: event_type.into(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> LogEnvelope<E> {
    /// Wrap a typed event with a fresh time-ordered id.
    pub fn record(actor_id: ActorId, event: E) -> Self {
        let event_type = event.event_type();
        Self::new(Uuid::now_v7(), actor_id, event_type, event)
    }
}
