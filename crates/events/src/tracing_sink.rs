//! Log sink that renders envelopes as structured `tracing` records.

use core::convert::Infallible;

use serde::Serialize;

use crate::{Event, LogEnvelope, LogSink};

/// Production sink: one `info` record per envelope on the `keydrop::audit` target.
///
/// Whatever subscriber is installed (see `keydrop-observability`) decides where
/// the record ends up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl<E> LogSink<LogEnvelope<E>> for TracingLogSink
where
    E: Event + Serialize,
{
    type Error = Infallible;

    fn emit(&self, message: LogEnvelope<E>) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(message.payload())
            .unwrap_or_else(|e| format!("<unserializable payload: {e}>"));

        tracing::info!(
            target: "keydrop::audit",
            event_id = %message.event_id(),
            actor_id = %message.actor_id(),
            event_type = message.event_type(),
            occurred_at = %message.payload().occurred_at(),
            payload = %payload,
            "entitlement event"
        );

        Ok(())
    }
}
