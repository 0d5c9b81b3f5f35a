//! Entitlement log events and the fire-and-forget sinks they are emitted to.

pub mod entitlement;
pub mod envelope;
pub mod event;
pub mod in_memory_sink;
pub mod sink;
pub mod tracing_sink;

pub use entitlement::{EntitlementEvent, GrantRevoked, ProductGranted, ProductRegistered};
pub use envelope::LogEnvelope;
pub use event::Event;
pub use in_memory_sink::{InMemoryLogSink, InMemorySinkError};
pub use sink::{LogSink, Subscription};
pub use tracing_sink::TracingLogSink;
