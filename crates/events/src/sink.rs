//! Fire-and-forget log sink abstraction.
//!
//! The engine emits a [`LogEnvelope`](crate::LogEnvelope) after every committed
//! mutation. Sinks may fail; the engine never lets such a failure change the
//! outcome of the operation that produced the event.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to the envelopes emitted into a sink.
///
/// Each subscription gets a copy of every envelope emitted after it was
/// created. Intended for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Destination for best-effort log events.
///
/// `emit()` may fail (closed channel, full buffer, remote log channel down).
/// Callers treat the error as informational only.
pub trait LogSink<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn emit(&self, message: M) -> Result<(), Self::Error>;
}

impl<M, S> LogSink<M> for Arc<S>
where
    S: LogSink<M> + ?Sized,
{
    type Error = S::Error;

    fn emit(&self, message: M) -> Result<(), Self::Error> {
        (**self).emit(message)
    }
}
