//! In-memory log sink for tests/dev.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::sink::{LogSink, Subscription};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InMemorySinkError {
    /// Emit failed due to internal lock poisoning.
    #[error("log sink lock poisoned")]
    Poisoned,

    /// The sink was switched into failure mode (used to exercise best-effort paths).
    #[error("log sink unavailable")]
    Unavailable,
}

/// In-memory fan-out sink.
///
/// - No IO / no async
/// - Best-effort fan-out to every live subscriber
#[derive(Debug)]
pub struct InMemoryLogSink<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
    failing: Mutex<bool>,
}

impl<M> InMemoryLogSink<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `emit` fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut flag) = self.failing.lock() {
            *flag = failing;
        }
    }

    pub fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still return a subscription;
        // it just never receives anything.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

impl<M> Default for InMemoryLogSink<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
        }
    }
}

impl<M> LogSink<M> for InMemoryLogSink<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemorySinkError;

    fn emit(&self, message: M) -> Result<(), Self::Error> {
        if *self.failing.lock().map_err(|_| InMemorySinkError::Poisoned)? {
            return Err(InMemorySinkError::Unavailable);
        }

        let mut subs = self.subscribers.lock().map_err(|_| InMemorySinkError::Poisoned)?;

        // Drop any dead subscribers while emitting.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }
}
