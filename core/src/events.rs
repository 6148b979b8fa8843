//! The "cart changed" notification channel.
//!
//! # Design
//! A payload-free broadcast subject. Listeners learn only that some mutation
//! succeeded and must re-query the cart for the authoritative snapshot, so a
//! lagging listener loses nothing by having missed intermediate signals: lag
//! collapses into a single `CartChanged`.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Signal that the server-side cart was mutated successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartChanged;

/// Publish/subscribe handle for `CartChanged`. Clones share one channel.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartChanged>,
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl CartEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is clamped to at least one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> CartListener {
        CartListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Dispatches one `CartChanged`; returns how many listeners it reached.
    pub fn publish(&self) -> usize {
        match self.sender.send(CartChanged) {
            Ok(count) => {
                trace!(count, "cart changed dispatched");
                count
            }
            Err(_) => {
                trace!("cart changed dropped: no listeners");
                0
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// One independent subscription to `CartEvents`.
#[derive(Debug)]
pub struct CartListener {
    receiver: broadcast::Receiver<CartChanged>,
}

impl CartListener {
    /// Waits for the next notification.
    ///
    /// Returns `None` once every `CartEvents` handle is dropped and nothing is
    /// left to deliver.
    pub async fn changed(&mut self) -> Option<CartChanged> {
        match self.receiver.recv().await {
            Ok(signal) => Some(signal),
            Err(RecvError::Lagged(skipped)) => {
                trace!(skipped, "cart listener lagged");
                Some(CartChanged)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Takes a pending notification without waiting.
    pub fn try_changed(&mut self) -> Option<CartChanged> {
        match self.receiver.try_recv() {
            Ok(signal) => Some(signal),
            Err(TryRecvError::Lagged(_)) => Some(CartChanged),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Drains everything pending and returns how many signals were waiting.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(_) => count += 1,
                Err(TryRecvError::Lagged(skipped)) => {
                    count += usize::try_from(skipped).unwrap_or(usize::MAX);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return count,
            }
        }
    }
}
