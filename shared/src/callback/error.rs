use thiserror::Error;

/// Errors raised by the structures shared with the callback-delivery thread
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// A thread panicked while holding the lock
    #[error("Lock on {channel} is poisoned")]
    LockPoisoned { channel: &'static str },
}
