//! Caller-supplied cancellation for long-running cursor operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Cancellation signal shared between a cursor and the code that may abort
/// it, optionally bounded by a deadline.
///
/// Clones share the same flag. The cursor polls the token before every
/// backend call, including each round of a streamed retrieval.
///
/// # Example
///
/// ```
/// use odbc_fetch_rs::CancelToken;
/// use std::time::Duration;
///
/// let token = CancelToken::with_timeout(Duration::from_secs(30));
/// let handle = token.clone();
/// std::thread::spawn(move || handle.cancel());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also fires once `deadline` has passed.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// A token that also fires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail with `Error::Cancelled` naming `function` if the token fired.
    pub fn check(&self, function: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled { function });
        }
        Ok(())
    }
}
