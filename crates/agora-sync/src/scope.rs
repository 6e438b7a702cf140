//! Cancellation scopes.
//!
//! Every screen owns a [`Scope`]. Work run or spawned through it stops at
//! the next suspension point once the scope is cancelled or dropped, so a
//! torn-down screen never writes to a cache afterwards.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Owner of a cancellation token. Dropping the scope cancels it.
#[derive(Debug, Default)]
pub struct Scope {
    token: CancellationToken,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested scope cancelled together with this one.
    pub fn child(&self) -> Scope {
        Scope {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            debug!("Cancelling scope");
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token for code that needs to watch cancellation itself.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Await `fut` unless the scope is cancelled first.
    ///
    /// Returns `None` when cancelled; `fut` is dropped without being polled
    /// again.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }

    /// Spawn `fut` on the runtime, bound to this scope.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                out = fut => Some(out),
            }
        })
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
