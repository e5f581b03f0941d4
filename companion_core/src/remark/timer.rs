use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The one display timer a scheduler owns.
///
/// Arming always cancels the previously armed timer first, so at most one
/// timer task is ever live.
#[derive(Debug, Default)]
pub struct DisplayTimer {
    token: Option<CancellationToken>,
}

impl DisplayTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_fire` after `after` unless cancelled or re-armed first.
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, after: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(after) => on_fire(),
            }
        });
        self.token = Some(token);
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.token
            .as_ref()
            .map(|token| !token.is_cancelled())
            .unwrap_or(false)
    }
}

impl Drop for DisplayTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
