//! First-class cancellation for outbound calls.
//!
//! A [`CancelSource`] is held by whoever may abort a call; the paired
//! [`CancelToken`] travels with the request. The token is passed into the
//! call up front rather than bolted onto the returned future.

use tokio::sync::watch;

/// Owning side of a cancellation pair.
pub struct CancelSource {
  tx: watch::Sender<bool>,
}

impl CancelSource {
  /// Create a linked source/token pair.
  pub fn new() -> (Self, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (Self { tx }, CancelToken { rx: Some(rx) })
  }

  /// Signal cancellation to every clone of the paired token.
  pub fn cancel(&self) {
    // Ignore send errors - all tokens may already be dropped.
    let _ = self.tx.send(true);
  }
}

/// Cancellation signal observed by a call in flight.
///
/// Dropping the [`CancelSource`] without calling `cancel()` does NOT cancel;
/// a token without a source simply never fires.
#[derive(Clone)]
pub struct CancelToken {
  rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
  /// A token that never fires, for callers without a cancellation path.
  pub fn noop() -> Self {
    Self { rx: None }
  }

  /// Whether cancellation has been signalled.
  pub fn is_cancelled(&self) -> bool {
    match &self.rx {
      Some(rx) => *rx.borrow(),
      None => false,
    }
  }

  /// Resolve once cancellation is signalled; pend forever otherwise.
  pub async fn cancelled(&self) {
    let Some(rx) = &self.rx else {
      return std::future::pending::<()>().await;
    };

    let mut rx = rx.clone();
    loop {
      if *rx.borrow() {
        return;
      }
      if rx.changed().await.is_err() {
        // Source dropped without cancelling - never fire.
        return std::future::pending::<()>().await;
      }
    }
  }
}

impl std::fmt::Debug for CancelToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CancelToken")
      .field("cancelled", &self.is_cancelled())
      .finish()
  }
}
