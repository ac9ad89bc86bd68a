//! Bounded retry with exponential backoff for outbound HTTP calls.

use std::{future::Future, time::Duration};

use anyhow::Result;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Including the first try.
  pub max_attempts: u32,
  pub base_delay:   Duration,
  pub max_delay:    Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay:   Duration::from_millis(500),
      max_delay:    Duration::from_secs(4),
    }
  }
}

impl RetryPolicy {
  /// Delay after failed attempt `attempt` (1-based):
  /// `min(max_delay, base_delay * 2^(attempt-1))`.
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    self.base_delay.saturating_mul(factor).min(self.max_delay)
  }
}

/// Client errors other than 408, 425 and 429 will not improve on retry;
/// everything else (network failures, 5xx) might.
pub fn is_retryable(err: &anyhow::Error) -> bool {
  let Some(status) = err
    .downcast_ref::<reqwest::Error>()
    .and_then(reqwest::Error::status)
  else {
    return true;
  };
  matches!(status.as_u16(), 408 | 425 | 429 | 500..=599)
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are spent.
pub async fn retry_async<T, Fut, F>(policy: &RetryPolicy, op_name: &str, mut operation: F) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  let mut attempt = 1;
  loop {
    match operation().await {
      Ok(value) => {
        if attempt > 1 {
          debug!(op = op_name, attempt, "succeeded after retry");
        }
        return Ok(value);
      }
      Err(err) if attempt < policy.max_attempts && is_retryable(&err) => {
        let delay = policy.backoff(attempt);
        warn!(op = op_name, attempt, ?delay, error = %err, "attempt failed, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(err) => return Err(err.context(format!("{op_name} failed after {attempt} attempt(s)"))),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use anyhow::anyhow;

  use super::*;

  fn instant() -> RetryPolicy {
    RetryPolicy {
      base_delay: Duration::ZERO,
      ..RetryPolicy::default()
    }
  }

  #[test]
  fn backoff_doubles_up_to_the_cap() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.backoff(1), Duration::from_millis(500));
    assert_eq!(policy.backoff(2), Duration::from_secs(1));
    assert_eq!(policy.backoff(3), Duration::from_secs(2));
    assert_eq!(policy.backoff(4), Duration::from_secs(4));
    assert_eq!(policy.backoff(9), Duration::from_secs(4));
    assert_eq!(policy.backoff(64), Duration::from_secs(4));
  }

  #[test]
  fn plain_errors_are_retryable() {
    assert!(is_retryable(&anyhow!("connection reset")));
  }

  #[tokio::test]
  async fn recovers_after_transient_failures() {
    let calls = &AtomicU32::new(0);
    let value = retry_async(&instant(), "flaky", move || async move {
      match calls.fetch_add(1, Ordering::SeqCst) {
        0 | 1 => Err(anyhow!("transient")),
        _ => Ok(7),
      }
    })
    .await
    .unwrap();
    assert_eq!(value, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn gives_up_after_max_attempts() {
    let calls = &AtomicU32::new(0);
    let result: Result<()> = retry_async(&instant(), "down", move || async move {
      calls.fetch_add(1, Ordering::SeqCst);
      Err(anyhow!("still down"))
    })
    .await;
    let err = result.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(err.to_string().contains("down failed after 3 attempt(s)"));
    assert!(format!("{err:#}").contains("still down"));
  }
}
