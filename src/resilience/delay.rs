//! Slow-request timer and backoff waits.
//!
//! The delay timer is not a background task: it is polled alongside the call
//! it watches. It therefore fires at most once, and can never fire after the
//! watched future completed or after the timer was dropped. Dropping the timer
//! cancels it.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Sleep};

/// One-shot "request is taking long" timer.
#[derive(Debug)]
pub struct DelayTimer {
    timer: Pin<Box<Sleep>>,
    fired: bool,
}

impl DelayTimer {
    /// Start the timer; the deadline is fixed now.
    pub fn start(after: Duration) -> Self {
        Self {
            timer: Box::pin(sleep(after)),
            fired: false,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Drive `fut` to completion, calling `on_delayed` once if the deadline
    /// passes first.
    pub async fn watch<F, D>(&mut self, fut: F, on_delayed: D) -> F::Output
    where
        F: Future,
        D: FnOnce(),
    {
        tokio::pin!(fut);
        let mut on_delayed = if self.fired { None } else { Some(on_delayed) };

        loop {
            tokio::select! {
                biased;
                output = &mut fut => return output,
                _ = &mut self.timer, if on_delayed.is_some() => {
                    self.fired = true;
                    if let Some(notify) = on_delayed.take() {
                        notify();
                    }
                }
            }
        }
    }
}

/// Wait before the next attempt.
pub async fn backoff(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        sleep(delay).await;
    }
}
