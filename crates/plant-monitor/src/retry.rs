use std::fmt;
use std::time::Duration;

/// Source of delays, swappable in tests.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Records requested delays instead of sleeping.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct RecordingClock {
    sleeps: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(any(test, feature = "mock"))]
impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(any(test, feature = "mock"))]
impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

/// One attempt plus up to `retries` more, `delay` apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }
}

/// Run `op` until it succeeds or the policy is spent; the last error wins.
pub fn retry<T, E, F>(policy: &RetryPolicy, clock: &impl Clock, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: fmt::Display,
{
    let mut attempts_left = policy.retries;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempts_left == 0 => {
                tracing::error!("Failed to read {}: {} (no retries left)", what, e);
                return Err(e);
            }
            Err(e) => {
                tracing::debug!(
                    "Failed to read {}: {}; retrying ({} attempts left)",
                    what,
                    e,
                    attempts_left
                );
                clock.sleep(policy.delay);
                attempts_left -= 1;
            }
        }
    }
}
