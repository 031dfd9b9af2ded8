use std::time::Duration;
use tokio::time::Instant;

/// Delayed trigger with at most one outstanding deadline.
///
/// Every [`schedule`](Self::schedule) pushes the deadline to `now + delay`,
/// so a burst of calls fires once, `delay` after the last one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the deadline
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve once the armed deadline passes; pending forever when disarmed.
    ///
    /// Cancel safe: dropping the future before it resolves keeps the deadline.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.schedule();
        assert!(debouncer.is_armed());

        debouncer.fired().await;
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert!(!debouncer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_pushes_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.schedule();

        debouncer.fired().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_never_fires() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule();
        debouncer.cancel();

        let fired = tokio::time::timeout(Duration::from_secs(5), debouncer.fired()).await;
        assert!(fired.is_err());
    }
}
