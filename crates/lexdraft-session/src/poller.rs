use std::time::Duration;

use lexdraft_llm::{AssistantClient, Run, RunStatus};
use tokio::time::{sleep, Instant};

use crate::error::Result;

/// Largest accepted interval multiplier
pub const MAX_BACKOFF: f64 = 10.0;

/// How often and how long to poll a run
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Interval multiplier applied after each non-terminal poll (1.0 = fixed interval)
    pub backoff: f64,
    pub max_interval: Duration,
    /// `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            backoff: 1.0,
            max_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            backoff: 1.0,
            max_interval: interval,
            timeout: Some(timeout),
        }
    }

    /// Grow the interval by `multiplier` after each poll, up to `max_interval`.
    ///
    /// The multiplier is clamped to `1.0..=MAX_BACKOFF`; NaN falls back to a fixed interval.
    pub fn with_backoff(mut self, multiplier: f64, max_interval: Duration) -> Self {
        self.backoff = if multiplier.is_nan() {
            1.0
        } else {
            multiplier.clamp(1.0, MAX_BACKOFF)
        };
        self.max_interval = max_interval.max(self.interval);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Saturates at the cap instead of overflowing `Duration`
    pub fn next_interval(&self, current: Duration) -> Duration {
        let cap = self.max_interval.max(self.interval);
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff)
            .map_or(cap, |next| next.min(cap))
    }
}

/// Lifecycle of a run as observed by polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

impl RunPhase {
    /// Apply an observed status. Terminal phases never change.
    pub fn advance(self, status: RunStatus) -> RunPhase {
        if self.is_terminal() {
            return self;
        }
        match status {
            RunStatus::Completed => RunPhase::Completed,
            s if s.is_terminal() => RunPhase::Failed,
            _ => RunPhase::Polling,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::Failed | RunPhase::TimedOut)
    }
}

#[derive(Debug, Clone)]
pub enum PollOutcome {
    Completed(Run),
    Failed(Run),
    /// Gave up waiting; the remote run keeps going
    TimedOut {
        last_status: RunStatus,
        waited: Duration,
    },
}

impl PollOutcome {
    pub fn phase(&self) -> RunPhase {
        match self {
            PollOutcome::Completed(_) => RunPhase::Completed,
            PollOutcome::Failed(_) => RunPhase::Failed,
            PollOutcome::TimedOut { .. } => RunPhase::TimedOut,
        }
    }
}

/// Blocks until a run reaches a terminal state or the policy's timeout elapses
#[derive(Debug, Clone, Default)]
pub struct RunPoller {
    policy: PollPolicy,
}

impl RunPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub async fn wait<C>(&self, client: &C, thread_id: &str, run_id: &str) -> Result<PollOutcome>
    where
        C: AssistantClient + ?Sized,
    {
        let started = Instant::now();
        let mut phase = RunPhase::Submitted;
        let mut interval = self.policy.interval;
        let mut polls: u32 = 0;

        loop {
            let run = client.retrieve_run(thread_id, run_id).await?;
            polls += 1;
            phase = phase.advance(run.status);

            tracing::trace!(thread_id, run_id, status = %run.status, polls, "Polled run");

            match phase {
                RunPhase::Completed => {
                    tracing::debug!(thread_id, run_id, polls, "Run completed");
                    return Ok(PollOutcome::Completed(run));
                }
                RunPhase::Failed => {
                    tracing::warn!(thread_id, run_id, status = %run.status, "Run ended without completing");
                    return Ok(PollOutcome::Failed(run));
                }
                _ => {}
            }

            let mut delay = interval;
            if let Some(timeout) = self.policy.timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    tracing::warn!(thread_id, run_id, status = %run.status, ?waited, "Gave up waiting for run");
                    return Ok(PollOutcome::TimedOut {
                        last_status: run.status,
                        waited,
                    });
                }
                delay = delay.min(timeout - waited);
            }

            sleep(delay).await;
            interval = self.policy.next_interval(interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_fixed_one_second_sixty_timeout() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.timeout, Some(Duration::from_secs(60)));
        assert_eq!(policy.next_interval(policy.interval), Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = PollPolicy::fixed(Duration::from_millis(100), Duration::from_secs(5))
            .with_backoff(2.0, Duration::from_millis(300));

        let second = policy.next_interval(policy.interval);
        let third = policy.next_interval(second);
        let fourth = policy.next_interval(third);

        assert_eq!(second, Duration::from_millis(200));
        assert_eq!(third, Duration::from_millis(300));
        assert_eq!(fourth, Duration::from_millis(300));
    }

    #[test]
    fn test_huge_backoff_saturates_at_cap() {
        for multiplier in [f64::INFINITY, 1e30] {
            let policy = PollPolicy::fixed(Duration::from_millis(1), Duration::from_secs(5))
                .with_backoff(multiplier, Duration::from_millis(5));

            assert_eq!(policy.backoff, MAX_BACKOFF);
            assert_eq!(policy.next_interval(policy.interval), Duration::from_millis(5));
        }
    }

    #[test]
    fn test_unclamped_backoff_field_does_not_overflow() {
        let policy = PollPolicy {
            backoff: f64::INFINITY,
            max_interval: Duration::from_millis(5),
            ..PollPolicy::fixed(Duration::from_millis(1), Duration::from_secs(5))
        };

        assert_eq!(policy.next_interval(Duration::from_secs(u64::MAX)), Duration::from_millis(5));
        assert_eq!(policy.next_interval(Duration::from_millis(1)), Duration::from_millis(5));
    }

    #[test]
    fn test_nan_backoff_is_fixed_interval() {
        let policy = PollPolicy::fixed(Duration::from_millis(100), Duration::from_secs(5))
            .with_backoff(f64::NAN, Duration::from_secs(1));

        assert_eq!(policy.backoff, 1.0);
        assert_eq!(policy.next_interval(policy.interval), Duration::from_millis(100));
    }

    #[test]
    fn test_backoff_below_one_is_clamped() {
        let policy = PollPolicy::fixed(Duration::from_millis(100), Duration::from_secs(5))
            .with_backoff(0.5, Duration::from_millis(50));

        assert_eq!(policy.backoff, 1.0);
        assert_eq!(policy.next_interval(policy.interval), Duration::from_millis(100));
    }

    #[test]
    fn test_phase_transitions() {
        let phase = RunPhase::Submitted.advance(RunStatus::Queued);
        assert_eq!(phase, RunPhase::Polling);

        let phase = phase.advance(RunStatus::InProgress);
        assert_eq!(phase, RunPhase::Polling);

        assert_eq!(phase.advance(RunStatus::Completed), RunPhase::Completed);
        assert_eq!(phase.advance(RunStatus::Expired), RunPhase::Failed);
        assert_eq!(phase.advance(RunStatus::Unknown), RunPhase::Polling);
    }

    #[test]
    fn test_terminal_phase_is_sticky() {
        assert_eq!(RunPhase::Failed.advance(RunStatus::Completed), RunPhase::Failed);
        assert_eq!(RunPhase::TimedOut.advance(RunStatus::Completed), RunPhase::TimedOut);
    }

    #[test]
    fn test_unbounded_policy() {
        let policy = PollPolicy::default().unbounded();
        assert_eq!(policy.timeout, None);
    }
}
