use super::CollaboratorError;
use crate::error::LegmarkError;
use std::time::Duration;

/// Bounded exponential backoff for collaborator calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            factor: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts,
            ..Default::default()
        }
    }

    /// At least one attempt and a finite factor of 1 or more.
    pub fn validate(&self) -> Result<(), LegmarkError> {
        if self.max_attempts == 0 {
            return Err(LegmarkError::InvalidOptions(
                "retry max_attempts must be at least 1".into(),
            ));
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(LegmarkError::InvalidOptions(format!(
                "retry factor must be finite and >= 1, got {}",
                self.factor
            )));
        }
        Ok(())
    }

    /// Delay after the given zero-based failed attempt: `base * factor^attempt`.
    ///
    /// Saturates at `Duration::MAX` when the product is not representable.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Full backoff schedule, one entry per retry.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay(attempt))
            .collect()
    }

    /// Run `op` until it succeeds, fails fatally or attempts run out.
    pub fn run<T>(&self, op: impl FnMut() -> Result<T, CollaboratorError>) -> Option<T> {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// As [`RetryPolicy::run`] with an injectable sleep.
    pub fn run_with_sleep<T>(
        &self,
        mut op: impl FnMut() -> Result<T, CollaboratorError>,
        mut sleep: impl FnMut(Duration),
    ) -> Option<T> {
        if let Err(e) = self.validate() {
            tracing::warn!(error = %e, "refusing to run with invalid retry policy");
            return None;
        }
        for attempt in 0..self.max_attempts {
            match op() {
                Ok(value) => return Some(value),
                Err(e) if !e.is_retryable() => {
                    tracing::warn!(error = %e, "service call failed, not retrying");
                    return None;
                }
                Err(e) => {
                    if attempt + 1 >= self.max_attempts {
                        tracing::warn!(error = %e, attempts = self.max_attempts, "max retries reached");
                        return None;
                    }
                    let delay = self.delay(attempt);
                    tracing::warn!(error = %e, retry_in = ?delay, "service call failed, retrying");
                    sleep(delay);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.schedule(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    #[test]
    fn test_long_schedule_saturates() {
        let policy = RetryPolicy::new(100);
        assert!(policy.validate().is_ok());
        let schedule = policy.schedule();
        assert_eq!(schedule.len(), 99);
        assert_eq!(schedule[10], Duration::from_secs(1024));
        assert_eq!(schedule[98], Duration::MAX);
        assert_eq!(policy.delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_invalid_factor_does_not_panic() {
        for factor in [-2.0, f64::NAN, f64::INFINITY, 0.5] {
            let policy = RetryPolicy {
                factor,
                ..Default::default()
            };
            assert!(matches!(
                policy.validate(),
                Err(LegmarkError::InvalidOptions(_))
            ));
            let _ = policy.delay(1);
            let _ = policy.schedule();
        }
    }

    #[test]
    fn test_invalid_policy_never_calls_op() {
        let policy = RetryPolicy {
            factor: -2.0,
            ..Default::default()
        };
        let mut calls = 0;
        let result: Option<()> = policy.run_with_sleep(
            || {
                calls += 1;
                Ok(())
            },
            |_| panic!("must not sleep"),
        );
        assert_eq!(result, None);
        assert_eq!(calls, 0);
        assert!(RetryPolicy::new(0).validate().is_err());
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3);
        let mut calls = 0;
        let mut slept = Vec::new();
        let result = policy.run_with_sleep(
            || {
                calls += 1;
                if calls < 3 {
                    Err(CollaboratorError::Transient("503".into()))
                } else {
                    Ok("answer")
                }
            },
            |d| slept.push(d),
        );
        assert_eq!(result, Some("answer"));
        assert_eq!(calls, 3);
        assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let policy = RetryPolicy::new(3);
        let mut calls = 0;
        let result: Option<()> = policy.run_with_sleep(
            || {
                calls += 1;
                Err(CollaboratorError::Malformed("not json".into()))
            },
            |_| {},
        );
        assert_eq!(result, None);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_fatal_stops_immediately() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let result: Option<()> = policy.run_with_sleep(
            || {
                calls += 1;
                Err(CollaboratorError::Fatal("bad key".into()))
            },
            |_| panic!("must not sleep"),
        );
        assert_eq!(result, None);
        assert_eq!(calls, 1);
    }
}
