//! PollSpec - Configuration for a single wait

use std::collections::BTreeSet;
use std::time::Duration;

use rand::Rng;

use crate::error::WaitError;

/// Interval schedule between polls
///
/// The default mirrors the plugin SDK waiter: start at 100ms, double on
/// every poll, never exceed 10s.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// First interval, and the floor for every later one
    pub min_interval: Duration,
    /// Ceiling for the interval
    pub max_interval: Duration,
    /// Multiplier applied to the previous interval (1.0 = fixed)
    pub growth_factor: f64,
    /// Randomization in [0, 1): each sleep is scaled by a factor in [1 - jitter, 1 + jitter]
    pub jitter: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(100),
            max_interval: Duration::from_secs(10),
            growth_factor: 2.0,
            jitter: 0.0,
        }
    }
}

impl Backoff {
    /// Poll at a fixed interval
    pub fn fixed(interval: Duration) -> Self {
        Self {
            min_interval: interval,
            max_interval: interval,
            growth_factor: 1.0,
            jitter: 0.0,
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Interval to use after `previous`, or the first interval when `previous` is None
    ///
    /// Jitter is not applied here; see [`Backoff::jittered`].
    pub fn next_interval(&self, previous: Option<Duration>) -> Duration {
        let next = match previous {
            None => self.min_interval,
            Some(previous) => previous.mul_f64(self.growth_factor),
        };
        next.clamp(self.min_interval, self.max_interval)
    }

    /// Apply jitter to an interval
    pub fn jittered(&self, interval: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return interval;
        }
        let factor = rand::thread_rng().gen_range((1.0 - self.jitter)..=(1.0 + self.jitter));
        interval.mul_f64(factor)
    }

    /// Iterator over the un-jittered intervals
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.next_interval(None)), move |prev| {
            Some(self.next_interval(Some(*prev)))
        })
    }

    fn validate(&self) -> Result<(), WaitError> {
        if self.min_interval.is_zero() {
            return Err(WaitError::InvalidSpec(
                "min_interval must be greater than zero".to_string(),
            ));
        }
        if self.min_interval > self.max_interval {
            return Err(WaitError::InvalidSpec(format!(
                "min_interval ({:?}) exceeds max_interval ({:?})",
                self.min_interval, self.max_interval
            )));
        }
        if !(self.growth_factor >= 1.0 && self.growth_factor.is_finite()) {
            return Err(WaitError::InvalidSpec(format!(
                "growth_factor must be a finite value >= 1.0, got {}",
                self.growth_factor
            )));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(WaitError::InvalidSpec(format!(
                "jitter must be in [0, 1), got {}",
                self.jitter
            )));
        }
        Ok(())
    }
}

/// Configuration for one polling operation
///
/// `not_found_checks` and `continuous_target_occurrence` have no defaults:
/// every call site states them.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSpec {
    /// Statuses meaning "still in progress"
    pub pending: BTreeSet<String>,
    /// Statuses meaning "done". Empty means the object must disappear.
    pub target: BTreeSet<String>,
    /// Maximum wall-clock time to poll
    pub timeout: Duration,
    /// Wait before the first refresh
    pub delay: Duration,
    pub backoff: Backoff,
    /// Consecutive not-found observations tolerated before giving up
    pub not_found_checks: u32,
    /// Consecutive target observations required before succeeding
    pub continuous_target_occurrence: u32,
    /// Fail as soon as a status outside pending and target is observed
    pub fail_on_unexpected_state: bool,
}

impl PollSpec {
    pub fn new(timeout: Duration, not_found_checks: u32, continuous_target_occurrence: u32) -> Self {
        Self {
            pending: BTreeSet::new(),
            target: BTreeSet::new(),
            timeout,
            delay: Duration::ZERO,
            backoff: Backoff::default(),
            not_found_checks,
            continuous_target_occurrence,
            fail_on_unexpected_state: false,
        }
    }

    pub fn pending<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pending = states.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn target<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.target = states.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn fail_on_unexpected_state(mut self, fail: bool) -> Self {
        self.fail_on_unexpected_state = fail;
        self
    }

    pub fn is_pending(&self, status: &str) -> bool {
        self.pending.contains(status)
    }

    pub fn is_target(&self, status: &str) -> bool {
        self.target.contains(status)
    }

    /// Whether success means the object is gone
    pub fn expects_disappearance(&self) -> bool {
        self.target.is_empty()
    }

    /// Target states in a stable order, for error messages
    pub fn target_list(&self) -> Vec<String> {
        self.target.iter().cloned().collect()
    }

    pub fn validate(&self) -> Result<(), WaitError> {
        if self.continuous_target_occurrence == 0 {
            return Err(WaitError::InvalidSpec(
                "continuous_target_occurrence must be at least 1".to_string(),
            ));
        }
        if let Some(state) = self.pending.intersection(&self.target).next() {
            return Err(WaitError::InvalidSpec(format!(
                "state '{}' is both pending and target",
                state
            )));
        }
        if self.pending.contains("") || self.target.contains("") {
            return Err(WaitError::InvalidSpec(
                "the empty status is reserved for not-found".to_string(),
            ));
        }
        self.backoff.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_doubles_and_caps() {
        let backoff = Backoff::default();
        let intervals: Vec<Duration> = backoff.schedule().take(9).collect();
        assert_eq!(intervals[0], Duration::from_millis(100));
        assert_eq!(intervals[1], Duration::from_millis(200));
        assert_eq!(intervals[2], Duration::from_millis(400));
        assert_eq!(intervals[6], Duration::from_millis(6400));
        assert_eq!(intervals[7], Duration::from_secs(10));
        assert_eq!(intervals[8], Duration::from_secs(10));
    }

    #[test]
    fn fixed_backoff_never_changes() {
        let backoff = Backoff::fixed(Duration::from_secs(10));
        assert!(backoff.schedule().take(5).all(|d| d == Duration::from_secs(10)));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let backoff = Backoff::fixed(Duration::from_secs(10)).with_jitter(0.2);
        for _ in 0..100 {
            let d = backoff.jittered(Duration::from_secs(10));
            assert!(d >= Duration::from_secs(8));
            assert!(d <= Duration::from_secs(12));
        }
    }

    #[test]
    fn builder_sets_state_sets() {
        let spec = PollSpec::new(Duration::from_secs(60), 20, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);
        assert!(spec.is_pending("CREATING"));
        assert!(spec.is_target("ACTIVE"));
        assert!(!spec.is_target("CREATING"));
        assert!(!spec.expects_disappearance());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn empty_target_means_disappearance() {
        let spec = PollSpec::new(Duration::from_secs(60), 0, 1)
            .pending(["DELETING"])
            .target(Vec::<String>::new());
        assert!(spec.expects_disappearance());
    }

    #[test]
    fn validate_rejects_zero_occurrence() {
        let spec = PollSpec::new(Duration::from_secs(60), 0, 0).target(["ACTIVE"]);
        assert!(matches!(spec.validate(), Err(WaitError::InvalidSpec(_))));
    }

    #[test]
    fn validate_rejects_overlapping_sets() {
        let spec = PollSpec::new(Duration::from_secs(60), 0, 1)
            .pending(["ACTIVE", "CREATING"])
            .target(["ACTIVE"]);
        let err = spec.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid poll spec: state 'ACTIVE' is both pending and target"
        );
    }

    #[test]
    fn validate_rejects_bad_backoff() {
        let spec = PollSpec::new(Duration::from_secs(60), 0, 1).backoff(Backoff {
            min_interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(1),
            growth_factor: 2.0,
            jitter: 0.0,
        });
        assert!(spec.validate().is_err());

        let spec = PollSpec::new(Duration::from_secs(60), 0, 1)
            .backoff(Backoff::fixed(Duration::from_secs(1)).with_jitter(1.5));
        assert!(spec.validate().is_err());
    }
}
