//! Poller - Block until a remote resource reaches a target state
//!
//! A [`Poller`] is built for a single wait: it owns the [`PollSpec`], the
//! identity of the resource being awaited (for error context), and a
//! cancellation token. [`Poller::wait`] drives the refresh function until one
//! of the terminal conditions is met:
//!
//! - `continuous_target_occurrence` consecutive target observations (success)
//! - a refresh error (returned as-is, no retry)
//! - a known failure status, or an unexpected status when
//!   `fail_on_unexpected_state` is set
//! - more than `not_found_checks` consecutive not-found observations
//! - the deadline (`timeout`) or the cancellation token

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{FailureReason, WaitError, WaitFailure};
use crate::refresh::{Refresh, RefreshResult};
use crate::resource::{Operation, ResourceId};
use crate::spec::PollSpec;

/// Successful end of a wait
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    /// The resource reached a target status; holds the object from the last poll
    Reached(T),
    /// The resource disappeared (only when the target set is empty)
    Gone,
}

impl<T> Settled<T> {
    pub fn into_object(self) -> Option<T> {
        match self {
            Settled::Reached(object) => Some(object),
            Settled::Gone => None,
        }
    }

    pub fn is_gone(&self) -> bool {
        matches!(self, Settled::Gone)
    }
}

/// Counters carried across polls of a single wait
struct Progress<T> {
    polls: u32,
    not_found: u32,
    target_hits: u32,
    last_state: String,
    last_object: Option<T>,
}

impl<T> Progress<T> {
    fn new() -> Self {
        Self {
            polls: 0,
            not_found: 0,
            target_hits: 0,
            last_state: String::new(),
            last_object: None,
        }
    }
}

/// Generic state-transition waiter
pub struct Poller {
    spec: PollSpec,
    resource: ResourceId,
    operation: Operation,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(spec: PollSpec, resource: ResourceId, operation: Operation) -> Self {
        Self {
            spec,
            resource,
            operation,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop waiting when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn spec(&self) -> &PollSpec {
        &self.spec
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// Poll `refresh` until a terminal condition is reached
    pub async fn wait<T, F, Fut>(&self, mut refresh: F) -> Result<Settled<T>, WaitFailure<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RefreshResult<T>>,
    {
        if let Err(error) = self.spec.validate() {
            return Err(self.failure(error, None));
        }

        let deadline = instant_after(Instant::now(), self.spec.timeout);
        let mut progress = Progress::new();
        let mut interval = None;

        log::debug!(
            "Waiting for {} {} (pending: {:?}, target: {:?}, timeout: {:?})",
            self.resource,
            self.operation,
            self.spec.pending,
            self.spec.target,
            self.spec.timeout
        );

        if !self.spec.delay.is_zero() {
            let wake = instant_after(Instant::now(), self.spec.delay).min(deadline);
            if let Err(error) = self.pause(wake, deadline, &progress).await {
                return Err(self.give_up(error, progress.last_object));
            }
        }

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.give_up(self.cancelled(&progress), progress.last_object));
            }

            let observation = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(self.give_up(self.cancelled(&progress), progress.last_object));
                }
                observation = refresh() => observation,
            };
            progress.polls += 1;

            match observation {
                Err(error) => {
                    log::debug!(
                        "{} {}: refresh failed on poll #{}: {}",
                        self.resource,
                        self.operation,
                        progress.polls,
                        error
                    );
                    return Err(self.failure(error, progress.last_object));
                }
                Ok(Refresh::NotFound) => {
                    progress.last_state.clear();
                    progress.last_object = None;
                    if self.spec.expects_disappearance() {
                        progress.target_hits += 1;
                        log::debug!(
                            "{} {}: not found ({}/{})",
                            self.resource,
                            self.operation,
                            progress.target_hits,
                            self.spec.continuous_target_occurrence
                        );
                        if progress.target_hits >= self.spec.continuous_target_occurrence {
                            return Ok(Settled::Gone);
                        }
                    } else {
                        progress.target_hits = 0;
                        progress.not_found += 1;
                        log::debug!(
                            "{} {}: not found, check {} of {} allowed",
                            self.resource,
                            self.operation,
                            progress.not_found,
                            self.spec.not_found_checks
                        );
                        if progress.not_found > self.spec.not_found_checks {
                            let error = WaitError::NotFoundExhausted {
                                checks: progress.not_found,
                            };
                            return Err(self.give_up(error, progress.last_object));
                        }
                    }
                }
                Ok(Refresh::Found { object, status }) => {
                    if let Some(object) = self.record(&mut progress, object, status, None)? {
                        return Ok(Settled::Reached(object));
                    }
                }
                Ok(Refresh::Failed {
                    object,
                    status,
                    reason,
                }) => {
                    if let Some(object) =
                        self.record(&mut progress, object, status, Some(reason))?
                    {
                        return Ok(Settled::Reached(object));
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.give_up(self.timed_out(&progress), progress.last_object));
            }

            let next = self.spec.backoff.next_interval(interval);
            interval = Some(next);
            let wake = instant_after(now, self.spec.backoff.jittered(next)).min(deadline);
            log::trace!(
                "{} {}: sleeping {:?}",
                self.resource,
                self.operation,
                wake - now
            );
            if let Err(error) = self.pause(wake, deadline, &progress).await {
                return Err(self.give_up(error, progress.last_object));
            }
        }
    }

    /// Wait for a non-empty target set and return the object that reached it
    pub async fn wait_for_target<T, F, Fut>(&self, refresh: F) -> Result<T, WaitFailure<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RefreshResult<T>>,
    {
        if self.spec.expects_disappearance() {
            let error = WaitError::InvalidSpec("target set is empty".to_string());
            return Err(self.failure(error, None));
        }
        match self.wait(refresh).await? {
            Settled::Reached(object) => Ok(object),
            Settled::Gone => Err(self.failure(
                WaitError::InvalidSpec("resource disappeared while waiting for a target state".to_string()),
                None,
            )),
        }
    }

    /// Wait for the resource to disappear
    pub async fn wait_for_absence<T, F, Fut>(&self, refresh: F) -> Result<(), WaitFailure<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RefreshResult<T>>,
    {
        if !self.spec.expects_disappearance() {
            let error = WaitError::InvalidSpec("target set must be empty".to_string());
            return Err(self.failure(error, None));
        }
        match self.wait(refresh).await? {
            Settled::Gone => Ok(()),
            Settled::Reached(object) => Err(self.failure(
                WaitError::InvalidSpec("resource reached a state while waiting for it to be gone".to_string()),
                Some(object),
            )),
        }
    }

    /// Record a found observation; returns the object once the target is satisfied
    fn record<T>(
        &self,
        progress: &mut Progress<T>,
        object: T,
        status: String,
        reason: Option<FailureReason>,
    ) -> Result<Option<T>, WaitFailure<T>> {
        progress.not_found = 0;

        if self.spec.is_target(&status) {
            // A switch between two target statuses restarts the streak
            if progress.target_hits > 0 && progress.last_state != status {
                progress.target_hits = 0;
            }
            progress.target_hits += 1;
            log::debug!(
                "{} {}: status '{}' ({}/{})",
                self.resource,
                self.operation,
                status,
                progress.target_hits,
                self.spec.continuous_target_occurrence
            );
            progress.last_state = status;
            if progress.target_hits >= self.spec.continuous_target_occurrence {
                return Ok(Some(object));
            }
            progress.last_object = Some(object);
            return Ok(None);
        }

        progress.target_hits = 0;

        if self.spec.is_pending(&status) {
            log::debug!("{} {}: status '{}'", self.resource, self.operation, status);
            progress.last_state = status;
            progress.last_object = Some(object);
            return Ok(None);
        }

        if reason.is_some() || self.spec.fail_on_unexpected_state {
            let error = WaitError::UnexpectedState {
                state: status,
                expected: self.spec.target_list(),
                reason,
            };
            return Err(self.give_up(error, Some(object)));
        }

        log::debug!(
            "{} {}: status '{}' is neither pending nor target, still waiting",
            self.resource,
            self.operation,
            status
        );
        progress.last_state = status;
        progress.last_object = Some(object);
        Ok(None)
    }

    /// Sleep until `wake`, failing on cancellation or when the deadline is reached
    async fn pause<T>(
        &self,
        wake: Instant,
        deadline: Instant,
        progress: &Progress<T>,
    ) -> Result<(), WaitError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(self.cancelled(progress)),
            _ = tokio::time::sleep_until(wake) => {}
        }
        if Instant::now() >= deadline {
            return Err(self.timed_out(progress));
        }
        Ok(())
    }

    fn timed_out<T>(&self, progress: &Progress<T>) -> WaitError {
        WaitError::Timeout {
            last_state: progress.last_state.clone(),
            expected: self.spec.target_list(),
            timeout: self.spec.timeout,
        }
    }

    fn cancelled<T>(&self, progress: &Progress<T>) -> WaitError {
        WaitError::Cancelled {
            last_state: progress.last_state.clone(),
        }
    }

    fn failure<T>(&self, error: WaitError, last_object: Option<T>) -> WaitFailure<T> {
        WaitFailure::new(self.resource.clone(), self.operation, error).with_last_object(last_object)
    }

    fn give_up<T>(&self, error: WaitError, last_object: Option<T>) -> WaitFailure<T> {
        log::warn!("Gave up waiting for {} {}: {}", self.resource, self.operation, error);
        self.failure(error, last_object)
    }
}

/// `start + duration`, saturating at roughly thirty years out
fn instant_after(start: Instant, duration: Duration) -> Instant {
    start
        .checked_add(duration)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::spec::Backoff;

    /// Replays scripted observations; repeats the last one when exhausted
    fn scripted(
        script: Vec<RefreshResult<String>>,
    ) -> (
        impl FnMut() -> std::future::Ready<RefreshResult<String>>,
        Arc<Mutex<u32>>,
    ) {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let mut script: VecDeque<RefreshResult<String>> = script.into();
        let refresh = move || {
            *counter.lock().unwrap() += 1;
            let next = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                clone_result(script.front().unwrap())
            };
            std::future::ready(next)
        };
        (refresh, calls)
    }

    fn clone_result(result: &RefreshResult<String>) -> RefreshResult<String> {
        match result {
            Ok(refresh) => Ok(refresh.clone()),
            Err(error) => Err(WaitError::remote(std::io::Error::other(error.to_string()))),
        }
    }

    fn found(status: &str) -> RefreshResult<String> {
        Ok(Refresh::found(status.to_string(), status))
    }

    fn poller(spec: PollSpec) -> Poller {
        Poller::new(
            spec.backoff(Backoff::fixed(Duration::from_secs(10))),
            ResourceId::new("Test Resource", "r-1"),
            Operation::Create,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn target_on_first_poll_does_not_sleep() {
        let (refresh, calls) = scripted(vec![found("ACTIVE")]);
        let start = Instant::now();
        let spec = PollSpec::new(Duration::from_secs(60), 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let settled = poller(spec).wait(refresh).await.unwrap();

        assert_eq!(settled, Settled::Reached("ACTIVE".to_string()));
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_then_target() {
        let (refresh, calls) = scripted(vec![found("CREATING"), found("CREATING"), found("ACTIVE")]);
        let spec = PollSpec::new(Duration::from_secs(50), 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let settled = poller(spec).wait(refresh).await.unwrap();

        assert_eq!(settled.into_object(), Some("ACTIVE".to_string()));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_state_keeps_polling_by_default() {
        let (refresh, calls) = scripted(vec![found("CREATING"), found("HEALING"), found("ACTIVE")]);
        let spec = PollSpec::new(Duration::from_secs(50), 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let settled = poller(spec).wait(refresh).await.unwrap();

        assert!(!settled.is_gone());
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_state_fails_when_strict() {
        let (refresh, calls) = scripted(vec![found("CREATING"), found("HEALING")]);
        let spec = PollSpec::new(Duration::from_secs(50), 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"])
            .fail_on_unexpected_state(true);

        let failure = poller(spec).wait(refresh).await.unwrap_err();

        assert!(matches!(
            &failure.error,
            WaitError::UnexpectedState { state, reason: None, .. } if state == "HEALING"
        ));
        assert_eq!(failure.last_object.as_deref(), Some("HEALING"));
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_status_stops_immediately_with_reason() {
        let failed = Ok(Refresh::Failed {
            object: "FAILED".to_string(),
            status: "FAILED".to_string(),
            reason: FailureReason::new(Some("InternalError"), Some("broker crashed")),
        });
        let (refresh, calls) = scripted(vec![found("CREATING"), failed]);
        let spec = PollSpec::new(Duration::from_secs(50), 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let failure = poller(spec).wait(refresh).await.unwrap_err();

        assert_eq!(
            failure.to_string(),
            "waiting for Test Resource (r-1) create: unexpected state 'FAILED', wanted target 'ACTIVE': InternalError: broker crashed"
        );
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_status_in_target_set_is_success() {
        let failed = Ok(Refresh::Failed {
            object: "FAILED".to_string(),
            status: "FAILED".to_string(),
            reason: FailureReason::default(),
        });
        let (refresh, _) = scripted(vec![failed]);
        let spec = PollSpec::new(Duration::from_secs(50), 0, 1)
            .pending(["CREATING"])
            .target(["FAILED"]);

        let settled = poller(spec).wait(refresh).await.unwrap();
        assert_eq!(settled, Settled::Reached("FAILED".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_within_budget_is_tolerated() {
        let (refresh, calls) = scripted(vec![Ok(Refresh::NotFound), Ok(Refresh::NotFound), found("ACTIVE")]);
        let spec = PollSpec::new(Duration::from_secs(60), 2, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let settled = poller(spec).wait(refresh).await.unwrap();

        assert_eq!(settled, Settled::Reached("ACTIVE".to_string()));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn found_resets_not_found_budget() {
        let (refresh, calls) = scripted(vec![
            Ok(Refresh::NotFound),
            found("CREATING"),
            Ok(Refresh::NotFound),
            found("ACTIVE"),
        ]);
        let spec = PollSpec::new(Duration::from_secs(60), 1, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        poller(spec).wait(refresh).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_postpones_first_poll() {
        let (refresh, _) = scripted(vec![found("ACTIVE")]);
        let start = Instant::now();
        let spec = PollSpec::new(Duration::from_secs(60), 0, 1)
            .target(["ACTIVE"])
            .delay(Duration::from_secs(30));

        poller(spec).wait(refresh).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_longer_than_timeout_times_out() {
        let (refresh, calls) = scripted(vec![found("ACTIVE")]);
        let spec = PollSpec::new(Duration::from_secs(10), 0, 1)
            .target(["ACTIVE"])
            .delay(Duration::from_secs(30));

        let failure = poller(spec).wait(refresh).await.unwrap_err();
        assert!(failure.error.is_timeout());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_spec_is_rejected_before_polling() {
        let (refresh, calls) = scripted(vec![found("ACTIVE")]);
        let spec = PollSpec::new(Duration::from_secs(10), 0, 0).target(["ACTIVE"]);

        let failure = poller(spec).wait(refresh).await.unwrap_err();
        assert!(matches!(failure.error, WaitError::InvalidSpec(_)));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_target_rejects_empty_target() {
        let (refresh, _) = scripted(vec![found("ACTIVE")]);
        let spec = PollSpec::new(Duration::from_secs(10), 0, 1).pending(["DELETING"]);

        let failure = poller(spec).wait_for_target(refresh).await.unwrap_err();
        assert!(matches!(failure.error, WaitError::InvalidSpec(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_absence_succeeds_on_not_found() {
        let (refresh, _) = scripted(vec![found("DELETING"), Ok(Refresh::NotFound)]);
        let spec = PollSpec::new(Duration::from_secs(60), 0, 1).pending(["DELETING"]);

        poller(spec).wait_for_absence(refresh).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_last_object() {
        let (refresh, _) = scripted(vec![found("CREATING")]);
        let spec = PollSpec::new(Duration::from_secs(35), 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let failure = poller(spec).wait(refresh).await.unwrap_err();

        assert!(failure.error.is_timeout());
        assert_eq!(failure.last_object.as_deref(), Some("CREATING"));
        assert_eq!(
            failure.error.to_string(),
            "timeout while waiting for state to become 'ACTIVE' (last state: 'CREATING', timeout: 35s)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_timeout_does_not_overflow() {
        let (refresh, calls) = scripted(vec![found("CREATING"), found("ACTIVE")]);
        let spec = PollSpec::new(Duration::MAX, 0, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);
        assert!(spec.validate().is_ok());

        let poller = poller(spec);
        assert_eq!(poller.spec().timeout, Duration::MAX);
        assert_eq!(poller.resource().identifier, "r-1");
        let settled = poller.wait(refresh).await.unwrap();

        assert_eq!(settled, Settled::Reached("ACTIVE".to_string()));
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn saturated_delay_still_honours_cancellation() {
        let (refresh, calls) = scripted(vec![found("ACTIVE")]);
        let spec = PollSpec::new(Duration::MAX, 0, 1)
            .target(["ACTIVE"])
            .delay(Duration::MAX);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let failure = poller(spec)
            .with_cancellation(token)
            .wait(refresh)
            .await
            .unwrap_err();

        assert!(failure.error.is_cancelled());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_hanging_refresh() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let refresh = move || {
            *counter.lock().unwrap() += 1;
            std::future::pending::<RefreshResult<String>>()
        };
        let spec = PollSpec::new(Duration::from_secs(600), 0, 1).target(["ACTIVE"]);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });
        let start = Instant::now();

        let failure = poller(spec)
            .with_cancellation(token)
            .wait(refresh)
            .await
            .unwrap_err();

        assert!(failure.error.is_cancelled());
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn switching_target_status_restarts_streak() {
        let (refresh, calls) = scripted(vec![
            found("PendingConnect"),
            found("Connected"),
            found("Connected"),
        ]);
        let spec =
            PollSpec::new(Duration::from_secs(120), 0, 2).target(["PendingConnect", "Connected"]);

        let settled = poller(spec).wait(refresh).await.unwrap();

        assert_eq!(settled, Settled::Reached("Connected".to_string()));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_drops_stale_object() {
        let (refresh, _) = scripted(vec![found("CREATING"), Ok(Refresh::NotFound)]);
        let spec = PollSpec::new(Duration::from_secs(35), 100, 1)
            .pending(["CREATING"])
            .target(["ACTIVE"]);

        let failure = poller(spec).wait(refresh).await.unwrap_err();

        assert!(failure.error.is_timeout());
        assert!(failure.last_object.is_none());
        assert_eq!(
            failure.error.to_string(),
            "timeout while waiting for state to become 'ACTIVE' (last state: 'not found', timeout: 35s)"
        );
    }
}
