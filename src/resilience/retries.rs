//! Cross-instance retry policy.
//!
//! # Responsibilities
//! - Hold the bound on instance-rotation retries
//! - Decide from a response status whether another instance is tried
//!
//! # Design Decisions
//! - Only the status decides; a transport error without a retryable
//!   status ends the loop
//! - No delay between cross-instance attempts
//! - Independent from the transport's own same-instance retries

use std::collections::HashSet;

use axum::http::StatusCode;

/// Bound and trigger for retrying a request against the next instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. A request makes at most
    /// `max_forward_retries + 1` attempts.
    pub max_forward_retries: u32,

    /// Statuses that send the request on to the next instance.
    pub retryable_status_codes: HashSet<u16>,
}

impl RetryPolicy {
    pub fn new(max_forward_retries: u32, retryable: impl IntoIterator<Item = u16>) -> Self {
        Self {
            max_forward_retries,
            retryable_status_codes: retryable.into_iter().collect(),
        }
    }

    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.retryable_status_codes.contains(&status.as_u16())
    }

    /// Whether to go again after `attempts` attempts ended with `status`.
    pub fn should_retry(&self, attempts: u32, status: StatusCode) -> bool {
        attempts <= self.max_forward_retries && self.is_retryable(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_up_to_bound_on_retryable_status() {
        let policy = RetryPolicy::new(2, [500]);
        assert!(policy.should_retry(1, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(policy.should_retry(2, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!policy.should_retry(3, StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn other_statuses_stop() {
        let policy = RetryPolicy::new(5, [500]);
        assert!(!policy.should_retry(1, StatusCode::OK));
        assert!(!policy.should_retry(1, StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn default_never_retries() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(0, StatusCode::INTERNAL_SERVER_ERROR));
    }
}
