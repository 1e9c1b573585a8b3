use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::AppError;
use crate::proxy::Upstream;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Upstream,
    pub metrics: Arc<ProxyMetrics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let upstream = Upstream::new(&config.backend_url)?;
        Ok(Self {
            upstream,
            metrics: Arc::new(ProxyMetrics::new()),
        })
    }
}

#[derive(Debug, Default)]
pub struct ProxyMetrics {
    pub requests: AtomicU64,
    pub unauthorized: AtomicU64,
    pub upstream_errors: AtomicU64,
    pub invalid_upstream: AtomicU64,
    pub unreachable: AtomicU64,
    pub internal_errors: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProxyMetricsSnapshot {
    pub requests: u64,
    pub unauthorized: u64,
    pub upstream_errors: u64,
    pub invalid_upstream: u64,
    pub unreachable: u64,
    pub internal_errors: u64,
}

impl ProxyMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProxyMetricsSnapshot {
        ProxyMetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            unauthorized: self.unauthorized.load(Ordering::Relaxed),
            upstream_errors: self.upstream_errors.load(Ordering::Relaxed),
            invalid_upstream: self.invalid_upstream.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
        }
    }

    pub fn inc_requests(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Backend answered with a non-success status that was relayed as-is.
    pub fn inc_upstream_errors(&self) -> u64 {
        self.upstream_errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Bumps the counter for `err`'s class and returns its new value.
    pub fn record_failure(&self, err: &AppError) -> u64 {
        let counter = match err {
            AppError::InvalidUpstreamResponse(_) => &self.invalid_upstream,
            AppError::UpstreamUnreachable(_) => &self.unreachable,
            AppError::Internal(_) => &self.internal_errors,
            AppError::Unauthorized(_) => &self.unauthorized,
        };
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_land_in_their_own_counter() {
        let metrics = ProxyMetrics::new();
        metrics.inc_requests();
        metrics.record_failure(&AppError::UpstreamUnreachable("refused".to_string()));
        metrics.record_failure(&AppError::UpstreamUnreachable("refused".to_string()));
        metrics.record_failure(&AppError::InvalidUpstreamResponse("eof".to_string()));
        let rejected = metrics.record_failure(&AppError::Unauthorized("missing".to_string()));
        assert_eq!(rejected, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 1);
        assert_eq!(snapshot.unauthorized, 1);
        assert_eq!(snapshot.unreachable, 2);
        assert_eq!(snapshot.invalid_upstream, 1);
        assert_eq!(snapshot.internal_errors, 0);
    }
}
