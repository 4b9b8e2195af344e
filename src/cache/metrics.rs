// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing the refresh activity of one [`TokenCache`](super::TokenCache).
///
/// Fast-path hits are not counted; only callers that reached the fetcher show up here.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	store_failure: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of fetcher invocations.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that published a new token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that failed and left the cache untouched.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshed tokens the store failed to persist.
	pub fn store_failures(&self) -> u64 {
		self.store_failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_store_failure(&self) {
		self.store_failure.fetch_add(1, Ordering::Relaxed);
	}
}
