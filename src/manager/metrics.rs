// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for [`CredentialManager::authorize`](super::CredentialManager::authorize).
#[derive(Debug, Default)]
pub struct AuthorizeMetrics {
	attempts: AtomicU64,
	cache_hits: AtomicU64,
	flight_joins: AtomicU64,
	fetches: AtomicU64,
	failures: AtomicU64,
}
impl AuthorizeMetrics {
	/// Returns the total number of authorize calls.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of calls answered from the store without a network call.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that waited on a fetch/refresh flight (leaders included).
	pub fn flight_joins(&self) -> u64 {
		self.flight_joins.load(Ordering::Relaxed)
	}

	/// Returns the number of fetch/refresh requests handed to the fetcher.
	pub fn fetches(&self) -> u64 {
		self.fetches.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that ended with an error.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_flight_join(&self) {
		self.flight_joins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_fetch(&self) {
		self.fetches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}
