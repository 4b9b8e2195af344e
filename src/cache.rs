//! Token cache with double-checked, single-flight refresh.
//!
//! [`TokenCache::get_valid`] first inspects the cached token under the shared side of the slot
//! lock. Healthy tokens are returned without touching the refresh guard, so any number of
//! callers proceed in parallel. A stale (or missing) token sends the caller to the async refresh
//! guard; once inside it re-checks the slot, because another caller may have finished a refresh
//! while this one was waiting. Only the caller that still observes a stale token invokes the
//! [`TokenFetcher`], publishes the new token, and hands it to the optional [`TokenStore`].
//! Everyone else waiting on the guard wakes up to the published token. The net effect is exactly
//! one fetch per staleness episode.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_EXPIRY_HYSTERESIS, Token},
	fetch::{FetchError, TokenFetcher},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenStore,
};

/// Holds the current token and refreshes it through a [`TokenFetcher`] when it goes stale.
pub struct TokenCache {
	slot: RwLock<Option<Arc<Token>>>,
	refresh_guard: AsyncMutex<()>,
	fetcher: Arc<dyn TokenFetcher>,
	store: Option<Arc<dyn TokenStore>>,
	hysteresis: Duration,
	metrics: RefreshMetrics,
}
impl TokenCache {
	/// Creates an empty cache; the first [`get_valid`](Self::get_valid) call fetches a token.
	pub fn new(fetcher: Arc<dyn TokenFetcher>) -> Self {
		Self {
			slot: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			fetcher,
			store: None,
			hysteresis: DEFAULT_EXPIRY_HYSTERESIS,
			metrics: RefreshMetrics::default(),
		}
	}

	/// Creates a cache seeded with the token last persisted in `store`.
	///
	/// The store is also attached as the write-back target for future refreshes.
	pub async fn from_store(
		fetcher: Arc<dyn TokenFetcher>,
		store: Arc<dyn TokenStore>,
	) -> Result<Self> {
		let initial = store.read().await?;
		let mut cache = Self::new(fetcher).with_store(store);

		if let Some(token) = initial {
			cache = cache.with_token(token);
		}

		Ok(cache)
	}

	/// Seeds the cache with an initial token.
	pub fn with_token(self, token: Token) -> Self {
		*self.slot.write() = Some(Arc::new(token));

		self
	}

	/// Persists every refreshed token to `store` (best-effort).
	pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
		self.store = Some(store);

		self
	}

	/// Overrides the hysteresis window (defaults to 60 seconds); negative values clamp to zero.
	pub fn with_hysteresis(mut self, window: Duration) -> Self {
		self.hysteresis = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Returns the configured hysteresis window.
	pub fn hysteresis(&self) -> Duration {
		self.hysteresis
	}

	/// Returns the refresh counters for this cache.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns a snapshot of the cached token without triggering a refresh.
	pub fn current(&self) -> Option<Arc<Token>> {
		self.slot.read().clone()
	}

	/// Returns a token that is not expiring soon, refreshing it first when needed.
	///
	/// Concurrent callers that observe the same stale token share a single fetch. On failure the
	/// cached token is left untouched and the fetch error is returned as
	/// [`Error::RefreshFailed`].
	pub async fn get_valid(&self) -> Result<Arc<Token>> {
		if let Some(token) = self.fresh() {
			return Ok(token);
		}

		const KIND: FlowKind = FlowKind::Refresh;

		FlowSpan::new(KIND, "get_valid")
			.instrument(async move {
				let _refresh = self.refresh_guard.lock().await;

				if let Some(token) = self.fresh() {
					return Ok(token);
				}

				obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
				self.metrics.record_attempt();

				let previous = self.current();
				let token = match self.fetcher.fetch(previous.as_deref()).await {
					Ok(token) if token.expired() => Err(FetchError::ExpiredToken),
					other => other,
				};
				let token = match token {
					Ok(token) => Arc::new(token),
					Err(e) => {
						self.metrics.record_failure();
						obs::record_flow_outcome(KIND, FlowOutcome::Failure);

						return Err(Error::RefreshFailed(e));
					},
				};

				*self.slot.write() = Some(Arc::clone(&token));

				if let Some(store) = &self.store
					&& let Err(e) = store.write(&token).await
				{
					self.metrics.record_store_failure();
					obs::store_write_failed(&e);
				}

				self.metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);

				Ok(token)
			})
			.await
	}

	fn fresh(&self) -> Option<Arc<Token>> {
		self.slot
			.read()
			.as_ref()
			.filter(|token| !token.expiring_within(self.hysteresis))
			.cloned()
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("token", &self.current())
			.field("store_set", &self.store.is_some())
			.field("hysteresis", &self.hysteresis)
			.field("metrics", &self.metrics)
			.finish()
	}
}
