//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	auth::Token,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Keeps the latest written token in-process and counts writes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<MemoryStoreInner>);
impl MemoryStore {
	/// Creates a store pre-populated with `token`, as if it had been persisted earlier.
	pub fn with_token(token: Token) -> Self {
		let store = Self::default();

		*store.0.latest.write() = Some(token);

		store
	}

	/// Returns the most recently written token.
	pub fn latest(&self) -> Option<Token> {
		self.0.latest.read().clone()
	}

	/// Returns how many times [`TokenStore::write`] succeeded.
	pub fn writes(&self) -> u64 {
		self.0.writes.load(Ordering::Relaxed)
	}

	fn write_now(&self, token: &Token) -> Result<(), StoreError> {
		*self.0.latest.write() = Some(token.clone());

		self.0.writes.fetch_add(1, Ordering::Relaxed);

		Ok(())
	}
}
impl TokenStore for MemoryStore {
	fn write<'a>(&'a self, token: &'a Token) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.write_now(token) })
	}

	fn read(&self) -> StoreFuture<'_, Option<Token>> {
		let latest = self.latest();

		Box::pin(async move { Ok(latest) })
	}
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
	latest: RwLock<Option<Token>>,
	writes: AtomicU64,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn clones_share_state_and_count_writes() {
		let store = MemoryStore::with_token(Token::new("seed"));
		let handle = store.clone();

		assert_eq!(
			store
				.read()
				.await
				.expect("Memory reads never fail.")
				.map(|token| token.access_token().expose().to_owned()),
			Some("seed".to_owned())
		);

		handle.write(&Token::new("next")).await.expect("Memory writes never fail.");

		assert_eq!(store.writes(), 1);
		assert_eq!(store.latest(), Some(Token::new("next")));
	}
}
