//! Persistence hooks invoked after every successful refresh.
//!
//! The transport never persists tokens itself; it calls a [`TokenStore`] when one is configured
//! and treats the write as best-effort. [`MemoryStore`] is the in-process implementation used for
//! tests and demos.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Token};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for refreshed tokens.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists the freshly fetched token, replacing any previous value.
	fn write<'a>(&'a self, token: &'a Token) -> StoreFuture<'a, ()>;

	/// Loads the most recently persisted token, if any.
	fn read(&self) -> StoreFuture<'_, Option<Token>>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
