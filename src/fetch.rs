//! Token fetch contract consumed by [`TokenCache`](crate::cache::TokenCache).
//!
//! A [`TokenFetcher`] performs whatever exchange a provider needs (refresh-token grant, client
//! credentials, a sidecar, a static secret) and returns a brand new [`Token`]. The cache calls it
//! from inside its refresh critical section, so implementations never see two concurrent calls
//! from the same cache and do not need to be reentrant.

#[cfg(feature = "reqwest")] pub mod refresh;

#[cfg(feature = "reqwest")] pub use refresh::*;

// self
use crate::{_prelude::*, auth::Token};

/// Boxed future returned by [`TokenFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Token, FetchError>> + 'a + Send>>;

/// Produces fresh tokens on behalf of the cache.
pub trait TokenFetcher
where
	Self: Send + Sync,
{
	/// Fetches a new token. `previous` is the currently cached token (if any), typically used to
	/// read its refresh token.
	fn fetch<'a>(&'a self, previous: Option<&'a Token>) -> FetchFuture<'a>;
}

/// Failures reported by a [`TokenFetcher`].
///
/// The cache forwards these untouched inside [`Error::RefreshFailed`]; it never interprets them.
#[derive(Debug, ThisError)]
pub enum FetchError {
	/// The cached token carries no refresh token to exchange.
	#[error("Cached token is missing a refresh token.")]
	MissingRefreshToken,
	/// The fetcher produced a token that is already expired.
	#[error("Token fetcher returned an expired token.")]
	ExpiredToken,
	/// Provider rejected the exchange with an OAuth error response.
	#[error("Token endpoint returned an OAuth error: {error}.")]
	Provider {
		/// OAuth `error` code (e.g. `invalid_grant`).
		error: String,
		/// Optional `error_description` supplied by the provider.
		description: Option<String>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint answered with something other than a token or an OAuth error.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Summary of what was received.
		message: String,
	},
	/// Network failure (DNS, TCP, TLS, timeout) while calling the provider.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
	/// Any other failure raised by a custom fetcher.
	#[error("{source}")]
	Other {
		/// Fetcher-specific error.
		#[source]
		source: BoxError,
	},
}
impl FetchError {
	/// Wraps a network failure.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}

	/// Wraps an arbitrary fetcher failure.
	pub fn other(src: impl Into<BoxError>) -> Self {
		Self::Other { source: src.into() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	struct StaticFetcher(Token);
	impl TokenFetcher for StaticFetcher {
		fn fetch<'a>(&'a self, _previous: Option<&'a Token>) -> FetchFuture<'a> {
			let token = self.0.clone();

			Box::pin(async move { Ok(token) })
		}
	}

	#[tokio::test]
	async fn fetchers_are_object_safe() {
		let fetcher: Arc<dyn TokenFetcher> = Arc::new(StaticFetcher(Token::new("static")));
		let token = fetcher.fetch(None).await.expect("Static fetcher should always succeed.");

		assert_eq!(token.access_token().expose(), "static");
	}

	#[test]
	fn other_accepts_plain_messages() {
		let err = FetchError::other("sidecar unavailable");

		assert_eq!(err.to_string(), "sidecar unavailable");
		assert!(StdError::source(&err).is_some());
	}
}
