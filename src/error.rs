//! Transport-level error types shared by the cache, fetchers, stores, and executors.

// self
use crate::{_prelude::*, fetch::FetchError, store::StoreError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for opaque collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Callers can tell "could not authenticate" ([`Error::RefreshFailed`]) apart from "the
/// authenticated request failed" ([`Error::DispatchFailed`]).
#[derive(Debug, ThisError)]
pub enum Error {
	/// The token fetcher failed; the cached token is left unchanged.
	#[error("Token refresh failed.")]
	RefreshFailed(
		#[from]
		#[source]
		FetchError,
	),
	/// The underlying executor failed; its error is kept unchanged as the source.
	#[error("Underlying executor failed to dispatch the request.")]
	DispatchFailed {
		/// Executor error, boxed without modification.
		#[source]
		source: BoxError,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Storage-layer failure while seeding a cache.
	#[error(transparent)]
	Storage(#[from] StoreError),
}
impl Error {
	/// Wraps an executor failure inside [`Error::DispatchFailed`].
	pub fn dispatch(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::DispatchFailed { source: Box::new(src) }
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The token cannot be rendered as an `Authorization` header value.
	#[error("Token cannot be encoded as an Authorization header value.")]
	InvalidAuthorizationHeader {
		/// Underlying header validation failure.
		#[source]
		source: ::http::header::InvalidHeaderValue,
	},
	/// Token endpoint URL cannot be parsed.
	#[cfg(feature = "reqwest")]
	#[error("Token endpoint URL is invalid.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<::http::header::InvalidHeaderValue> for ConfigError {
	fn from(e: ::http::header::InvalidHeaderValue) -> Self {
		Self::InvalidAuthorizationHeader { source: e }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
