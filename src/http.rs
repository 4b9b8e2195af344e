//! Executor seam decorated by [`AuthorizingTransport`](crate::transport::AuthorizingTransport).
//!
//! [`HttpExecutor`] is the crate's only dependency on an HTTP stack. It receives a fully prepared
//! [`Request<Bytes>`] (already carrying the `Authorization` header) and returns a streaming
//! response whose body implements [`http_body::Body`]. Implementations own timeouts, retries,
//! and connection management; their errors are forwarded to callers without modification.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpExecutor::execute`].
pub type ExecuteFuture<'a, B, E> =
	Pin<Box<dyn Future<Output = Result<Response<B>, E>> + 'a + Send>>;

/// Underlying request executor decorated by the transport.
///
/// Implementations must be `Send + Sync + 'static` so one executor can be shared by every clone of
/// a transport, and the futures they return must be `Send` so callers can box them freely.
pub trait HttpExecutor
where
	Self: 'static + Send + Sync,
{
	/// Streaming response body.
	type Body: http_body::Body;
	/// Concrete error emitted by the executor.
	type Error: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves once response headers are available.
	fn execute(&self, request: Request<Bytes>) -> ExecuteFuture<'_, Self::Body, Self::Error>;
}

/// [`HttpExecutor`] backed by a shared [`ReqwestClient`].
///
/// Redirect policy, timeouts, and TLS settings come from the wrapped client.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestExecutor(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestExecutor {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestExecutor {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestExecutor {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpExecutor for ReqwestExecutor {
	type Body = reqwest::Body;
	type Error = ReqwestError;

	fn execute(&self, request: Request<Bytes>) -> ExecuteFuture<'_, Self::Body, Self::Error> {
		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = self.0.execute(request).await?;

			Ok(Response::<reqwest::Body>::from(response))
		})
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn reqwest_executor_rejects_relative_uris() {
		let executor = ReqwestExecutor::default();
		let request = Request::builder()
			.uri("/relative")
			.body(Bytes::new())
			.expect("Request should build.");
		let err = executor.execute(request).await.expect_err("Relative URIs cannot be sent.");

		assert!(err.is_builder());
	}
}
