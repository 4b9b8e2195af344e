//! Request decorator that authorizes a copy of every outgoing request.
//!
//! [`AuthorizingTransport::execute`] never mutates the caller's request. It asks the
//! [`TokenCache`] for a valid token, builds an independent copy with the `Authorization` header set,
//! records the copy in a tracking table, and hands it to the wrapped [`HttpExecutor`]. The entry
//! lives exactly as long as the caller can still observe the response: it is dropped when dispatch
//! fails, when the in-flight call is abandoned, or when the returned [`TrackedBody`] reaches
//! end-of-stream or is closed.

pub mod body;
pub mod pending;

pub use body::TrackedBody;
pub use pending::{PendingRequest, RequestId};

// crates.io
use ::http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::Token,
	cache::TokenCache,
	http::HttpExecutor,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	transport::pending::PendingRequests,
};

/// Decorates an [`HttpExecutor`] with OAuth bearer authorization.
///
/// Cloning is cheap; clones share the executor, the token cache, and the tracking table.
pub struct AuthorizingTransport<E> {
	executor: Arc<E>,
	cache: Arc<TokenCache>,
	pending: Arc<PendingRequests>,
}
impl<E> AuthorizingTransport<E>
where
	E: HttpExecutor,
{
	/// Creates a transport that authorizes requests with tokens from `cache`.
	pub fn new(executor: E, cache: impl Into<Arc<TokenCache>>) -> Self {
		Self {
			executor: Arc::new(executor),
			cache: cache.into(),
			pending: Default::default(),
		}
	}

	/// Sends an authorized copy of `request` through the wrapped executor.
	///
	/// Token failures surface as [`Error::RefreshFailed`] before anything is sent. Executor
	/// failures surface as [`Error::DispatchFailed`] with the executor's error as the source.
	/// The response carries its [`RequestId`] in its extensions.
	pub async fn execute(
		&self,
		request: &Request<Bytes>,
	) -> Result<Response<TrackedBody<E::Body>>> {
		let token = self.cache.get_valid().await?;
		let mut authorized = clone_request(request);

		authorized.headers_mut().insert(AUTHORIZATION, token.authorization_value()?);

		const KIND: FlowKind = FlowKind::Dispatch;

		let guard = self.pending.track(&authorized);
		let id = guard.id();

		FlowSpan::new(KIND, "execute")
			.instrument(async move {
				obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

				match self.executor.execute(authorized).await {
					Ok(response) => {
						obs::record_flow_outcome(KIND, FlowOutcome::Success);

						let (mut parts, body) = response.into_parts();

						parts.extensions.insert(id);

						Ok(Response::from_parts(parts, TrackedBody::new(body, guard)))
					},
					Err(e) => {
						drop(guard);
						obs::record_flow_outcome(KIND, FlowOutcome::Failure);

						Err(Error::dispatch(e))
					},
				}
			})
			.await
	}

	/// Returns the wrapped executor.
	pub fn executor(&self) -> &E {
		&self.executor
	}
}
impl<E> AuthorizingTransport<E> {
	/// Returns the cached token without triggering a refresh.
	pub fn current_token(&self) -> Option<Arc<Token>> {
		self.cache.current()
	}

	/// Returns the token cache shared by this transport.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Returns the number of authorized requests whose responses are still open.
	pub fn pending_requests(&self) -> usize {
		self.pending.len()
	}

	/// Returns a snapshot of the tracked request for `id`, if it is still open.
	pub fn pending_request(&self, id: RequestId) -> Option<PendingRequest> {
		self.pending.get(id)
	}

	/// Returns `true` while the request identified by `id` is still tracked.
	pub fn is_pending(&self, id: RequestId) -> bool {
		self.pending.contains(id)
	}
}
impl<E> Clone for AuthorizingTransport<E> {
	fn clone(&self) -> Self {
		Self {
			executor: Arc::clone(&self.executor),
			cache: Arc::clone(&self.cache),
			pending: Arc::clone(&self.pending),
		}
	}
}
impl<E> Debug for AuthorizingTransport<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizingTransport")
			.field("cache", &self.cache)
			.field("pending_requests", &self.pending.len())
			.finish_non_exhaustive()
	}
}

/// Copies `request` so the caller's header map is never touched.
///
/// The body is reference counted and shared; headers are deep-copied.
fn clone_request(request: &Request<Bytes>) -> Request<Bytes> {
	let mut copy = Request::new(request.body().clone());

	*copy.method_mut() = request.method().clone();
	*copy.uri_mut() = request.uri().clone();
	*copy.version_mut() = request.version();
	*copy.headers_mut() = request.headers().clone();
	*copy.extensions_mut() = request.extensions().clone();

	copy
}

#[cfg(test)]
mod tests {
	// crates.io
	use ::http::{HeaderValue, Method, Version, header::CONTENT_TYPE};
	// self
	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	struct TraceTag(&'static str);

	#[test]
	fn clone_request_is_structurally_independent() {
		let mut original = Request::builder()
			.method(Method::PUT)
			.uri("https://api.example.com/items/1")
			.version(Version::HTTP_2)
			.header(CONTENT_TYPE, "application/json")
			.body(Bytes::from_static(b"{}"))
			.expect("Request should build.");

		original.extensions_mut().insert(TraceTag("outer"));

		let mut copy = clone_request(&original);

		copy.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
		copy.extensions_mut().insert(TraceTag("inner"));

		assert_eq!(copy.method(), Method::PUT);
		assert_eq!(copy.uri(), original.uri());
		assert_eq!(copy.version(), Version::HTTP_2);
		assert_eq!(copy.body(), original.body());
		assert_eq!(copy.headers()[CONTENT_TYPE], "application/json");
		assert!(original.headers().get(AUTHORIZATION).is_none());
		assert_eq!(original.extensions().get::<TraceTag>(), Some(&TraceTag("outer")));
	}
}
