//! Response body decorator that releases its tracking entry once the body is finished.

// std
use std::task::{Context, Poll};
// crates.io
use http_body::{Body, Frame, SizeHint};
use pin_project::pin_project;
// self
use crate::{
	_prelude::*,
	transport::pending::{PendingGuard, RequestId},
};

/// Response body returned by [`AuthorizingTransport`](super::AuthorizingTransport).
///
/// Frames, size hints, and errors of the wrapped body pass through unchanged. The tracking entry is
/// released exactly once, on the first of: end-of-stream, [`close`](Self::close), or drop.
#[pin_project]
pub struct TrackedBody<B> {
	#[pin]
	inner: B,
	guard: Option<PendingGuard>,
	id: RequestId,
}
impl<B> TrackedBody<B> {
	pub(crate) fn new(inner: B, guard: PendingGuard) -> Self {
		let id = guard.id();

		Self { inner, guard: Some(guard), id }
	}

	/// Returns the identity of the call that produced this body.
	pub fn request_id(&self) -> RequestId {
		self.id
	}

	/// Returns `true` while the tracking entry is still held.
	pub fn is_tracked(&self) -> bool {
		self.guard.is_some()
	}

	/// Releases the tracking entry without reading the rest of the body. Idempotent.
	pub fn close(&mut self) {
		self.guard.take();
	}

	/// Releases the tracking entry and returns the wrapped body.
	pub fn into_inner(self) -> B {
		let Self { inner, guard, .. } = self;

		drop(guard);

		inner
	}
}
impl<B> Body for TrackedBody<B>
where
	B: Body,
{
	type Data = B::Data;
	type Error = B::Error;

	fn poll_frame(
		self: Pin<&mut Self>,
		cx: &mut Context<'_>,
	) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
		let this = self.project();
		let polled = this.inner.poll_frame(cx);

		if let Poll::Ready(None) = polled {
			this.guard.take();
		}

		polled
	}

	fn is_end_stream(&self) -> bool {
		self.inner.is_end_stream()
	}

	fn size_hint(&self) -> SizeHint {
		self.inner.size_hint()
	}
}
impl<B> Debug for TrackedBody<B> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TrackedBody")
			.field("request_id", &self.id)
			.field("tracked", &self.is_tracked())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use http_body_util::{BodyExt, Full};
	// self
	use super::*;
	use crate::transport::pending::PendingRequests;

	fn tracked(table: &Arc<PendingRequests>, payload: &'static [u8]) -> TrackedBody<Full<Bytes>> {
		let request = Request::builder()
			.uri("https://api.example.com/items")
			.body(Bytes::new())
			.expect("Request should build.");

		TrackedBody::new(Full::new(Bytes::from_static(payload)), table.track(&request))
	}

	#[tokio::test]
	async fn end_of_stream_releases_entry_once() {
		let table = Arc::new(PendingRequests::default());
		let mut body = tracked(&table, b"hello");

		assert_eq!(body.size_hint().exact(), Some(5));

		let frame = body
			.frame()
			.await
			.expect("Body should yield a frame.")
			.expect("Frame should not fail.");

		assert_eq!(frame.into_data().expect("Frame should carry data."), "hello");
		assert!(body.is_tracked());
		assert!(body.frame().await.is_none());
		assert!(!body.is_tracked());
		assert_eq!(table.len(), 0);
		assert!(body.frame().await.is_none());
		assert_eq!(table.len(), 0);
	}

	#[test]
	fn close_and_drop_release_entry() {
		let table = Arc::new(PendingRequests::default());
		let mut closed = tracked(&table, b"unread");
		let dropped = tracked(&table, b"unread");

		assert_eq!(table.len(), 2);

		closed.close();
		closed.close();

		assert!(!closed.is_tracked());
		assert!(!table.contains(closed.request_id()));
		assert!(table.contains(dropped.request_id()));

		drop(dropped);

		assert_eq!(table.len(), 0);
	}

	#[test]
	fn into_inner_releases_entry() {
		let table = Arc::new(PendingRequests::default());
		let body = tracked(&table, b"raw");
		let _inner = body.into_inner();

		assert_eq!(table.len(), 0);
	}
}
