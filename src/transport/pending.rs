//! Tracking table correlating each call with the authorized copy that was dispatched for it.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use ::http::{Method, Uri};
// self
use crate::_prelude::*;

/// Identity of one [`AuthorizingTransport::execute`](super::AuthorizingTransport::execute) call.
///
/// Also inserted into the response extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);
impl RequestId {
	/// Returns the raw counter value.
	pub const fn get(self) -> u64 {
		self.0
	}
}
impl Display for RequestId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "req-{}", self.0)
	}
}

/// Snapshot of an authorized request that is still in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
	method: Method,
	uri: Uri,
	dispatched_at: OffsetDateTime,
}
impl PendingRequest {
	/// Returns the request method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Returns the request URI.
	pub fn uri(&self) -> &Uri {
		&self.uri
	}

	/// Returns the instant the copy was handed to the executor.
	pub fn dispatched_at(&self) -> OffsetDateTime {
		self.dispatched_at
	}
}

#[derive(Debug, Default)]
pub(crate) struct PendingRequests {
	next_id: AtomicU64,
	entries: Mutex<HashMap<RequestId, PendingRequest>>,
}
impl PendingRequests {
	/// Registers `request` and returns the guard that owns its entry.
	pub(crate) fn track(self: &Arc<Self>, request: &Request<Bytes>) -> PendingGuard {
		let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
		let entry = PendingRequest {
			method: request.method().clone(),
			uri: request.uri().clone(),
			dispatched_at: OffsetDateTime::now_utc(),
		};

		self.entries.lock().insert(id, entry);

		PendingGuard { table: Arc::clone(self), id }
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub(crate) fn get(&self, id: RequestId) -> Option<PendingRequest> {
		self.entries.lock().get(&id).cloned()
	}

	pub(crate) fn contains(&self, id: RequestId) -> bool {
		self.entries.lock().contains_key(&id)
	}

	fn release(&self, id: RequestId) {
		self.entries.lock().remove(&id);
	}
}

/// Owns one tracking entry and removes it when dropped.
pub(crate) struct PendingGuard {
	table: Arc<PendingRequests>,
	id: RequestId,
}
impl PendingGuard {
	pub(crate) fn id(&self) -> RequestId {
		self.id
	}
}
impl Drop for PendingGuard {
	fn drop(&mut self) {
		self.table.release(self.id);
	}
}
impl Debug for PendingGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("PendingGuard").field(&self.id).finish()
	}
}
