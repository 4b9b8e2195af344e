#![allow(dead_code)]

// std
use std::{
	io::{Error as IoError, ErrorKind},
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration as StdDuration,
};
// crates.io
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use parking_lot::Mutex;
use time::Duration;
// self
use oauth2_transport::{
	auth::Token,
	fetch::{FetchError, FetchFuture, TokenFetcher},
	http::{ExecuteFuture, HttpExecutor},
	store::{StoreError, StoreFuture, TokenStore},
};

/// Fetcher that mints `token-<n>` on every call and counts invocations.
pub struct CountingFetcher {
	calls: AtomicUsize,
	delay: Option<StdDuration>,
	lifetime: Duration,
	fail: bool,
}
impl CountingFetcher {
	pub fn new() -> Self {
		Self { calls: AtomicUsize::new(0), delay: None, lifetime: Duration::hours(1), fail: false }
	}

	pub fn with_delay(mut self, delay: StdDuration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime = lifetime;

		self
	}

	pub fn failing(mut self) -> Self {
		self.fail = true;

		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TokenFetcher for CountingFetcher {
	fn fetch<'a>(&'a self, _previous: Option<&'a Token>) -> FetchFuture<'a> {
		Box::pin(async move {
			let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}
			if self.fail {
				return Err(FetchError::other("provider offline"));
			}

			Ok(Token::new(format!("token-{call}"))
				.with_refresh_token("refresh")
				.expires_in(self.lifetime))
		})
	}
}

/// Store whose writes always fail.
pub struct FailingStore;
impl TokenStore for FailingStore {
	fn write<'a>(&'a self, _token: &'a Token) -> StoreFuture<'a, ()> {
		Box::pin(async { Err(StoreError::Backend { message: "disk unavailable".into() }) })
	}

	fn read(&self) -> StoreFuture<'_, Option<Token>> {
		Box::pin(async { Ok(None) })
	}
}

/// Executor that records every request it receives and answers with a fixed body.
#[derive(Clone, Default)]
pub struct FakeExecutor {
	seen: std::sync::Arc<Mutex<Vec<Request<Bytes>>>>,
	body: Bytes,
	fail: bool,
}
impl FakeExecutor {
	pub fn responding(body: &'static str) -> Self {
		Self { body: Bytes::from_static(body.as_bytes()), ..Default::default() }
	}

	pub fn refusing() -> Self {
		Self { fail: true, ..Default::default() }
	}

	pub fn seen(&self) -> usize {
		self.seen.lock().len()
	}

	pub fn last_request(&self) -> Option<(http::Method, http::Uri, http::HeaderMap, Bytes)> {
		self.seen.lock().last().map(|request| {
			(
				request.method().clone(),
				request.uri().clone(),
				request.headers().clone(),
				request.body().clone(),
			)
		})
	}
}
impl HttpExecutor for FakeExecutor {
	type Body = Full<Bytes>;
	type Error = IoError;

	fn execute(&self, request: Request<Bytes>) -> ExecuteFuture<'_, Self::Body, Self::Error> {
		self.seen.lock().push(request);

		let body = self.body.clone();
		let fail = self.fail;

		Box::pin(async move {
			if fail {
				return Err(IoError::new(ErrorKind::ConnectionRefused, "connection refused"));
			}

			Ok(Response::new(Full::new(body)))
		})
	}
}

/// Executor whose dispatch never completes.
pub struct StalledExecutor;
impl HttpExecutor for StalledExecutor {
	type Body = Full<Bytes>;
	type Error = IoError;

	fn execute(&self, _request: Request<Bytes>) -> ExecuteFuture<'_, Self::Body, Self::Error> {
		Box::pin(std::future::pending())
	}
}

pub fn get(uri: &str) -> Request<Bytes> {
	Request::builder().uri(uri).body(Bytes::new()).expect("Request fixture should build.")
}
