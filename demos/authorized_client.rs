//! Demonstrates wrapping a custom executor with [`AuthorizingTransport`].
//!
//! 1. Implement [`TokenFetcher`] for whatever exchange the provider needs.
//! 2. Implement [`HttpExecutor`] for the HTTP stack in use (here an in-process echo server).
//! 3. Build a [`TokenCache`] and hand it to the transport together with the executor.
//! 4. Send requests; the transport refreshes once and stamps every copy with the token.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use color_eyre::Result;
use http::{Request, Response, header::AUTHORIZATION};
use http_body_util::{BodyExt, Full};
use time::Duration;
// self
use oauth2_transport::{
	auth::Token,
	bytes::Bytes,
	cache::TokenCache,
	fetch::{FetchFuture, TokenFetcher},
	http::{ExecuteFuture, HttpExecutor},
	store::MemoryStore,
	transport::{AuthorizingTransport, RequestId},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store = Arc::new(MemoryStore::default());
	let cache = TokenCache::new(Arc::new(SidecarFetcher::default()))
		.with_store(store.clone())
		.with_hysteresis(Duration::seconds(30));
	let transport = AuthorizingTransport::new(EchoExecutor, cache);

	for path in ["/profile", "/orders", "/settings"] {
		let request = Request::builder()
			.uri(format!("https://api.example.com{path}"))
			.body(Bytes::new())?;
		let response = transport.execute(&request).await?;
		let id = response.extensions().get::<RequestId>().copied();
		let body = response.into_body().collect().await?.to_bytes();

		println!("{id:?} {path} -> {}", String::from_utf8_lossy(&body));
	}

	println!(
		"refreshes: {}, persisted writes: {}, open responses: {}",
		transport.cache().metrics().successes(),
		store.writes(),
		transport.pending_requests()
	);

	Ok(())
}

#[derive(Default)]
struct SidecarFetcher {
	issued: AtomicUsize,
}
impl TokenFetcher for SidecarFetcher {
	fn fetch<'a>(&'a self, _previous: Option<&'a Token>) -> FetchFuture<'a> {
		let serial = self.issued.fetch_add(1, Ordering::Relaxed) + 1;

		Box::pin(async move {
			Ok(Token::new(format!("demo-access-{serial}"))
				.with_token_type("Bearer")
				.expires_in(Duration::minutes(10)))
		})
	}
}

struct EchoExecutor;
impl HttpExecutor for EchoExecutor {
	type Body = Full<Bytes>;
	type Error = EchoError;

	fn execute(&self, request: Request<Bytes>) -> ExecuteFuture<'_, Self::Body, Self::Error> {
		Box::pin(async move {
			let header = request.headers().get(AUTHORIZATION).ok_or(EchoError)?;
			let echoed = Bytes::copy_from_slice(header.as_bytes());

			Ok::<_, EchoError>(Response::new(Full::new(echoed)))
		})
	}
}

#[derive(Debug)]
struct EchoError;
impl Display for EchoError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("request reached the echo server without an Authorization header")
	}
}
impl StdError for EchoError {}
