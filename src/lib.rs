//! OAuth 2.0 bearer-token transport decorator: attach fresh credentials to every outgoing request,
//! collapse concurrent refreshes into a single fetch, and never touch the caller's request.
//!
//! The crate is built from two pieces composed per request:
//!
//! - [`cache::TokenCache`] decides whether the cached [`auth::Token`] is still usable and runs the
//!   single-flight refresh protocol against an injected [`fetch::TokenFetcher`].
//! - [`transport::AuthorizingTransport`] decorates any
//!   [`HttpExecutor`](crate::http::HttpExecutor), stamps a copy of each request with the
//!   `Authorization` header, and tracks that copy until the response body reaches end-of-stream or
//!   is closed.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod http;
pub mod obs;
pub mod store;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use bytes::Bytes;
	pub use ::http::{Request, Response};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{BoxError, Error, Result};
}

pub use bytes;
pub use http_body;
#[cfg(feature = "reqwest")] pub use reqwest;
#[cfg(feature = "reqwest")] pub use url;
#[cfg(test)] use {color_eyre as _, http_body_util as _, httpmock as _};
