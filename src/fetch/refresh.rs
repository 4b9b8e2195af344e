//! `grant_type=refresh_token` fetcher built on the `oauth2` crate's reqwest integration.
//!
//! The fetcher reads the refresh token from the previously cached [`Token`], exchanges it at the
//! provider's token endpoint, and maps the response back into a new [`Token`]. Providers that do
//! not rotate refresh tokens keep the previous one, and any non-standard response fields are kept
//! as JSON metadata reachable through [`Token::extra`].

// crates.io
use oauth2::{
	AuthType, Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet, ExtraTokenFields,
	HttpClientError, RefreshToken, RequestTokenError, Scope, StandardRevocableToken,
	StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
};
use reqwest::redirect::Policy;
use serde_json::{Map, Value};
use url::Url;
// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_TOKEN_TYPE, Token, TokenExtra, TokenSecret},
	error::ConfigError,
	fetch::{FetchError, FetchFuture, TokenFetcher},
};

type RefreshTokenResponse = StandardTokenResponse<RawTokenFields, BasicTokenType>;
type RefreshClient = Client<
	BasicErrorResponse,
	RefreshTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type RefreshRequestError = RequestTokenError<HttpClientError<ReqwestError>, BasicErrorResponse>;

/// How the client authenticates itself at the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientAuthMethod {
	/// HTTP Basic authentication with the client id and secret.
	#[default]
	ClientSecretBasic,
	/// Client id and secret sent in the form body.
	ClientSecretPost,
}

/// [`TokenFetcher`] that exchanges the cached refresh token for a new access token.
pub struct RefreshTokenFetcher {
	client_id: String,
	token_endpoint: Url,
	oauth_client: RefreshClient,
	http_client: ReqwestClient,
	scopes: Vec<String>,
	client_secret_set: bool,
}
impl RefreshTokenFetcher {
	/// Creates a fetcher for the provided client identifier and token endpoint.
	///
	/// The default HTTP client does not follow redirects; token endpoints must answer directly.
	pub fn new(client_id: impl Into<String>, token_endpoint: Url) -> Result<Self> {
		let client_id = client_id.into();
		let token_url = TokenUrl::new(token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidTokenEndpoint { source })?;
		let oauth_client: RefreshClient =
			Client::new(ClientId::new(client_id.clone())).set_token_uri(token_url);
		let http_client =
			ReqwestClient::builder().redirect(Policy::none()).build().map_err(ConfigError::from)?;

		Ok(Self {
			client_id,
			token_endpoint,
			oauth_client,
			http_client,
			scopes: Vec::new(),
			client_secret_set: false,
		})
	}

	/// Sets the client secret used by confidential clients.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.oauth_client = self.oauth_client.set_client_secret(ClientSecret::new(secret.into()));
		self.client_secret_set = true;

		self
	}

	/// Chooses how client credentials are presented (defaults to HTTP Basic).
	pub fn with_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		let auth_type = match method {
			ClientAuthMethod::ClientSecretBasic => AuthType::BasicAuth,
			ClientAuthMethod::ClientSecretPost => AuthType::RequestBody,
		};

		self.oauth_client = self.oauth_client.set_auth_type(auth_type);

		self
	}

	/// Requests the provided scopes on every refresh.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Replaces the HTTP client. Configure it to disable redirect following.
	pub fn with_http_client(mut self, client: ReqwestClient) -> Self {
		self.http_client = client;

		self
	}
}
impl TokenFetcher for RefreshTokenFetcher {
	fn fetch<'a>(&'a self, previous: Option<&'a Token>) -> FetchFuture<'a> {
		Box::pin(async move {
			let previous_refresh = previous
				.and_then(Token::refresh_token)
				.filter(|secret| !secret.is_empty())
				.ok_or(FetchError::MissingRefreshToken)?;
			let refresh_secret = RefreshToken::new(previous_refresh.expose().to_owned());
			let mut request = self.oauth_client.exchange_refresh_token(&refresh_secret);

			for scope in &self.scopes {
				request = request.add_scope(Scope::new(scope.clone()));
			}

			let response =
				request.request_async(&self.http_client).await.map_err(map_request_error)?;

			map_token_response(response, previous_refresh)
		})
	}
}
impl Debug for RefreshTokenFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshTokenFetcher")
			.field("client_id", &self.client_id)
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("scopes", &self.scopes)
			.field("client_secret_set", &self.client_secret_set)
			.finish()
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct RawTokenFields {
	#[serde(flatten)]
	fields: Map<String, Value>,
}
impl ExtraTokenFields for RawTokenFields {}

fn map_token_response(
	response: RefreshTokenResponse,
	previous_refresh: &TokenSecret,
) -> Result<Token, FetchError> {
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => DEFAULT_TOKEN_TYPE.to_owned(),
		other => <BasicTokenType as AsRef<str>>::as_ref(other).to_owned(),
	};
	let refresh = response
		.refresh_token()
		.map(|secret| secret.secret().to_owned())
		.unwrap_or_else(|| previous_refresh.expose().to_owned());
	let mut token = Token::new(response.access_token().secret().to_owned())
		.with_token_type(token_type)
		.with_refresh_token(refresh);

	if let Some(expires_in) = response.expires_in() {
		let expiry = i64::try_from(expires_in.as_secs())
			.ok()
			.and_then(|secs| OffsetDateTime::now_utc().checked_add(Duration::seconds(secs)))
			.ok_or_else(|| FetchError::UnexpectedResponse {
				message: "expires_in exceeds the supported range".into(),
			})?;

		token = token.with_expiry(expiry);
	}

	let extra = &response.extra_fields().fields;

	if !extra.is_empty() {
		token = token.with_extra(TokenExtra::from_json_map(extra.clone()));
	}

	Ok(token)
}

fn map_request_error(err: RefreshRequestError) -> FetchError {
	match err {
		RequestTokenError::ServerResponse(response) => FetchError::Provider {
			error: response.error().as_ref().to_owned(),
			description: response.error_description().cloned(),
		},
		RequestTokenError::Request(error) => FetchError::transport(error),
		RequestTokenError::Parse(source, _body) => FetchError::Parse { source },
		RequestTokenError::Other(message) => FetchError::UnexpectedResponse { message },
	}
}
