//! Immutable OAuth token value with freshness checks and header rendering.

pub mod extra;
pub mod secret;

// crates.io
use ::http::HeaderValue;
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	auth::token::{extra::TokenExtra, secret::TokenSecret},
	error::ConfigError,
};

/// Token type used in the `Authorization` header when the provider omitted one.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";
/// Default margin before the real expiry at which a token counts as expiring soon.
pub const DEFAULT_EXPIRY_HYSTERESIS: Duration = Duration::seconds(60);

/// Credentials used to authorize requests against a protected resource.
///
/// Tokens never change after construction. A refresh produces a new value that replaces the
/// cached one, so a token handed out to a caller keeps describing exactly what was sent.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
	access_token: TokenSecret,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	token_type: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	refresh_token: Option<TokenSecret>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	expiry: Option<OffsetDateTime>,
	#[serde(skip)]
	raw: Option<TokenExtra>,
}
impl Token {
	/// Creates a token carrying only an access token; it never expires until an expiry is set.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: String::new(),
			refresh_token: None,
			expiry: None,
			raw: None,
		}
	}

	/// Sets the token type reported by the provider.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Provides the refresh token value.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn with_expiry(mut self, instant: OffsetDateTime) -> Self {
		self.expiry = Some(instant);

		self
	}

	/// Sets the expiry relative to the current clock.
	///
	/// Offsets past the representable range saturate at the earliest or latest instant.
	pub fn expires_in(self, duration: Duration) -> Self {
		let instant = OffsetDateTime::now_utc().checked_add(duration).unwrap_or_else(|| {
			if duration.is_negative() {
				PrimitiveDateTime::MIN.assume_utc()
			} else {
				PrimitiveDateTime::MAX.assume_utc()
			}
		});

		self.with_expiry(instant)
	}

	/// Attaches raw metadata returned by the provider alongside the token.
	pub fn with_extra(mut self, extra: TokenExtra) -> Self {
		self.raw = Some(extra);

		self
	}

	/// Returns the access token secret. Callers must avoid logging it.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Returns the token type exactly as reported (possibly empty).
	pub fn token_type(&self) -> &str {
		&self.token_type
	}

	/// Returns the token type, falling back to [`DEFAULT_TOKEN_TYPE`] when empty.
	pub fn token_type_or_default(&self) -> &str {
		if self.token_type.is_empty() { DEFAULT_TOKEN_TYPE } else { &self.token_type }
	}

	/// Returns the refresh token secret, if the provider issued one.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref()
	}

	/// Returns the expiry instant; `None` means the token never expires.
	pub fn expiry(&self) -> Option<OffsetDateTime> {
		self.expiry
	}

	/// Looks up an extra field returned by the provider, e.g. `id_token`.
	pub fn extra(&self, key: &str) -> Option<&str> {
		self.raw.as_ref().and_then(|raw| raw.get(key))
	}

	/// Returns `true` if the token has no access token or its expiry is before `now`.
	pub fn expired_at(&self, now: OffsetDateTime) -> bool {
		if self.access_token.expose().is_empty() {
			return true;
		}

		match self.expiry {
			Some(expiry) => expiry < now,
			None => false,
		}
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn expired(&self) -> bool {
		self.expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token is expired at `now` or will expire within `hysteresis`.
	pub fn expiring_within_at(&self, hysteresis: Duration, now: OffsetDateTime) -> bool {
		if self.expired_at(now) {
			return true;
		}

		match self.expiry {
			Some(expiry) => now.checked_add(hysteresis).is_none_or(|edge| edge > expiry),
			None => false,
		}
	}

	/// Returns `true` if the token is expired or will expire within `hysteresis` from now.
	pub fn expiring_within(&self, hysteresis: Duration) -> bool {
		self.expiring_within_at(hysteresis, OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token expires within [`DEFAULT_EXPIRY_HYSTERESIS`].
	pub fn expiring_soon(&self) -> bool {
		self.expiring_within(DEFAULT_EXPIRY_HYSTERESIS)
	}

	/// Renders the `Authorization` header value (`<type> <access token>`), marked sensitive.
	pub fn authorization_value(&self) -> Result<HeaderValue, ConfigError> {
		let mut value = HeaderValue::try_from(format!(
			"{} {}",
			self.token_type_or_default(),
			self.access_token.expose()
		))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expiry", &self.expiry)
			.field("raw", &self.raw)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn tokens_without_expiry_never_expire() {
		let token = Token::new("access");
		let far_future = macros::datetime!(2999-01-01 00:00 UTC);

		assert!(!token.expired());
		assert!(!token.expired_at(far_future));
		assert!(!token.expiring_within(Duration::ZERO));
		assert!(!token.expiring_within(Duration::days(365 * 100)));
		assert!(!token.expiring_soon());
	}

	#[test]
	fn empty_access_token_is_always_expired() {
		let now = OffsetDateTime::now_utc();
		let without_expiry = Token::new("");
		let with_future_expiry = Token::new("").with_expiry(now + Duration::hours(1));

		assert!(without_expiry.expired());
		assert!(without_expiry.expiring_soon());
		assert!(with_future_expiry.expired_at(now));
		assert!(with_future_expiry.expiring_within_at(Duration::ZERO, now));
	}

	#[test]
	fn hysteresis_window_controls_expiring_within() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = Token::new("access").with_expiry(now + Duration::seconds(30));

		assert!(!token.expired_at(now));
		assert!(token.expiring_within_at(Duration::seconds(60), now));
		assert!(!token.expiring_within_at(Duration::seconds(10), now));
	}

	#[test]
	fn oversized_windows_count_as_expiring_without_panicking() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = Token::new("access").with_expiry(now + Duration::hours(1));

		assert!(token.expiring_within_at(Duration::MAX, now));
		assert!(token.expiring_within(Duration::MAX));
		assert!(!Token::new("access").expiring_within(Duration::MAX));
	}

	#[test]
	fn expires_in_saturates_out_of_range_offsets() {
		let far = Token::new("access").expires_in(Duration::MAX);
		let past = Token::new("access").expires_in(Duration::MIN);

		assert_eq!(far.expiry(), Some(PrimitiveDateTime::MAX.assume_utc()));
		assert!(!far.expired());
		assert_eq!(past.expiry(), Some(PrimitiveDateTime::MIN.assume_utc()));
		assert!(past.expired());
	}

	#[test]
	fn past_expiry_is_expired() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = Token::new("access").with_expiry(now - Duration::seconds(1));

		assert!(token.expired_at(now));
		assert!(token.expiring_within_at(Duration::ZERO, now));
	}

	#[test]
	fn authorization_value_defaults_to_bearer() {
		let token = Token::new("abc").expires_in(Duration::hours(1));
		let value = token.authorization_value().expect("Header value should be valid.");

		assert_eq!(value, "Bearer abc");
		assert!(value.is_sensitive());

		let mac = Token::new("abc").with_token_type("MAC");

		assert_eq!(mac.authorization_value().expect("Header value should be valid."), "MAC abc");
	}

	#[test]
	fn authorization_value_rejects_control_characters() {
		let token = Token::new("abc\ndef");

		assert!(matches!(
			token.authorization_value(),
			Err(ConfigError::InvalidAuthorizationHeader { .. })
		));
	}

	#[test]
	fn debug_redacts_secrets() {
		let token = Token::new("access-secret").with_refresh_token("refresh-secret");
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("access-secret"));
		assert!(!rendered.contains("refresh-secret"));
		assert!(rendered.contains("<redacted>"));
	}

	#[test]
	fn serialization_omits_raw_metadata() {
		let token = Token::new("access")
			.with_token_type("Bearer")
			.with_extra(TokenExtra::from_form_pairs([("id_token", "opaque")]));
		let payload = serde_json::to_value(&token).expect("Token should serialize to JSON.");

		assert_eq!(payload["access_token"], "access");
		assert_eq!(payload["token_type"], "Bearer");
		assert!(payload.get("raw").is_none());
		assert!(payload.get("refresh_token").is_none());
	}
}
