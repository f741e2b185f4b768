//! Token endpoint responses parsed into immutable token sets.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Parsing failure raised when a token endpoint body is not a JSON token object.
pub type TokenParseError = serde_path_to_error::Error<serde_json::Error>;

/// Immutable token endpoint response.
///
/// A missing access token is the canonical signal that the provider answered with an
/// OAuth error instead of a token; the `error` and `error_description` fields then live
/// in [`other_params`](Self::other_params). Callers decide success by inspecting
/// [`access_token`](Self::access_token), never by HTTP status.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token secret; `None` when the provider returned an OAuth error.
	pub access_token: Option<TokenSecret>,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute access token expiry.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Absolute refresh token expiry, resolved once when the response was parsed.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub refresh_expires_at: Option<OffsetDateTime>,
	/// Token type reported by the provider (usually `bearer`).
	pub token_type: Option<String>,
	/// Remaining provider-specific response fields, verbatim.
	pub other_params: BTreeMap<String, Value>,
}
impl TokenSet {
	/// Returns a builder for assembling token sets by hand.
	pub fn builder() -> TokenSetBuilder {
		TokenSetBuilder::default()
	}

	/// Parses a token endpoint body received at `now`.
	///
	/// Relative durations (`expires_in`, and the provider's refresh lifetime field named by
	/// `refresh_expires_field`) are converted into absolute instants here and only here,
	/// so re-reading the set never drifts. Numeric strings are accepted for durations.
	pub fn parse(
		body: &[u8],
		now: OffsetDateTime,
		refresh_expires_field: Option<&str>,
	) -> Result<Self, TokenParseError> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let raw: RawTokenResponse = serde_path_to_error::deserialize(&mut de)?;
		let mut other_params = raw.other;
		let absolute = raw
			.expires_at
			.as_ref()
			.and_then(seconds)
			.and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok());
		let relative = raw
			.expires_in
			.as_ref()
			.and_then(seconds)
			.and_then(|secs| now.checked_add(Duration::seconds(secs)));
		let expires_at = absolute.or(relative);

		// Lifetimes that did not produce `expires_at` stay available verbatim.
		if let (None, Some(value)) = (absolute, raw.expires_at) {
			other_params.insert("expires_at".into(), value);
		}
		if let (true, Some(value)) = (absolute.is_some() || relative.is_none(), raw.expires_in) {
			other_params.insert("expires_in".into(), value);
		}

		let refresh_expires_at = refresh_expires_field
			.and_then(|field| other_params.get(field))
			.and_then(seconds)
			.and_then(|secs| now.checked_add(Duration::seconds(secs)));

		Ok(Self {
			access_token: raw.access_token.map(TokenSecret::new),
			refresh_token: raw.refresh_token.map(TokenSecret::new),
			expires_at,
			refresh_expires_at,
			token_type: raw.token_type,
			other_params,
		})
	}

	/// Returns `true` when the provider answered with an OAuth error instead of a token.
	pub fn is_error(&self) -> bool {
		self.access_token.is_none()
	}

	/// Returns `true` when the access token carries an expiry.
	pub fn expires(&self) -> bool {
		self.expires_at.is_some()
	}

	/// Provider-specific field lookup.
	pub fn param(&self, key: &str) -> Option<&Value> {
		self.other_params.get(key)
	}

	/// OAuth `error` code, when present.
	pub fn error(&self) -> Option<&str> {
		self.param("error").and_then(Value::as_str)
	}

	/// OAuth `error_description`, when present.
	pub fn error_description(&self) -> Option<&str> {
		self.param("error_description").and_then(Value::as_str)
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("refresh_expires_at", &self.refresh_expires_at)
			.field("token_type", &self.token_type)
			.field("other_params", &self.other_params.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`TokenSet`].
#[derive(Clone, Debug, Default)]
pub struct TokenSetBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	expires_at: Option<OffsetDateTime>,
	refresh_expires_at: Option<OffsetDateTime>,
	token_type: Option<String>,
	other_params: BTreeMap<String, Value>,
}
impl TokenSetBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the absolute access token expiry.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the absolute refresh token expiry.
	pub fn refresh_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.refresh_expires_at = Some(instant);

		self
	}

	/// Sets the token type.
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Adds a provider-specific field.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.other_params.insert(key.into(), value.into());

		self
	}

	/// Consumes the builder.
	pub fn build(self) -> TokenSet {
		TokenSet {
			access_token: self.access_token,
			refresh_token: self.refresh_token,
			expires_at: self.expires_at,
			refresh_expires_at: self.refresh_expires_at,
			token_type: self.token_type,
			other_params: self.other_params,
		}
	}
}

#[derive(Deserialize)]
struct RawTokenResponse {
	access_token: Option<String>,
	refresh_token: Option<String>,
	token_type: Option<String>,
	expires_in: Option<Value>,
	expires_at: Option<Value>,
	#[serde(flatten)]
	other: BTreeMap<String, Value>,
}

fn seconds(value: &Value) -> Option<i64> {
	match value {
		Value::Number(number) =>
			number.as_i64().or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}
