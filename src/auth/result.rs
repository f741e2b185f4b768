//! Canonical authentication outcomes handed back to the host.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ScopeList, TokenSecret, TokenSet, UserInfo},
};

/// Normalized token credentials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
	/// Access token.
	pub token: TokenSecret,
	/// Refresh token, if issued.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute access token expiry.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Token type reported by the provider.
	pub token_type: Option<String>,
	/// `true` when [`expires_at`](Self::expires_at) is known.
	pub expires: bool,
	/// Granted scopes in provider order.
	pub scopes: ScopeList,
	/// Provider-specific extras (refresh token expiry, entitlements).
	pub other: BTreeMap<String, Value>,
}

/// Canonical profile attributes; every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
	/// Display name.
	pub name: Option<String>,
	/// Given name.
	pub first_name: Option<String>,
	/// Family name.
	pub last_name: Option<String>,
	/// Preferred username or handle.
	pub nickname: Option<String>,
	/// Email address.
	pub email: Option<String>,
	/// Avatar URL.
	pub image: Option<String>,
	/// Phone number.
	pub phone: Option<String>,
	/// Free-form location.
	pub location: Option<String>,
	/// Free-form description or bio.
	pub description: Option<String>,
}

/// Raw provider payloads kept for downstream consumers and debugging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extra {
	/// Token set exactly as parsed.
	pub raw_token: TokenSet,
	/// Userinfo object exactly as fetched, when the provider has a profile call.
	pub raw_userinfo: Option<UserInfo>,
}

/// Successful authentication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResult {
	/// Provider that authenticated the user.
	pub provider: ProviderId,
	/// Provider-scoped user identifier.
	pub uid: Option<String>,
	/// Token credentials.
	pub credentials: Credentials,
	/// Profile attributes.
	pub info: Info,
	/// Raw payloads.
	pub extra: Extra,
}

/// A single `(kind, message)` failure entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
	/// Failure kind; a provider OAuth error code or one of the strategy kinds.
	pub kind: String,
	/// Human-readable message.
	pub message: String,
}
impl FailureEntry {
	/// Callback arrived without a code or a provider error.
	pub const MISSING_CODE: &'static str = "missing_code";
	/// Transport, parse, or provider failure during a provider call.
	pub const OAUTH2: &'static str = "OAuth2";
	/// Access token rejected by the userinfo endpoint.
	pub const TOKEN: &'static str = "token";

	/// Creates a new entry.
	pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
		Self { kind: kind.into(), message: message.into() }
	}
}

/// Failed authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailure {
	/// Provider the attempt was made against.
	pub provider: ProviderId,
	/// Ordered failure entries.
	pub errors: Vec<FailureEntry>,
}
impl AuthFailure {
	/// Creates a failure holding one entry.
	pub fn single(
		provider: ProviderId,
		kind: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self { provider, errors: vec![FailureEntry::new(kind, message)] }
	}

	/// Kind of the first entry.
	pub fn kind(&self) -> Option<&str> {
		self.errors.first().map(|entry| entry.kind.as_str())
	}
}
impl Display for AuthFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (idx, entry) in self.errors.iter().enumerate() {
			if idx > 0 {
				f.write_str("; ")?;
			}

			write!(f, "{}: {}", entry.kind, entry.message)?;
		}

		Ok(())
	}
}

/// Terminal output of a callback phase: exactly one of success or failure.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
	/// User authenticated.
	Success(Box<AuthResult>),
	/// Authentication failed.
	Failure(AuthFailure),
}
impl Completion {
	/// Returns `true` for [`Completion::Success`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	/// Converts into a standard result.
	pub fn into_result(self) -> Result<AuthResult, AuthFailure> {
		match self {
			Self::Success(result) => Ok(*result),
			Self::Failure(failure) => Err(failure),
		}
	}
}
