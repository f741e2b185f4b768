//! Per-request state owned by the host between strategy phases.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Completion, TokenSet, UserInfo},
	provider::ConfigOverrides,
};

/// Where an [`Exchange`] stands in the authorization-code handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
	/// Nothing has happened yet.
	#[default]
	Idle,
	/// The user was redirected to the provider.
	RequestIssued,
	/// A callback is being processed.
	CallbackPending,
	/// The callback finished with the given outcome.
	Completed(Outcome),
}

/// Terminal outcome label of a callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// The callback produced an [`AuthResult`](crate::auth::AuthResult).
	Success,
	/// The callback produced an [`AuthFailure`](crate::auth::AuthFailure).
	Failure,
}

/// Per-request handshake state.
///
/// The token set and userinfo fetched during a callback are stashed here while the
/// callback runs and dropped as soon as it completes, so a reused value never carries one
/// user's tokens into another request.
#[derive(Clone, Debug, Default)]
pub struct Exchange {
	phase: Phase,
	token: Option<TokenSet>,
	userinfo: Option<UserInfo>,
}
impl Exchange {
	/// Creates an idle exchange.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Token set stashed by a running callback.
	pub fn token(&self) -> Option<&TokenSet> {
		self.token.as_ref()
	}

	/// Userinfo stashed by a running callback.
	pub fn userinfo(&self) -> Option<&UserInfo> {
		self.userinfo.as_ref()
	}

	/// Returns `true` once a callback has completed.
	pub fn is_completed(&self) -> bool {
		matches!(self.phase, Phase::Completed(_))
	}

	/// Drops stashed payloads and returns to [`Phase::Idle`].
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub(crate) fn mark_requested(&mut self) {
		self.phase = Phase::RequestIssued;
	}

	pub(crate) fn begin_callback(&mut self) {
		self.token = None;
		self.userinfo = None;
		self.phase = Phase::CallbackPending;
	}

	pub(crate) fn stash_token(&mut self, token: TokenSet) {
		self.token = Some(token);
	}

	pub(crate) fn stash_userinfo(&mut self, userinfo: UserInfo) {
		self.userinfo = Some(userinfo);
	}

	pub(crate) fn complete(&mut self, completion: &Completion) {
		self.token = None;
		self.userinfo = None;
		self.phase = Phase::Completed(if completion.is_success() {
			Outcome::Success
		} else {
			Outcome::Failure
		});
	}
}

/// Inbound HTTP request as seen by the strategy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundRequest {
	/// Query or form parameters; the last value wins for repeated keys.
	pub params: BTreeMap<String, String>,
	/// Callback URL computed by the host for this provider's route.
	pub callback_url: Option<Url>,
	/// Per-call configuration overrides.
	pub overrides: ConfigOverrides,
}
impl InboundRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a raw query string, with or without the leading `?`.
	pub fn from_query(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);

		Self {
			params: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
			..Default::default()
		}
	}

	/// Builds a request from the full URL the host received.
	///
	/// The URL without its query and fragment becomes the callback URL.
	pub fn from_url(url: &Url) -> Self {
		let mut callback_url = url.clone();

		callback_url.set_query(None);
		callback_url.set_fragment(None);

		Self {
			params: url.query_pairs().into_owned().collect(),
			callback_url: Some(callback_url),
			..Default::default()
		}
	}

	/// Sets the callback URL.
	pub fn with_callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Sets per-call configuration overrides.
	pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
		self.overrides = overrides;

		self
	}

	/// Adds or replaces a parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Raw parameter lookup.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.get(key).map(String::as_str)
	}

	/// Parameter lookup that treats empty values as absent.
	pub fn non_empty_param(&self, key: &str) -> Option<&str> {
		self.param(key).filter(|value| !value.is_empty())
	}
}

/// Redirect the host must issue at the end of the request phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
	/// HTTP status; always `302 Found`.
	pub status: u16,
	/// Provider authorization URL.
	pub location: Url,
}
impl Redirect {
	/// HTTP status used for authorization redirects.
	pub const FOUND: u16 = 302;

	/// Creates a `302 Found` redirect.
	pub fn found(location: Url) -> Self {
		Self { status: Self::FOUND, location }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{AuthFailure, ProviderId};

	#[test]
	fn completion_drops_stashed_payloads() {
		let mut exchange = Exchange::new();

		exchange.mark_requested();
		assert_eq!(exchange.phase(), Phase::RequestIssued);

		exchange.begin_callback();
		exchange.stash_token(TokenSet::builder().access_token("tok").build());
		exchange.stash_userinfo(UserInfo::default());
		assert!(exchange.token().is_some());

		let failure = AuthFailure::single(
			ProviderId::new("demo").expect("Provider fixture should be valid."),
			"access_denied",
			"",
		);

		exchange.complete(&Completion::Failure(failure));

		assert_eq!(exchange.phase(), Phase::Completed(Outcome::Failure));
		assert!(exchange.token().is_none());
		assert!(exchange.userinfo().is_none());
		assert!(exchange.is_completed());

		exchange.reset();

		assert_eq!(exchange.phase(), Phase::Idle);
	}

	#[test]
	fn requests_parse_queries_and_urls() {
		let request = InboundRequest::from_query("?code=abc123&state=xyz&scope=a+b&error=");

		assert_eq!(request.param("code"), Some("abc123"));
		assert_eq!(request.param("scope"), Some("a b"));
		assert_eq!(request.param("error"), Some(""));
		assert_eq!(request.non_empty_param("error"), None);

		let url = Url::parse("https://app.example.com/auth/rc/callback?code=c1#frag")
			.expect("URL fixture should parse.");
		let request = InboundRequest::from_url(&url);

		assert_eq!(request.param("code"), Some("c1"));
		assert_eq!(
			request.callback_url.as_ref().map(Url::as_str),
			Some("https://app.example.com/auth/rc/callback")
		);
	}
}
