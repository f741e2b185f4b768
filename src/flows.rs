//! Strategy phases driving the authorization-code handshake.
//!
//! A [`Strategy`] pairs one immutable [`ProviderConfig`] with an [`OAuthApi`]
//! implementation. The host calls [`Strategy::request_phase`] to obtain the provider
//! redirect and [`Strategy::callback_phase`] when the provider sends the user back; both
//! record their progress on a host-owned [`Exchange`].

pub mod callback;
pub mod exchange;
pub mod refresh;
pub mod request;

pub use exchange::*;

// std
use std::borrow::Cow;
// self
#[cfg(feature = "reqwest")] use crate::oauth::ReqwestOAuthClient;
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	http::RequestHeaders,
	oauth::OAuthApi,
	provider::{ConfigOverrides, ProviderConfig},
};

/// Strategy specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestStrategy = Strategy<ReqwestOAuthClient>;

/// Generic authorization-code strategy for a single provider.
///
/// Provider differences live entirely in [`ProviderConfig::quirks`]; the strategy itself
/// keeps no per-request state and may be shared across concurrent requests.
pub struct Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	/// Static provider configuration.
	pub config: Arc<ProviderConfig>,
	/// OAuth operations used by every phase.
	pub api: Arc<A>,
	/// Extra headers sent with every token endpoint request.
	pub token_headers: RequestHeaders,
}
impl<A> Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	/// Creates a strategy over `config` using `api` for provider calls.
	pub fn new(config: impl Into<Arc<ProviderConfig>>, api: impl Into<Arc<A>>) -> Self {
		Self { config: config.into(), api: api.into(), token_headers: RequestHeaders::new() }
	}

	/// Adds a header to every token endpoint request.
	pub fn with_token_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.token_headers.insert(name.into(), value.into());

		self
	}

	/// Provider this strategy authenticates against.
	pub fn provider(&self) -> &ProviderId {
		&self.config.id
	}

	fn effective_config(&self, overrides: &ConfigOverrides) -> Result<Cow<'_, ProviderConfig>> {
		Ok(self.config.with_overrides(overrides)?)
	}
}
#[cfg(feature = "reqwest")]
impl Strategy<ReqwestOAuthClient> {
	/// Creates a strategy backed by a default reqwest client.
	pub fn with_reqwest(config: impl Into<Arc<ProviderConfig>>) -> Self {
		Self::new(config, ReqwestOAuthClient::default())
	}
}
impl<A> Clone for Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	fn clone(&self) -> Self {
		Self {
			config: Arc::clone(&self.config),
			api: Arc::clone(&self.api),
			token_headers: self.token_headers.clone(),
		}
	}
}
impl<A> Debug for Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Strategy")
			.field("provider", &self.config.id)
			.field("userinfo", &self.config.quirks.userinfo)
			.field("client_id_set", &self.config.client_id.is_some())
			.field("token_headers", &self.token_headers.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Picks the configured redirect URI, else the host-computed callback URL.
pub(crate) fn redirect_uri(config: &ProviderConfig, request: &InboundRequest) -> Result<Url> {
	config
		.redirect_uri
		.clone()
		.or_else(|| request.callback_url.clone())
		.ok_or_else(|| ConfigError::MissingRedirectUri.into())
}
