//! Provider configuration consumed by the OAuth client and the strategy.
//!
//! A [`ProviderConfig`] is validated once at startup and never mutated afterwards.
//! Multi-tenant hosts layer [`ConfigOverrides`] on top of it per call, which yields a
//! borrowed config when nothing is overridden and an owned copy otherwise.

/// Builder API and serde settings for provider configs.
pub mod builder;
/// Endpoint, grant, and token method labels.
pub mod endpoint;
/// Provider capability toggles.
pub mod quirks;

pub use builder::*;
pub use endpoint::*;
pub use quirks::*;

// std
use std::borrow::Cow;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret, ProviderId},
	error::ConfigError,
};

/// Endpoint set declared by a provider.
///
/// Each endpoint is either an absolute URL or a path resolved against [`site`](Self::site)
/// when the endpoint is used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Base URL for relative endpoints.
	pub site: Option<Url>,
	/// Authorization endpoint.
	pub authorize: String,
	/// Token endpoint.
	pub token: String,
	/// Userinfo endpoint.
	pub userinfo: Option<String>,
	/// Revocation endpoint used on logout.
	pub logout: Option<String>,
}
impl ProviderEndpoints {
	/// Returns the raw configured value for `endpoint`.
	pub fn raw(&self, endpoint: Endpoint) -> Option<&str> {
		match endpoint {
			Endpoint::Authorize => Some(&self.authorize),
			Endpoint::Token => Some(&self.token),
			Endpoint::UserInfo => self.userinfo.as_deref(),
			Endpoint::Logout => self.logout.as_deref(),
		}
	}
}

/// Immutable provider configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Provider identifier.
	pub id: ProviderId,
	/// Provider endpoints.
	pub endpoints: ProviderEndpoints,
	/// Registered client identifier; may be absent when credentials are deferred.
	pub client_id: Option<ClientId>,
	/// Registered client secret; may be absent when credentials are deferred.
	pub client_secret: Option<ClientSecret>,
	/// Fixed redirect URI; the inbound callback URL is used when absent.
	pub redirect_uri: Option<Url>,
	/// HTTP method for the code exchange.
	pub token_method: TokenMethod,
	/// Scope requested when the inbound request does not name one.
	pub default_scope: Option<String>,
	/// Provider capabilities.
	pub quirks: ProviderQuirks,
}
impl ProviderConfig {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(id)
	}

	/// Resolves `endpoint` into an absolute URL.
	pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, ConfigError> {
		let raw = self.endpoints.raw(endpoint).ok_or_else(|| ConfigError::MissingEndpoint {
			provider: self.id.to_string(),
			endpoint,
		})?;

		resolve_endpoint(self.endpoints.site.as_ref(), endpoint, raw)
	}

	/// Returns the client identifier or a configuration error when it is absent.
	pub fn client_id(&self) -> Result<&ClientId, ConfigError> {
		self.client_id.as_ref().ok_or_else(|| ConfigError::MissingCredentials {
			provider: self.id.to_string(),
			field: "client_id",
		})
	}

	/// Returns the client secret or a configuration error when it is absent or empty.
	pub fn client_secret(&self) -> Result<&ClientSecret, ConfigError> {
		self.client_secret.as_ref().filter(|secret| !secret.is_empty()).ok_or_else(|| {
			ConfigError::MissingCredentials {
				provider: self.id.to_string(),
				field: "client_secret",
			}
		})
	}

	/// Applies per-call overrides without touching `self`.
	pub fn with_overrides(
		&self,
		overrides: &ConfigOverrides,
	) -> Result<Cow<'_, Self>, ConfigError> {
		if overrides.is_empty() {
			return Ok(Cow::Borrowed(self));
		}

		let mut config = self.clone();

		if let Some(client_id) = overrides.client_id.as_deref() {
			config.client_id =
				Some(ClientId::new(client_id).map_err(ProviderConfigError::InvalidClientId)?);
		}
		if let Some(client_secret) = overrides.client_secret.as_ref() {
			config.client_secret = Some(client_secret.clone());
		}
		if let Some(site) = overrides.site.as_deref() {
			let site =
				Url::parse(site).map_err(|source| ConfigError::InvalidSiteOverride { source })?;

			config.endpoints.site = Some(site);
		}

		Ok(Cow::Owned(config))
	}
}

/// Per-call configuration overrides for multi-tenant hosts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
	/// Replacement client identifier.
	pub client_id: Option<String>,
	/// Replacement client secret.
	pub client_secret: Option<ClientSecret>,
	/// Replacement base URL for relative endpoints.
	pub site: Option<String>,
}
impl ConfigOverrides {
	/// Returns `true` when no field is overridden.
	pub fn is_empty(&self) -> bool {
		self.client_id.is_none() && self.client_secret.is_none() && self.site.is_none()
	}

	/// Overrides the client credentials.
	pub fn with_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(ClientSecret::new(client_secret));

		self
	}

	/// Overrides the base URL.
	pub fn with_site(mut self, site: impl Into<String>) -> Self {
		self.site = Some(site.into());

		self
	}
}

pub(crate) fn resolve_endpoint(
	site: Option<&Url>,
	endpoint: Endpoint,
	raw: &str,
) -> Result<Url, ConfigError> {
	parse_endpoint(site, raw).map_err(|source| ConfigError::InvalidEndpoint {
		endpoint,
		value: raw.to_owned(),
		source,
	})
}

pub(crate) fn parse_endpoint(site: Option<&Url>, raw: &str) -> Result<Url, url::ParseError> {
	match (Url::parse(raw), site) {
		(Err(url::ParseError::RelativeUrlWithoutBase), Some(site)) => site.join(raw),
		(parsed, _) => parsed,
	}
}
