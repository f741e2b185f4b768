// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret, IdentifierError, ProviderId},
	provider::{
		Endpoint, ProviderConfig, ProviderEndpoints, ProviderQuirks, TokenMethod, config,
		presets::{self, Preset},
	},
};

/// Errors raised while constructing or validating provider configs.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// Authorization endpoint is required.
	#[error("Missing authorize endpoint.")]
	MissingAuthorizeEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Userinfo mode `fetch` needs a userinfo endpoint.
	#[error("Provider fetches userinfo but has no userinfo endpoint.")]
	MissingUserInfoEndpoint,
	/// An endpoint cannot be resolved into an absolute URL.
	#[error("The {endpoint} endpoint `{value}` is not a valid URL: {source}.")]
	InvalidEndpoint {
		/// Endpoint that failed validation.
		endpoint: Endpoint,
		/// Raw configured value.
		value: String,
		/// Underlying parsing failure.
		source: url::ParseError,
	},
	/// Client credentials are required at load time unless deferred.
	#[error("Missing {field}; set it or enable deferred credentials.")]
	MissingCredentials {
		/// Missing field label.
		field: &'static str,
	},
	/// Client identifier failed validation.
	#[error("Invalid client identifier: {0}")]
	InvalidClientId(#[source] IdentifierError),
	/// Scope delimiters must be printable.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// The uid field name cannot be empty.
	#[error("The uid field name cannot be empty.")]
	EmptyUidField,
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	/// Identifier for the config being constructed.
	pub id: ProviderId,
	/// Base URL for relative endpoints.
	pub site: Option<Url>,
	/// Authorization endpoint.
	pub authorize_url: Option<String>,
	/// Token endpoint.
	pub token_url: Option<String>,
	/// Userinfo endpoint.
	pub userinfo_url: Option<String>,
	/// Revocation endpoint.
	pub logout_url: Option<String>,
	/// Registered client identifier.
	pub client_id: Option<String>,
	/// Registered client secret.
	pub client_secret: Option<ClientSecret>,
	/// Fixed redirect URI.
	pub redirect_uri: Option<Url>,
	/// Code exchange HTTP method.
	pub token_method: TokenMethod,
	/// Fallback scope.
	pub default_scope: Option<String>,
	/// Provider capabilities.
	pub quirks: ProviderQuirks,
}
impl ProviderConfigBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			site: None,
			authorize_url: None,
			token_url: None,
			userinfo_url: None,
			logout_url: None,
			client_id: None,
			client_secret: None,
			redirect_uri: None,
			token_method: TokenMethod::default(),
			default_scope: None,
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the base URL for relative endpoints.
	pub fn site(mut self, url: Url) -> Self {
		self.site = Some(url);

		self
	}

	/// Sets the authorization endpoint (absolute or relative to the site).
	pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
		self.authorize_url = Some(url.into());

		self
	}

	/// Sets the token endpoint (absolute or relative to the site).
	pub fn token_url(mut self, url: impl Into<String>) -> Self {
		self.token_url = Some(url.into());

		self
	}

	/// Sets the userinfo endpoint (absolute or relative to the site).
	pub fn userinfo_url(mut self, url: impl Into<String>) -> Self {
		self.userinfo_url = Some(url.into());

		self
	}

	/// Sets the revocation endpoint (absolute or relative to the site).
	pub fn logout_url(mut self, url: impl Into<String>) -> Self {
		self.logout_url = Some(url.into());

		self
	}

	/// Sets both client credentials.
	pub fn client_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(ClientSecret::new(client_secret));

		self
	}

	/// Pins the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Overrides the code exchange HTTP method.
	pub fn token_method(mut self, method: TokenMethod) -> Self {
		self.token_method = method;

		self
	}

	/// Sets the fallback scope.
	pub fn default_scope(mut self, scope: impl Into<String>) -> Self {
		self.default_scope = Some(scope.into());

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let authorize = self.authorize_url.ok_or(ProviderConfigError::MissingAuthorizeEndpoint)?;
		let token = self.token_url.ok_or(ProviderConfigError::MissingTokenEndpoint)?;
		let endpoints = ProviderEndpoints {
			site: self.site,
			authorize,
			token,
			userinfo: self.userinfo_url,
			logout: self.logout_url,
		};
		let client_id = self
			.client_id
			.filter(|id| !id.is_empty())
			.map(ClientId::new)
			.transpose()
			.map_err(ProviderConfigError::InvalidClientId)?;
		let config = ProviderConfig {
			id: self.id,
			endpoints,
			client_id,
			client_secret: self.client_secret.filter(|secret| !secret.is_empty()),
			redirect_uri: self.redirect_uri,
			token_method: self.token_method,
			default_scope: self.default_scope.filter(|scope| !scope.is_empty()),
			quirks: self.quirks,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ProviderConfig {
	/// Validates invariants for the config.
	fn validate(&self) -> Result<(), ProviderConfigError> {
		if self.quirks.fetches_userinfo() && self.endpoints.userinfo.is_none() {
			return Err(ProviderConfigError::MissingUserInfoEndpoint);
		}
		if !self.quirks.defer_credentials {
			if self.client_id.is_none() {
				return Err(ProviderConfigError::MissingCredentials { field: "client_id" });
			}
			if self.client_secret.is_none() {
				return Err(ProviderConfigError::MissingCredentials { field: "client_secret" });
			}
		}

		for endpoint in [Endpoint::Authorize, Endpoint::Token, Endpoint::UserInfo, Endpoint::Logout]
		{
			validate_endpoint(&self.endpoints, endpoint)?;
		}

		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		if self.quirks.uid_field.is_empty() {
			return Err(ProviderConfigError::EmptyUidField);
		}

		Ok(())
	}
}

/// Serde-friendly provider settings, validated into a [`ProviderConfig`].
///
/// When [`preset`](Self::preset) is set, the preset's endpoints and quirks seed the config
/// and every other field present here overrides them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
	/// Ready-made provider template.
	pub preset: Option<Preset>,
	/// Base URL for relative endpoints.
	pub site: Option<Url>,
	/// Authorization endpoint.
	pub authorize_url: Option<String>,
	/// Token endpoint.
	pub token_url: Option<String>,
	/// Userinfo endpoint.
	pub userinfo_url: Option<String>,
	/// Revocation endpoint.
	pub logout_url: Option<String>,
	/// Registered client identifier.
	pub client_id: Option<String>,
	/// Registered client secret.
	pub client_secret: Option<ClientSecret>,
	/// Fixed redirect URI.
	pub redirect_uri: Option<Url>,
	/// Code exchange HTTP method.
	pub token_method: Option<TokenMethod>,
	/// Fallback scope.
	pub default_scope: Option<String>,
	/// Field holding the user identifier.
	pub uid_field: Option<String>,
	/// Scope separator.
	pub scope_delimiter: Option<char>,
	/// Complete quirk set; `uid_field` and `scope_delimiter` still win when both are set.
	pub quirks: Option<ProviderQuirks>,
}
impl ProviderSettings {
	/// Validates the settings into a config for `id`.
	pub fn into_config(self, id: ProviderId) -> Result<ProviderConfig, ProviderConfigError> {
		let mut builder = match self.preset {
			Some(preset) => presets::builder(preset, id),
			None => ProviderConfigBuilder::new(id),
		};

		if let Some(quirks) = self.quirks {
			builder.quirks = quirks;
		}
		if let Some(uid_field) = self.uid_field {
			builder.quirks.uid_field = uid_field;
		}
		if let Some(delimiter) = self.scope_delimiter {
			builder.quirks.scope_delimiter = delimiter;
		}

		builder.site = self.site.or(builder.site);
		builder.authorize_url = self.authorize_url.or(builder.authorize_url);
		builder.token_url = self.token_url.or(builder.token_url);
		builder.userinfo_url = self.userinfo_url.or(builder.userinfo_url);
		builder.logout_url = self.logout_url.or(builder.logout_url);
		builder.client_id = self.client_id.or(builder.client_id);
		builder.client_secret = self.client_secret.or(builder.client_secret);
		builder.redirect_uri = self.redirect_uri.or(builder.redirect_uri);
		builder.token_method = self.token_method.unwrap_or(builder.token_method);
		builder.default_scope = self.default_scope.or(builder.default_scope);

		builder.build()
	}
}

fn validate_endpoint(
	endpoints: &ProviderEndpoints,
	endpoint: Endpoint,
) -> Result<(), ProviderConfigError> {
	let Some(raw) = endpoints.raw(endpoint) else {
		return Ok(());
	};

	config::parse_endpoint(endpoints.site.as_ref(), raw).map(|_| ()).map_err(|source| {
		ProviderConfigError::InvalidEndpoint { endpoint, value: raw.to_owned(), source }
	})
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderConfigError> {
	if delimiter.is_control() {
		Err(ProviderConfigError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}
