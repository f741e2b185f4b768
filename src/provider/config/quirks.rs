// self
use crate::_prelude::*;

/// Whether the callback phase queries the provider's userinfo endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInfoMode {
	/// Identity comes from the token response alone.
	Skip,
	/// Identity comes from a profile call made with the fresh access token.
	#[default]
	Fetch,
}

/// Provider-specific capabilities that steer the generic strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Userinfo behavior after the code exchange.
	pub userinfo: UserInfoMode,
	/// Character separating scopes in the `scope` parameter and token responses.
	pub scope_delimiter: char,
	/// Field holding the user identifier, read from userinfo when fetched, else from the
	/// token response.
	pub uid_field: String,
	/// Inbound request parameters forwarded verbatim to the authorize URL.
	pub passthrough_params: Vec<String>,
	/// Token response field carrying the refresh token lifetime in seconds.
	pub refresh_expires_field: Option<String>,
	/// Userinfo field listing the user's entitlements.
	pub entitlements_field: Option<String>,
	/// Also send the access token as an `access_token` query parameter to userinfo.
	pub userinfo_token_in_query: bool,
	/// Client credentials may be absent at load time and supplied per call instead.
	pub defer_credentials: bool,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			userinfo: UserInfoMode::default(),
			scope_delimiter: ' ',
			uid_field: "sub".into(),
			passthrough_params: Vec::new(),
			refresh_expires_field: None,
			entitlements_field: None,
			userinfo_token_in_query: false,
			defer_credentials: false,
		}
	}
}
impl ProviderQuirks {
	/// Returns `true` when the callback phase should call the userinfo endpoint.
	pub fn fetches_userinfo(&self) -> bool {
		matches!(self.userinfo, UserInfoMode::Fetch)
	}
}
