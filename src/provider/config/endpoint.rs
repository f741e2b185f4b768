// self
use crate::_prelude::*;

/// Provider endpoints the strategy talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
	/// Authorization endpoint users are redirected to.
	Authorize,
	/// Token endpoint used for code exchanges and refreshes.
	Token,
	/// Profile endpoint queried after the exchange.
	UserInfo,
	/// Token revocation endpoint used on logout.
	Logout,
}
impl Endpoint {
	/// Returns a stable label suitable for messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Authorize => "authorize",
			Endpoint::Token => "token",
			Endpoint::UserInfo => "userinfo",
			Endpoint::Logout => "logout",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// OAuth 2.0 grant types sent to the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// HTTP method used for the authorization-code exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMethod {
	/// Parameters travel in the query string.
	#[serde(alias = "GET")]
	Get,
	/// Parameters travel in a form-encoded body.
	#[default]
	#[serde(alias = "POST")]
	Post,
}
