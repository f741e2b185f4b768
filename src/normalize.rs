//! Maps raw token and userinfo payloads into the canonical result structures.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AuthResult, Credentials, Extra, Info, ProviderId, ScopeList, TokenSet, UserInfo},
	provider::ProviderQuirks,
};

/// Key under [`Credentials::other`] holding the refresh token expiry as a Unix timestamp.
pub const REFRESH_TOKEN_EXPIRES_AT: &str = "refresh_token_expires_at";
/// Key under [`Credentials::other`] holding the entitlement list.
pub const ENTITLEMENTS: &str = "entitlements";

const FIRST_NAME_KEYS: &[&str] = &["given_name", "first_name", "firstName"];
const LAST_NAME_KEYS: &[&str] = &["family_name", "last_name", "lastName"];
const NICKNAME_KEYS: &[&str] = &["preferred_username", "nickname", "username"];
const IMAGE_KEYS: &[&str] = &["picture", "avatar_url", "avatar"];
const PHONE_KEYS: &[&str] = &["phone_number", "phone"];
const DESCRIPTION_KEYS: &[&str] = &["bio", "description"];

/// Assembles a full [`AuthResult`]; `None` when the token set carries no access token.
pub fn auth_result(
	provider: &ProviderId,
	quirks: &ProviderQuirks,
	token: &TokenSet,
	userinfo: Option<&UserInfo>,
) -> Option<AuthResult> {
	Some(AuthResult {
		provider: provider.clone(),
		uid: uid(&quirks.uid_field, token, userinfo),
		credentials: to_credentials(quirks, token, userinfo)?,
		info: to_info(userinfo),
		extra: to_extra(token, userinfo),
	})
}

/// Reads the user identifier from userinfo when it was fetched and carries the field, else from
/// the token response.
///
/// Strings are returned verbatim; numbers and booleans are stringified.
pub fn uid(uid_field: &str, token: &TokenSet, userinfo: Option<&UserInfo>) -> Option<String> {
	let value = userinfo
		.and_then(|userinfo| userinfo.get(uid_field))
		.or_else(|| token.param(uid_field))?;

	match value {
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}

/// Builds credentials; `None` when the token set carries no access token.
pub fn to_credentials(
	quirks: &ProviderQuirks,
	token: &TokenSet,
	userinfo: Option<&UserInfo>,
) -> Option<Credentials> {
	let access_token = token.access_token.clone()?;
	let scopes = token
		.param("scope")
		.map(|value| ScopeList::from_value(value, quirks.scope_delimiter))
		.unwrap_or_default();
	let mut other = BTreeMap::new();

	if let Some(expires_at) = token.refresh_expires_at {
		other.insert(REFRESH_TOKEN_EXPIRES_AT.to_owned(), Value::from(expires_at.unix_timestamp()));
	}
	if let Some(field) = quirks.entitlements_field.as_deref() {
		let entitlements = userinfo
			.and_then(|userinfo| userinfo.get(field))
			.filter(|value| value.is_array())
			.cloned()
			.unwrap_or_else(|| Value::Array(Vec::new()));

		other.insert(ENTITLEMENTS.to_owned(), entitlements);
	}

	Some(Credentials {
		token: access_token,
		refresh_token: token.refresh_token.clone(),
		expires_at: token.expires_at,
		token_type: token.token_type.clone(),
		expires: token.expires(),
		scopes,
		other,
	})
}

/// Maps userinfo into canonical profile fields, trying each provider spelling in turn.
pub fn to_info(userinfo: Option<&UserInfo>) -> Info {
	let Some(userinfo) = userinfo else {
		return Info::default();
	};
	let pick = |keys: &[&str]| userinfo.first_str(keys).map(str::to_owned);

	Info {
		name: pick(&["name"]),
		first_name: pick(FIRST_NAME_KEYS),
		last_name: pick(LAST_NAME_KEYS),
		nickname: pick(NICKNAME_KEYS),
		email: pick(&["email"]),
		image: pick(IMAGE_KEYS),
		phone: pick(PHONE_KEYS),
		location: pick(&["location"]),
		description: pick(DESCRIPTION_KEYS),
	}
}

/// Keeps the raw payloads verbatim.
pub fn to_extra(token: &TokenSet, userinfo: Option<&UserInfo>) -> Extra {
	Extra { raw_token: token.clone(), raw_userinfo: userinfo.cloned() }
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{auth::TokenSecret, provider::UserInfoMode};

	fn userinfo(value: Value) -> UserInfo {
		UserInfo::try_from(value).expect("Userinfo fixture should be an object.")
	}

	#[test]
	fn uid_prefers_userinfo_and_stringifies() {
		let token = TokenSet::builder().access_token("tok").param("owner_id", 42).build();
		let info = userinfo(serde_json::json!({ "owner_id": "u-7", "active": true }));

		assert_eq!(uid("owner_id", &token, None).as_deref(), Some("42"));
		assert_eq!(uid("owner_id", &token, Some(&info)).as_deref(), Some("u-7"));
		assert_eq!(uid("active", &token, Some(&info)).as_deref(), Some("true"));
		assert_eq!(uid("missing", &token, Some(&info)), None);
	}

	#[test]
	fn uid_falls_back_to_token_when_userinfo_lacks_the_field() {
		let token = TokenSet::builder().access_token("tok").param("sub", "from-token").build();
		let info = userinfo(serde_json::json!({ "name": "Ada" }));

		assert_eq!(uid("sub", &token, Some(&info)).as_deref(), Some("from-token"));
	}

	#[test]
	fn credentials_follow_token_set() {
		let quirks = ProviderQuirks { scope_delimiter: ',', ..Default::default() };
		let token = TokenSet::builder()
			.access_token("tok1")
			.refresh_token("ref1")
			.token_type("bearer")
			.refresh_expires_at(macros::datetime!(2025-01-01 01:00 UTC))
			.param("scope", "profile,email")
			.build();
		let credentials = to_credentials(&quirks, &token, None).expect("Access token is present.");

		assert_eq!(credentials.token, TokenSecret::new("tok1"));
		assert_eq!(credentials.refresh_token, Some(TokenSecret::new("ref1")));
		assert!(!credentials.expires);
		assert_eq!(credentials.scopes, ScopeList::new(["profile", "email"]));
		assert_eq!(credentials.other[REFRESH_TOKEN_EXPIRES_AT], Value::from(1_735_693_200_i64));
		assert!(!credentials.other.contains_key(ENTITLEMENTS));
	}

	#[test]
	fn empty_scope_yields_no_scopes() {
		let token = TokenSet::builder().access_token("tok").param("scope", "").build();
		let credentials = to_credentials(&ProviderQuirks::default(), &token, None)
			.expect("Access token is present.");

		assert!(credentials.scopes.is_empty());
		assert!(to_credentials(&ProviderQuirks::default(), &TokenSet::builder().build(), None)
			.is_none());
	}

	#[test]
	fn entitlements_default_to_empty_list() {
		let quirks = ProviderQuirks {
			userinfo: UserInfoMode::Fetch,
			entitlements_field: Some("entitlements".into()),
			..Default::default()
		};
		let token = TokenSet::builder().access_token("tok").build();
		let info = userinfo(serde_json::json!({ "entitlements": ["admin", "billing"] }));
		let with_info =
			to_credentials(&quirks, &token, Some(&info)).expect("Access token is present.");
		let without_info = to_credentials(&quirks, &token, None).expect("Access token is present.");

		assert_eq!(with_info.other[ENTITLEMENTS], serde_json::json!(["admin", "billing"]));
		assert_eq!(without_info.other[ENTITLEMENTS], serde_json::json!([]));
	}

	#[test]
	fn info_uses_fallback_keys() {
		let info = to_info(Some(&userinfo(serde_json::json!({
			"name": "Jane Doe",
			"firstName": "Jane",
			"family_name": "Doe",
			"username": "jdoe",
			"avatar_url": "https://cdn.example.com/j.png",
			"phone": "+15550100",
			"bio": "",
			"description": "Engineer",
		}))));

		assert_eq!(info.name.as_deref(), Some("Jane Doe"));
		assert_eq!(info.first_name.as_deref(), Some("Jane"));
		assert_eq!(info.last_name.as_deref(), Some("Doe"));
		assert_eq!(info.nickname.as_deref(), Some("jdoe"));
		assert_eq!(info.image.as_deref(), Some("https://cdn.example.com/j.png"));
		assert_eq!(info.phone.as_deref(), Some("+15550100"));
		assert_eq!(info.description.as_deref(), Some("Engineer"));
		assert_eq!(info.email, None);
		assert_eq!(to_info(None), Info::default());
	}
}
