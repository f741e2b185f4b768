//! Ready-made configurations for common provider shapes.
//!
//! Presets only seed a [`ProviderConfigBuilder`]; callers still supply credentials and may
//! override any endpoint before building.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ProviderConfigBuilder, ProviderQuirks, UserInfoMode},
};

/// Production RingCentral platform.
pub const RINGCENTRAL_SITE: &str = "https://platform.ringcentral.com";

/// Named provider templates selectable from settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
	/// RingCentral-style provider: identity comes from the token response.
	#[serde(alias = "ring_central")]
	Ringcentral,
	/// OpenID-Connect-style provider: identity comes from the userinfo endpoint.
	#[serde(alias = "oidc")]
	OpenidConnect,
}

/// Returns a builder seeded with `preset`.
pub fn builder(preset: Preset, id: ProviderId) -> ProviderConfigBuilder {
	match preset {
		Preset::Ringcentral => ringcentral(id),
		Preset::OpenidConnect => openid_connect(id),
	}
}

/// RingCentral-style provider.
///
/// No userinfo call; the uid is the token response's `owner_id`, the `brand_id` request
/// parameter is forwarded to the authorize URL, and credentials may be supplied per call.
pub fn ringcentral(id: ProviderId) -> ProviderConfigBuilder {
	let mut builder = ProviderConfigBuilder::new(id)
		.authorize_url("/restapi/oauth/authorize")
		.token_url("/restapi/oauth/token")
		.logout_url("/restapi/oauth/revoke")
		.quirks(ProviderQuirks {
			userinfo: UserInfoMode::Skip,
			uid_field: "owner_id".into(),
			passthrough_params: vec!["brand_id".into()],
			refresh_expires_field: Some("refresh_token_expires_in".into()),
			defer_credentials: true,
			..Default::default()
		});

	builder.site = Url::parse(RINGCENTRAL_SITE).ok();

	builder
}

/// OpenID-Connect-style provider.
///
/// Endpoints are deployment specific and must be set on the returned builder.
pub fn openid_connect(id: ProviderId) -> ProviderConfigBuilder {
	ProviderConfigBuilder::new(id).default_scope("openid profile email").quirks(ProviderQuirks {
		userinfo: UserInfoMode::Fetch,
		uid_field: "sub".into(),
		refresh_expires_field: Some("refresh_expires_in".into()),
		entitlements_field: Some("entitlements".into()),
		..Default::default()
	})
}
