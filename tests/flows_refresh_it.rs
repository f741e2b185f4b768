#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_strategy::{
	_preludet::*,
	auth::{TokenSecret, TokenSet},
	error::{ConfigError, Error, ErrorKind},
	flows::ReqwestStrategy,
	normalize::REFRESH_TOKEN_EXPIRES_AT,
	provider::{ConfigOverrides, ProviderConfig, ProviderQuirks, UserInfoMode},
};

fn refresh_config(server: &MockServer) -> ProviderConfig {
	test_config_builder("mock-refresh", &server.base_url())
		.quirks(ProviderQuirks {
			userinfo: UserInfoMode::Skip,
			refresh_expires_field: Some("refresh_token_expires_in".into()),
			..Default::default()
		})
		.build()
		.expect("Refresh config should build.")
}

fn build_strategy(server: &MockServer) -> ReqwestStrategy {
	build_reqwest_test_strategy(refresh_config(server))
}

#[tokio::test]
async fn refresh_rotates_tokens() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"bearer\",\"expires_in\":1800,\"refresh_token_expires_in\":86400,\"scope\":\"read write\"}",
				);
		})
		.await;
	let before = OffsetDateTime::now_utc();
	let credentials = strategy
		.refresh(&TokenSecret::new("refresh-old"), &ConfigOverrides::default())
		.await
		.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(credentials.token.expose(), "access-new");
	assert_eq!(
		credentials.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("refresh-new")
	);
	assert!(credentials.expires);
	assert!(credentials.expires_at.is_some_and(|at| at > before));
	assert_eq!(credentials.scopes.as_slice(), ["read", "write"]);
	assert!(credentials.other.contains_key(REFRESH_TOKEN_EXPIRES_AT));
}

#[tokio::test]
async fn refresh_keeps_the_presented_token_when_not_rotated() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-only\"}");
		})
		.await;
	let credentials = strategy
		.refresh(&TokenSecret::new("refresh-keep"), &ConfigOverrides::default())
		.await
		.expect("Refresh should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(credentials.token.expose(), "access-only");
	assert_eq!(
		credentials.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("refresh-keep")
	);
	assert!(!credentials.expires);
}

#[tokio::test]
async fn refresh_surfaces_denied_grants() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"revoked\"}");
		})
		.await;
	let err = strategy
		.refresh(&TokenSecret::new("refresh-revoked"), &ConfigOverrides::default())
		.await
		.expect_err("Revoked refresh tokens should fail.");

	mock.assert_async().await;

	match err {
		Error::Denied { error, description } => {
			assert_eq!(error, "invalid_grant");
			assert_eq!(description.as_deref(), Some("revoked"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn refresh_rejects_non_token_bodies() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "text/html").body("<html>maintenance</html>");
		})
		.await;
	let err = strategy
		.refresh(&TokenSecret::new("refresh-html"), &ConfigOverrides::default())
		.await
		.expect_err("HTML bodies are not token responses.");

	mock.assert_async().await;

	assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn default_transport_does_not_follow_token_redirects() {
	let server = MockServer::start_async().await;
	let strategy = ReqwestStrategy::with_reqwest(refresh_config(&server));
	let redirect = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(302).header("location", "/oauth/elsewhere");
		})
		.await;
	let elsewhere = server
		.mock_async(|when, then| {
			when.path("/oauth/elsewhere");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"hijacked\"}");
		})
		.await;
	let err = strategy
		.refresh(&TokenSecret::new("refresh-redirect"), &ConfigOverrides::default())
		.await
		.expect_err("Redirected token responses should not be followed.");

	redirect.assert_async().await;
	elsewhere.assert_calls_async(0).await;

	assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn logout_revokes_at_the_provider() {
	let server = MockServer::start_async().await;
	let strategy = build_strategy(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/revoke")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200);
		})
		.await;
	let token = TokenSet::builder().access_token("access").refresh_token("refresh").build();

	strategy
		.logout(&token, &ConfigOverrides::default())
		.await
		.expect("Logout should succeed.");

	mock.assert_async().await;

	let err = strategy
		.logout(&token, &ConfigOverrides::default().with_site("not a url"))
		.await
		.expect_err("Invalid site overrides should fail before any request.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidSiteOverride { .. })));

	mock.assert_calls_async(1).await;
}
