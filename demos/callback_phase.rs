//! Demonstrates the callback phase against a mock RingCentral-style provider whose client
//! credentials and site are supplied per request.

// crates.io
use color_eyre::{Result, eyre::eyre};
use httpmock::prelude::*;
// self
use oauth2_strategy::{
	auth::{Completion, ProviderId},
	flows::{Exchange, InboundRequest, ReqwestStrategy},
	provider::{ConfigOverrides, presets},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/restapi/oauth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"bearer\",\"expires_in\":3600,\"refresh_token_expires_in\":604800,\"scope\":\"ReadAccounts ReadCallLog\",\"owner_id\":\"400131\"}",
			);
		})
		.await;
	let config = presets::ringcentral(ProviderId::new("ringcentral")?).build()?;
	let strategy = ReqwestStrategy::with_reqwest(config);
	let overrides = ConfigOverrides::default()
		.with_credentials("demo-client", "demo-secret")
		.with_site(server.base_url());
	let callback =
		Url::parse("https://app.example.com/auth/ringcentral/callback?code=demo&state=s")?;
	let request = InboundRequest::from_url(&callback).with_overrides(overrides);
	let mut exchange = Exchange::new();

	match strategy.callback_phase(&mut exchange, &request).await? {
		Completion::Success(result) => {
			println!("Authenticated uid {:?} via {}.", result.uid, result.provider);
			println!("Granted scopes: {:?}.", result.credentials.scopes.as_slice());
		},
		Completion::Failure(failure) => return Err(eyre!("Authentication failed: {failure}.")),
	}

	token_mock.assert_async().await;

	Ok(())
}
