//! Demonstrates the request phase: an OpenID-Connect-style provider turns an inbound request
//! into the `302` redirect the host must send back to the browser.

// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_strategy::{
	auth::ProviderId,
	flows::{Exchange, InboundRequest, ReqwestStrategy},
	provider::presets,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = presets::openid_connect(ProviderId::new("acme-id")?)
		.site(Url::parse("https://id.acme.example")?)
		.authorize_url("/oauth2/authorize")
		.token_url("/oauth2/token")
		.userinfo_url("/oauth2/userinfo")
		.client_credentials("demo-client", "demo-secret")
		.build()?;
	let strategy = ReqwestStrategy::with_reqwest(config);
	let inbound = Url::parse("https://app.example.com/auth/acme-id?state=demo-state")?;
	let request = InboundRequest::from_url(&inbound)
		.with_callback_url(Url::parse("https://app.example.com/auth/acme-id/callback")?);
	let mut exchange = Exchange::new();
	let redirect = strategy.request_phase(&mut exchange, &request)?;

	println!("HTTP {} Location: {}.", redirect.status, redirect.location);
	println!("Exchange is now {:?}.", exchange.phase());

	Ok(())
}
