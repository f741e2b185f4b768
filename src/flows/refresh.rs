//! Token maintenance after authentication: refresh and logout.
//!
//! Neither operation touches an [`Exchange`](crate::flows::Exchange); both act on
//! credentials the host kept from an earlier callback.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret, TokenSet},
	flows::Strategy,
	normalize,
	oauth::OAuthApi,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ConfigOverrides,
};

impl<A> Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	/// Redeems `refresh_token` and returns fresh credentials.
	///
	/// When the provider does not rotate refresh tokens, the presented one is kept. An OAuth
	/// error body surfaces as [`Error::Denied`].
	pub async fn refresh(
		&self,
		refresh_token: &TokenSecret,
		overrides: &ConfigOverrides,
	) -> Result<Credentials> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "strategy_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.effective_config(overrides)?;
				let mut token =
					self.api.refresh(&config, refresh_token, &self.token_headers).await?;

				if token.refresh_token.is_none() {
					token.refresh_token = Some(refresh_token.clone());
				}

				// TODO: re-fetch userinfo after refresh so entitlements are not reported empty.
				normalize::to_credentials(&config.quirks, &token, None)
					.ok_or_else(|| denied(&token))
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Revokes `token` at the provider's logout endpoint.
	pub async fn logout(&self, token: &TokenSet, overrides: &ConfigOverrides) -> Result<()> {
		let config = self.effective_config(overrides)?;

		self.api.logout(&config, token).await
	}
}

fn denied(token: &TokenSet) -> Error {
	Error::Denied {
		error: token.error().unwrap_or("invalid_response").to_owned(),
		description: token.error_description().map(str::to_owned),
	}
}
