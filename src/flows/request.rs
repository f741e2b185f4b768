//! Request phase: turn an inbound request into a provider redirect.

// self
use crate::{
	_prelude::*,
	flows::{self, Exchange, InboundRequest, Redirect, Strategy},
	oauth::{AuthorizeParams, OAuthApi},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderConfig,
};

impl<A> Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	/// Builds the redirect to the provider's authorization endpoint.
	///
	/// Reads `scope`, `state`, and the provider's passthrough parameters from the inbound
	/// request. Never contacts the provider; every error is a configuration error.
	pub fn request_phase(
		&self,
		exchange: &mut Exchange,
		request: &InboundRequest,
	) -> Result<Redirect> {
		const KIND: FlowKind = FlowKind::Request;

		let _guard = FlowSpan::new(KIND, "request_phase").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self
			.effective_config(&request.overrides)
			.and_then(|config| self.authorize_redirect(&config, request));

		obs::record_result(KIND, &result);

		if result.is_ok() {
			exchange.mark_requested();
		}

		result
	}

	fn authorize_redirect(
		&self,
		config: &ProviderConfig,
		request: &InboundRequest,
	) -> Result<Redirect> {
		let mut params = AuthorizeParams::new(flows::redirect_uri(config, request)?);

		params.scope = request.non_empty_param("scope").map(str::to_owned);
		params.state = request.param("state").map(str::to_owned);

		for key in &config.quirks.passthrough_params {
			if let Some(value) = request.non_empty_param(key) {
				params.extra.insert(key.clone(), value.to_owned());
			}
		}

		Ok(Redirect::found(self.api.authorize_url(config, &params)?))
	}
}
