//! Callback phase: exchange the returned code and normalize the outcome.

// self
use crate::{
	_prelude::*,
	auth::{AuthFailure, Completion, FailureEntry, TokenSet},
	flows::{self, Exchange, InboundRequest, Strategy},
	normalize,
	oauth::{ExtraParams, OAuthApi},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderConfig,
};

const NO_CODE_MESSAGE: &str = "No code received";
const INVALID_RESPONSE: &str = "invalid_response";
const MISSING_ACCESS_TOKEN: &str = "Token endpoint response is missing access_token.";
const UNAUTHORIZED: &str = "unauthorized";

impl<A> Strategy<A>
where
	A: ?Sized + OAuthApi,
{
	/// Handles the provider's redirect back to the host.
	///
	/// A `code` parameter triggers the token exchange, then a userinfo fetch for providers
	/// that need one. Without a code, a provider `error` becomes the failure kind, and with
	/// neither the failure is `missing_code`; no network call is made in both cases.
	///
	/// Provider, transport, and parse failures are reported through
	/// [`Completion::Failure`]. Only configuration errors are returned as `Err`, in which case
	/// the exchange is reset.
	pub async fn callback_phase(
		&self,
		exchange: &mut Exchange,
		request: &InboundRequest,
	) -> Result<Completion> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "callback_phase");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		exchange.begin_callback();

		let result = span.instrument(self.run_callback(exchange, request)).await;

		match &result {
			Ok(completion) => {
				exchange.complete(completion);
				obs::record_completion(completion);

				if let Completion::Failure(failure) = completion {
					obs::record_failure_event(failure);
				}
			},
			Err(_) => {
				exchange.reset();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn run_callback(
		&self,
		exchange: &mut Exchange,
		request: &InboundRequest,
	) -> Result<Completion> {
		let config = self.effective_config(&request.overrides)?;

		if let Some(code) = request.non_empty_param("code") {
			return self.redeem_code(&config, exchange, request, code).await;
		}

		let completion = match request.non_empty_param("error") {
			Some(error) => {
				let description = request.param("error_description").unwrap_or_default();

				self.failure(error, description)
			},
			None => self.failure(FailureEntry::MISSING_CODE, NO_CODE_MESSAGE),
		};

		Ok(completion)
	}

	async fn redeem_code(
		&self,
		config: &ProviderConfig,
		exchange: &mut Exchange,
		request: &InboundRequest,
		code: &str,
	) -> Result<Completion> {
		let redirect_uri = flows::redirect_uri(config, request)?;
		let token = match self
			.api
			.exchange_code(config, code, &redirect_uri, &ExtraParams::new(), &self.token_headers)
			.await
		{
			Ok(token) => token,
			Err(e) if e.is_fatal() => return Err(e),
			Err(e) => return Ok(self.failure(FailureEntry::OAUTH2, e.to_string())),
		};
		let Some(access_token) = token.access_token.clone() else {
			return Ok(self.token_error(&token));
		};

		exchange.stash_token(token);

		if config.quirks.fetches_userinfo() {
			match self.api.fetch_userinfo(config, &access_token).await {
				Ok(userinfo) => exchange.stash_userinfo(userinfo),
				Err(Error::Unauthorized { .. }) =>
					return Ok(self.failure(FailureEntry::TOKEN, UNAUTHORIZED)),
				Err(e) if e.is_fatal() => return Err(e),
				Err(e) => return Ok(self.failure(FailureEntry::OAUTH2, e.to_string())),
			}
		}

		let result = exchange.token().and_then(|token| {
			normalize::auth_result(&config.id, &config.quirks, token, exchange.userinfo())
		});

		Ok(match result {
			Some(result) => Completion::Success(Box::new(result)),
			None => self.failure(INVALID_RESPONSE, MISSING_ACCESS_TOKEN),
		})
	}

	fn token_error(&self, token: &TokenSet) -> Completion {
		match token.error() {
			Some(error) => self.failure(error, token.error_description().unwrap_or_default()),
			None => self.failure(INVALID_RESPONSE, MISSING_ACCESS_TOKEN),
		}
	}

	fn failure(&self, kind: impl Into<String>, message: impl Into<String>) -> Completion {
		Completion::Failure(AuthFailure::single(self.config.id.clone(), kind, message))
	}
}
