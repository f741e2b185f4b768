//! OAuth client operations performed against a [`ProviderConfig`].
//!
//! [`OAuthApi`] is the capability the strategy depends on: one pure URL builder plus four
//! network calls. [`OAuthClient`] implements it over any [`ProviderHttpClient`] and hand-builds
//! every request so that OAuth error bodies survive as [`TokenSet`] values instead of being
//! discarded by a generic token response type.

pub use oauth2;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use serde_json::{Map, Value};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::{TokenSecret, TokenSet, UserInfo},
	error::{ConfigError, TransientError, TransportError},
	http::{self, ProviderHttpClient, RequestHeaders, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{Endpoint, GrantType, ProviderConfig, TokenMethod},
};

/// Boxed future returned by [`OAuthApi`] network operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Provider-specific parameters appended to authorize and token requests.
pub type ExtraParams = BTreeMap<String, String>;

/// Client backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type ReqwestOAuthClient = OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Inputs for [`OAuthApi::authorize_url`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeParams {
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Requested scope; the config's default scope is used when absent or empty.
	pub scope: Option<String>,
	/// Opaque state, passed through unmodified.
	pub state: Option<String>,
	/// Provider-specific parameters such as a brand identifier.
	pub extra: ExtraParams,
}
impl AuthorizeParams {
	/// Creates params for `redirect_uri`.
	pub fn new(redirect_uri: Url) -> Self {
		Self { redirect_uri, scope: None, state: None, extra: ExtraParams::new() }
	}

	/// Sets the requested scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the opaque state.
	pub fn state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Adds a provider-specific parameter.
	pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}
}

/// OAuth operations required by the strategy.
///
/// Implementations never keep per-call state; every operation receives the config it
/// should act on, already adjusted for per-call overrides.
pub trait OAuthApi
where
	Self: 'static + Send + Sync,
{
	/// Builds the provider authorization URL. Never touches the network.
	///
	/// Parameters appear in a fixed order: `response_type=code`, `client_id`,
	/// `redirect_uri`, `scope`, `state`, then extras sorted by key.
	fn authorize_url(&self, config: &ProviderConfig, params: &AuthorizeParams) -> Result<Url> {
		build_authorize_url(config, params)
	}

	/// Exchanges an authorization code at the token endpoint.
	///
	/// The response body is parsed whatever the HTTP status; an OAuth error comes back as a
	/// token set without an access token.
	fn exchange_code<'a>(
		&'a self,
		config: &'a ProviderConfig,
		code: &'a str,
		redirect_uri: &'a Url,
		extra_params: &'a ExtraParams,
		headers: &'a RequestHeaders,
	) -> ApiFuture<'a, TokenSet>;

	/// Redeems a refresh token at the token endpoint.
	fn refresh<'a>(
		&'a self,
		config: &'a ProviderConfig,
		refresh_token: &'a TokenSecret,
		headers: &'a RequestHeaders,
	) -> ApiFuture<'a, TokenSet>;

	/// Fetches the userinfo object for `access_token`.
	fn fetch_userinfo<'a>(
		&'a self,
		config: &'a ProviderConfig,
		access_token: &'a TokenSecret,
	) -> ApiFuture<'a, UserInfo>;

	/// Revokes the token set at the logout endpoint.
	fn logout<'a>(&'a self, config: &'a ProviderConfig, token: &'a TokenSet) -> ApiFuture<'a, ()>;
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(endpoint, meta, message),
			_ => map_unknown_transport_error(endpoint, meta),
		}
	}
}

/// [`OAuthApi`] implementation over a pluggable HTTP transport.
pub struct OAuthClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> OAuthClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client from a transport and its error mapper.
	pub fn new(http_client: impl Into<Arc<C>>, error_mapper: impl Into<Arc<M>>) -> Self {
		Self { http_client: http_client.into(), error_mapper: error_mapper.into() }
	}

	async fn send(&self, endpoint: Endpoint, request: HttpRequest) -> Result<HttpResponse> {
		let slot = ResponseMetadataSlot::default();
		let handle = self.http_client.with_metadata(slot.clone());

		handle.call(request).await.map_err(|err| {
			self.error_mapper.map_transport_error(endpoint, slot.take().as_ref(), err)
		})
	}
}
#[cfg(feature = "reqwest")]
impl OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client over an existing reqwest transport.
	pub fn with_reqwest(http_client: ReqwestHttpClient) -> Self {
		Self::new(http_client, ReqwestTransportErrorMapper)
	}
}
#[cfg(feature = "reqwest")]
impl Default for OAuthClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::with_reqwest(ReqwestHttpClient::default())
	}
}
impl<C, M> Clone for OAuthClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			error_mapper: Arc::clone(&self.error_mapper),
		}
	}
}
impl<C, M> Debug for OAuthClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OAuthClient(..)")
	}
}
impl<C, M> OAuthApi for OAuthClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn exchange_code<'a>(
		&'a self,
		config: &'a ProviderConfig,
		code: &'a str,
		redirect_uri: &'a Url,
		extra_params: &'a ExtraParams,
		headers: &'a RequestHeaders,
	) -> ApiFuture<'a, TokenSet> {
		observed(FlowKind::TokenExchange, "exchange_code", async move {
			let url = config.endpoint_url(Endpoint::Token)?;
			let client_id = config.client_id()?;
			let client_secret = config.client_secret()?;
			let mut params = vec![
				("client_id", client_id.as_ref()),
				("client_secret", client_secret.expose()),
				("grant_type", GrantType::AuthorizationCode.as_str()),
				("code", code),
				("redirect_uri", redirect_uri.as_str()),
			];

			params.extend(extra_params.iter().map(|(key, value)| (key.as_str(), value.as_str())));

			let request = match config.token_method {
				TokenMethod::Post => http::form_request(&url, &params, headers)?,
				TokenMethod::Get => http::query_request(&url, &params, headers)?,
			};
			let response = self.send(Endpoint::Token, request).await?;

			parse_token_response(config, &response)
		})
	}

	fn refresh<'a>(
		&'a self,
		config: &'a ProviderConfig,
		refresh_token: &'a TokenSecret,
		headers: &'a RequestHeaders,
	) -> ApiFuture<'a, TokenSet> {
		observed(FlowKind::Refresh, "refresh", async move {
			let url = config.endpoint_url(Endpoint::Token)?;
			let client_id = config.client_id()?;
			let client_secret = config.client_secret()?;
			let params = [
				("client_id", client_id.as_ref()),
				("client_secret", client_secret.expose()),
				("refresh_token", refresh_token.expose()),
				("grant_type", GrantType::RefreshToken.as_str()),
			];
			let request = http::form_request(&url, &params, headers)?;
			let response = self.send(Endpoint::Token, request).await?;

			parse_token_response(config, &response)
		})
	}

	fn fetch_userinfo<'a>(
		&'a self,
		config: &'a ProviderConfig,
		access_token: &'a TokenSecret,
	) -> ApiFuture<'a, UserInfo> {
		observed(FlowKind::UserInfo, "fetch_userinfo", async move {
			let mut url = config.endpoint_url(Endpoint::UserInfo)?;

			if config.quirks.userinfo_token_in_query {
				url.query_pairs_mut().append_pair("access_token", access_token.expose());
			}

			let request = http::bearer_request(&url, access_token.expose())?;
			let response = self.send(Endpoint::UserInfo, request).await?;
			let status = response.status().as_u16();

			match status {
				401 => Err(Error::Unauthorized { endpoint: Endpoint::UserInfo }),
				200..=399 => parse_userinfo_response(&response),
				_ => Err(Error::Provider {
					endpoint: Endpoint::UserInfo,
					status,
					message: http::body_preview(response.body()),
				}),
			}
		})
	}

	fn logout<'a>(&'a self, config: &'a ProviderConfig, token: &'a TokenSet) -> ApiFuture<'a, ()> {
		observed(FlowKind::Logout, "logout", async move {
			let url = config.endpoint_url(Endpoint::Logout)?;
			let client_id = config.client_id()?;
			let client_secret = config.client_secret()?;
			let mut params =
				vec![("client_id", client_id.as_ref()), ("client_secret", client_secret.expose())];

			if let Some(refresh_token) = token.refresh_token.as_ref() {
				params.push(("refresh_token", refresh_token.expose()));
			}

			let request = http::form_request(&url, &params, &RequestHeaders::new())?;
			let response = self.send(Endpoint::Logout, request).await?;

			if response.status().is_success() {
				Ok(())
			} else {
				Err(Error::Provider {
					endpoint: Endpoint::Logout,
					status: response.status().as_u16(),
					message: http::body_preview(response.body()),
				})
			}
		})
	}
}

/// Builds the authorization URL for `config`.
pub fn build_authorize_url(config: &ProviderConfig, params: &AuthorizeParams) -> Result<Url> {
	let _guard = FlowSpan::new(FlowKind::Request, "authorize_url").entered();
	let mut url = config.endpoint_url(Endpoint::Authorize)?;
	let client_id = config.client_id()?;

	config.client_secret()?;

	let scope = params
		.scope
		.as_deref()
		.filter(|scope| !scope.is_empty())
		.or(config.default_scope.as_deref());

	{
		let mut query = url.query_pairs_mut();

		query
			.append_pair("response_type", "code")
			.append_pair("client_id", client_id.as_ref())
			.append_pair("redirect_uri", params.redirect_uri.as_str());

		if let Some(scope) = scope {
			query.append_pair("scope", scope);
		}
		if let Some(state) = params.state.as_deref() {
			query.append_pair("state", state);
		}

		query.extend_pairs(params.extra.iter());
	}

	Ok(url)
}

fn observed<'a, T, F>(kind: FlowKind, stage: &'static str, fut: F) -> ApiFuture<'a, T>
where
	T: 'a + Send,
	F: 'a + Send + Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	Box::pin(span.instrument(async move {
		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = fut.await;

		obs::record_result(kind, &result);

		result
	}))
}

fn parse_token_response(config: &ProviderConfig, response: &HttpResponse) -> Result<TokenSet> {
	TokenSet::parse(
		response.body(),
		OffsetDateTime::now_utc(),
		config.quirks.refresh_expires_field.as_deref(),
	)
	.map_err(|source| {
		TransientError::ResponseParse {
			endpoint: Endpoint::Token,
			source,
			status: Some(response.status().as_u16()),
		}
		.into()
	})
}

fn parse_userinfo_response(response: &HttpResponse) -> Result<UserInfo> {
	let mut de = serde_json::Deserializer::from_slice(response.body());
	let fields: Map<String, Value> =
		serde_path_to_error::deserialize(&mut de).map_err(|source| {
			TransientError::ResponseParse {
				endpoint: Endpoint::UserInfo,
				source,
				status: Some(response.status().as_u16()),
			}
		})?;

	Ok(UserInfo::new(fields))
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	endpoint: Endpoint,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::Endpoint {
			endpoint,
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	endpoint: Endpoint,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransientError::Endpoint {
		endpoint,
		message: format!("HTTP client error: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(endpoint: Endpoint, meta: Option<&ResponseMetadata>) -> Error {
	TransientError::Endpoint {
		endpoint,
		message: "unknown HTTP client error".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(feature = "reqwest")]
fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
