//! Transport primitives for provider calls.
//!
//! The module exposes [`ProviderHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can plug in custom HTTP clients
//! while keeping the error mapping consistent. Implementations call
//! [`ResponseMetadataSlot::take`] before dispatching a request and
//! [`ResponseMetadataSlot::store`] once an HTTP status or retry hint is known.
//! Request builders for the four provider endpoints live here too so every transport
//! sees identical wire formats.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use oauth2::HttpResponse;
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
#[cfg(feature = "reqwest")]
use reqwest::{
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
use url::form_urlencoded;
// self
use crate::{_prelude::*, error::ConfigError};

/// Abstraction over HTTP transports capable of calling provider endpoints while
/// publishing response metadata for error classification.
///
/// The trait is the crate's only dependency on an HTTP stack. The OAuth client holds an
/// implementation behind `Arc<T>` and requests a short-lived [`AsyncHttpClient`] handle per
/// call, each carrying a clone of a [`ResponseMetadataSlot`]. Handles must own whatever
/// state their request futures need so those futures stay `Send` while in flight.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	///
	/// The request future returned by [`AsyncHttpClient::call`] must be `Send` so the
	/// client's boxed futures inherit the same guarantee.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request.
	/// - Once an HTTP response (successful or erroneous) provides status headers, save them with
	///   [`ResponseMetadataSlot::store`].
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
///
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the provider, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The OAuth client creates a fresh slot for each provider call and reads it only when the
/// transport fails.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`], the default transport.
///
/// Token requests must not follow redirects: token endpoints answer directly, and a followed
/// `302` silently turns the form `POST` into a `GET`. Clients built here disable redirect
/// following; configure any custom [`ReqwestClient`] passed to
/// [`with_client`](Self::with_client) the same way. Timeouts and proxies are configured on the
/// wrapped client.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with a request timeout applied to every provider call.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		Ok(Self(Self::builder().timeout(timeout).build()?))
	}

	/// Returns a reqwest builder preconfigured to never follow redirects.
	pub fn builder() -> reqwest::ClientBuilder {
		ReqwestClient::builder().redirect(Policy::none())
	}

	/// Builds an instrumented HTTP client that captures response metadata.
	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
#[cfg(feature = "reqwest")]
impl Default for ReqwestHttpClient {
	fn default() -> Self {
		// Building only fails when the TLS backend cannot initialize, where `Client::new` panics.
		Self(Self::builder().build().unwrap_or_else(|_| ReqwestClient::new()))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
#[cfg(feature = "reqwest")]
impl InstrumentedHttpClient {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self { client, slot }
	}
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestHttpClient`] that satisfies [`ProviderHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient::new(client, slot)))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			client.slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}
}

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";
const PREVIEW_LEN: usize = 256;

/// Extra headers attached to token endpoint requests.
pub type RequestHeaders = BTreeMap<String, String>;

/// Builds a `POST` request carrying `params` as a form-encoded body.
pub fn form_request(
	url: &Url,
	params: &[(&str, &str)],
	headers: &RequestHeaders,
) -> Result<HttpRequest, ConfigError> {
	let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(params).finish();
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(ACCEPT, JSON)
		.header(CONTENT_TYPE, FORM);

	for (name, value) in headers {
		builder = builder.header(name.as_str(), value.as_str());
	}

	Ok(builder.body(body.into_bytes())?)
}

/// Builds a `GET` request carrying `params` in the query string.
pub fn query_request(
	url: &Url,
	params: &[(&str, &str)],
	headers: &RequestHeaders,
) -> Result<HttpRequest, ConfigError> {
	let mut url = url.clone();

	if !params.is_empty() {
		url.query_pairs_mut().extend_pairs(params);
	}

	let mut builder = Request::builder().method(Method::GET).uri(url.as_str()).header(ACCEPT, JSON);

	for (name, value) in headers {
		builder = builder.header(name.as_str(), value.as_str());
	}

	Ok(builder.body(Vec::new())?)
}

/// Builds a `GET` request authenticated with a bearer token.
pub fn bearer_request(url: &Url, token: &str) -> Result<HttpRequest, ConfigError> {
	Ok(Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(ACCEPT, JSON)
		.header(AUTHORIZATION, format!("Bearer {token}"))
		.body(Vec::new())?)
}

/// Renders the start of a response body for error messages.
pub fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let text = text.trim();

	match text.char_indices().nth(PREVIEW_LEN) {
		Some((cut, _)) => format!("{}...", &text[..cut]),
		None if text.is_empty() => "<empty body>".into(),
		None => text.to_owned(),
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
