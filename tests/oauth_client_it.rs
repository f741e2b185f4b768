#![cfg(feature = "reqwest")]

// self
use oauth2_strategy::{
	_preludet::*,
	auth::{TokenSecret, TokenSet},
	error::{ConfigError, Error, TransientError, TransportError},
	http::{ProviderHttpClient, RequestHeaders, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		ExtraParams, OAuthApi, OAuthClient, TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{Method, Response},
		},
	},
	provider::{Endpoint, ProviderConfig, ProviderQuirks, TokenMethod, UserInfoMode},
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Debug)]
enum Reply {
	Respond { status: u16, body: &'static str },
	Throttle(Duration),
}

/// Transport that records every request and answers with a canned reply.
#[derive(Clone)]
struct RecordingHttpClient {
	reply: Reply,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}
impl RecordingHttpClient {
	fn respond(status: u16, body: &'static str) -> Self {
		Self { reply: Reply::Respond { status, body }, requests: Default::default() }
	}

	fn throttled(retry_after: Duration) -> Self {
		Self { reply: Reply::Throttle(retry_after), requests: Default::default() }
	}

	fn only_request(&self) -> HttpRequest {
		let mut requests = self.requests.lock();

		assert_eq!(requests.len(), 1, "Exactly one request should be dispatched.");

		requests.remove(0)
	}
}
impl ProviderHttpClient for RecordingHttpClient {
	type Handle = RecordingHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		RecordingHandle { slot, client: self.clone() }
	}
}

struct RecordingHandle {
	slot: ResponseMetadataSlot,
	client: RecordingHttpClient,
}
impl<'a> AsyncHttpClient<'a> for RecordingHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let client = self.client.clone();

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			client.requests.lock().push(request);

			match client.reply {
				Reply::Respond { status, body } => {
					slot.store(ResponseMetadata { status: Some(status), retry_after: None });

					Response::builder()
						.status(status)
						.body(body.as_bytes().to_vec())
						.map_err(HttpClientError::Http)
				},
				Reply::Throttle(retry_after) => {
					slot.store(ResponseMetadata {
						status: Some(429),
						retry_after: Some(retry_after),
					});

					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
				},
			}
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<(Endpoint, Option<ResponseMetadata>)>>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);
		let retry_after = meta.and_then(|value| value.retry_after);

		self.metadata.lock().push((endpoint, meta.cloned()));

		match err {
			HttpClientError::Reqwest(inner) => TransientError::Endpoint {
				endpoint,
				message: format!("Fake transport error: {inner}"),
				status,
				retry_after,
			}
			.into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransientError::Endpoint {
				endpoint,
				message: format!("Unhandled HTTP client error: {other:?}"),
				status,
				retry_after,
			}
			.into(),
		}
	}
}

type FakeClient = OAuthClient<RecordingHttpClient, RecordingTransportErrorMapper>;

fn config(quirks: ProviderQuirks, token_method: TokenMethod) -> ProviderConfig {
	test_config_builder("mock-oauth", "https://idp.example.com")
		.token_method(token_method)
		.quirks(quirks)
		.build()
		.expect("OAuth client config should build.")
}

fn client(http: &RecordingHttpClient, mapper: &RecordingTransportErrorMapper) -> FakeClient {
	OAuthClient::new(http.clone(), mapper.clone())
}

fn body(request: &HttpRequest) -> HashMap<String, String> {
	url::form_urlencoded::parse(request.body()).into_owned().collect()
}

fn redirect_uri() -> Url {
	Url::parse("https://app.example.com/callback").expect("Redirect URI should parse.")
}

async fn exchange(api: &FakeClient, config: &ProviderConfig, code: &str) -> Result<TokenSet> {
	api.exchange_code(config, code, &redirect_uri(), &ExtraParams::new(), &RequestHeaders::new())
		.await
}

#[tokio::test]
async fn exchange_code_posts_form_with_extra_params_and_headers() {
	let http = RecordingHttpClient::respond(200, "{\"access_token\":\"tok\"}");
	let mapper = RecordingTransportErrorMapper::default();
	let api = client(&http, &mapper);
	let config = config(ProviderQuirks::default(), TokenMethod::Post);
	let extra = ExtraParams::from([("brand_id".to_owned(), "1210".to_owned())]);
	let headers = RequestHeaders::from([("x-request-id".to_owned(), "req-1".to_owned())]);
	let token = api
		.exchange_code(&config, "abc123", &redirect_uri(), &extra, &headers)
		.await
		.expect("Code exchange should succeed.");

	assert_eq!(token.access_token.as_ref().map(TokenSecret::expose), Some("tok"));

	let request = http.only_request();
	let form = body(&request);

	assert_eq!(request.method(), Method::POST);
	assert_eq!(request.uri().to_string(), "https://idp.example.com/oauth/token");
	assert_eq!(
		request.headers().get("x-request-id").and_then(|value| value.to_str().ok()),
		Some("req-1")
	);
	assert_eq!(form.get("grant_type"), Some(&"authorization_code".into()));
	assert_eq!(form.get("code"), Some(&"abc123".into()));
	assert_eq!(form.get("client_id"), Some(&TEST_CLIENT_ID.into()));
	assert_eq!(form.get("client_secret"), Some(&TEST_CLIENT_SECRET.into()));
	assert_eq!(form.get("redirect_uri"), Some(&"https://app.example.com/callback".into()));
	assert_eq!(form.get("brand_id"), Some(&"1210".into()));
}

#[tokio::test]
async fn exchange_code_honors_get_token_method() {
	let http = RecordingHttpClient::respond(200, "{\"access_token\":\"tok\"}");
	let mapper = RecordingTransportErrorMapper::default();
	let api = client(&http, &mapper);
	let config = config(ProviderQuirks::default(), TokenMethod::Get);

	exchange(&api, &config, "abc").await.expect("Code exchange should succeed.");

	let request = http.only_request();
	let url = Url::parse(&request.uri().to_string()).expect("Request URI should parse.");
	let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(request.method(), Method::GET);
	assert!(request.body().is_empty());
	assert_eq!(query.get("code"), Some(&"abc".into()));
	assert_eq!(query.get("grant_type"), Some(&"authorization_code".into()));
}

#[tokio::test]
async fn oauth_error_bodies_are_returned_as_token_sets() {
	let http = RecordingHttpClient::respond(
		400,
		"{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}",
	);
	let mapper = RecordingTransportErrorMapper::default();
	let api = client(&http, &mapper);
	let config = config(ProviderQuirks::default(), TokenMethod::Post);
	let token = exchange(&api, &config, "stale")
		.await
		.expect("OAuth error bodies should parse into token sets.");

	assert!(token.is_error());
	assert_eq!(token.error(), Some("invalid_grant"));
	assert_eq!(token.error_description(), Some("already used"));
}

#[tokio::test]
async fn refresh_sends_refresh_grant() {
	let http = RecordingHttpClient::respond(
		200,
		"{\"access_token\":\"tok2\",\"refresh_token\":\"ref2\",\"refresh_expires_in\":60}",
	);
	let mapper = RecordingTransportErrorMapper::default();
	let api = client(&http, &mapper);
	let quirks = ProviderQuirks {
		refresh_expires_field: Some("refresh_expires_in".into()),
		..Default::default()
	};
	let config = config(quirks, TokenMethod::Get);
	let token = api
		.refresh(&config, &TokenSecret::new("ref1"), &RequestHeaders::new())
		.await
		.expect("Refresh should succeed.");

	assert_eq!(token.refresh_token.as_ref().map(TokenSecret::expose), Some("ref2"));
	assert!(token.refresh_expires_at.is_some());

	let request = http.only_request();
	let form = body(&request);

	assert_eq!(request.method(), Method::POST, "Refresh always posts a form.");
	assert_eq!(form.get("grant_type"), Some(&"refresh_token".into()));
	assert_eq!(form.get("refresh_token"), Some(&"ref1".into()));
}

#[tokio::test]
async fn userinfo_can_carry_the_token_in_the_query() {
	let http = RecordingHttpClient::respond(200, "{\"sub\":\"user-1\"}");
	let mapper = RecordingTransportErrorMapper::default();
	let api = client(&http, &mapper);
	let quirks = ProviderQuirks { userinfo_token_in_query: true, ..Default::default() };
	let config = config(quirks, TokenMethod::Post);
	let userinfo = api
		.fetch_userinfo(&config, &TokenSecret::new("tok"))
		.await
		.expect("Userinfo should parse.");

	assert_eq!(userinfo.get_str("sub"), Some("user-1"));

	let request = http.only_request();

	assert_eq!(request.uri().to_string(), "https://idp.example.com/userinfo?access_token=tok");
	assert_eq!(
		request.headers().get("authorization").and_then(|value| value.to_str().ok()),
		Some("Bearer tok")
	);
}

#[tokio::test]
async fn userinfo_status_codes_are_classified() {
	let config = config(ProviderQuirks::default(), TokenMethod::Post);
	let mapper = RecordingTransportErrorMapper::default();
	let unauthorized = client(&RecordingHttpClient::respond(401, ""), &mapper)
		.fetch_userinfo(&config, &TokenSecret::new("tok"))
		.await
		.expect_err("401 should be rejected.");

	assert!(matches!(unauthorized, Error::Unauthorized { endpoint: Endpoint::UserInfo }));

	let server_error = client(&RecordingHttpClient::respond(503, "maintenance"), &mapper)
		.fetch_userinfo(&config, &TokenSecret::new("tok"))
		.await
		.expect_err("5xx should be a provider error.");

	match server_error {
		Error::Provider { endpoint, status, message } => {
			assert_eq!(endpoint, Endpoint::UserInfo);
			assert_eq!(status, 503);
			assert_eq!(message, "maintenance");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let malformed = client(&RecordingHttpClient::respond(200, "[1, 2]"), &mapper)
		.fetch_userinfo(&config, &TokenSecret::new("tok"))
		.await
		.expect_err("Non-object userinfo should be rejected.");

	assert!(matches!(
		malformed,
		Error::Transient(TransientError::ResponseParse { endpoint: Endpoint::UserInfo, .. })
	));
}

#[tokio::test]
async fn transport_failures_surface_metadata() {
	let http = RecordingHttpClient::throttled(Duration::seconds(5));
	let mapper = RecordingTransportErrorMapper::default();
	let api = client(&http, &mapper);
	let config = config(ProviderQuirks::default(), TokenMethod::Post);
	let err = exchange(&api, &config, "abc").await.expect_err("Throttled transport should fail.");

	match err {
		Error::Transient(TransientError::Endpoint { endpoint, status, retry_after, .. }) => {
			assert_eq!(endpoint, Endpoint::Token);
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(Duration::seconds(5)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	let recorded = mapper.metadata.lock().clone();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].0, Endpoint::Token);
	assert_eq!(recorded[0].1.as_ref().and_then(|meta| meta.status), Some(429));
}

#[tokio::test]
async fn logout_posts_refresh_token_and_checks_status() {
	let token = TokenSet::builder().access_token("tok").refresh_token("ref").build();
	let skip = ProviderQuirks { userinfo: UserInfoMode::Skip, ..Default::default() };
	let config = config(skip, TokenMethod::Post);
	let mapper = RecordingTransportErrorMapper::default();
	let http = RecordingHttpClient::respond(200, "");

	client(&http, &mapper).logout(&config, &token).await.expect("Logout should succeed.");

	let request = http.only_request();

	assert_eq!(request.uri().to_string(), "https://idp.example.com/oauth/revoke");
	assert_eq!(body(&request).get("refresh_token"), Some(&"ref".into()));

	let err = client(&RecordingHttpClient::respond(400, "{\"error\":\"invalid_token\"}"), &mapper)
		.logout(&config, &token)
		.await
		.expect_err("Rejected revocations should fail.");

	assert!(matches!(err, Error::Provider { endpoint: Endpoint::Logout, status: 400, .. }));
}
