//! Strategy-level error types shared across the OAuth client, flows, and providers.

// self
use crate::{_prelude::*, provider::Endpoint};

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Only [`Error::Config`] is fatal for the host; every other variant is an expected
/// provider-facing failure that the callback phase folds into an
/// [`AuthFailure`](crate::auth::AuthFailure).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure (timeouts, unparseable bodies).
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider rejected the access token (HTTP 401).
	#[error("The {endpoint} endpoint rejected the access token.")]
	Unauthorized {
		/// Endpoint that answered with 401.
		endpoint: Endpoint,
	},
	/// Provider answered with an unexpected HTTP status.
	#[error("The {endpoint} endpoint returned HTTP {status}: {message}.")]
	Provider {
		/// Endpoint that produced the response.
		endpoint: Endpoint,
		/// HTTP status code.
		status: u16,
		/// Body preview or summary.
		message: String,
	},
	/// Provider answered with an OAuth `error` instead of a token.
	#[error("Provider denied the request: {error}.")]
	Denied {
		/// OAuth `error` code.
		error: String,
		/// OAuth `error_description`, when supplied.
		description: Option<String>,
	},
}
impl Error {
	/// Classifies the error into the strategy taxonomy.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Configuration,
			Self::Transient(TransientError::ResponseParse { .. }) => ErrorKind::MalformedResponse,
			Self::Transient(TransientError::Endpoint { .. }) | Self::Transport(_) =>
				ErrorKind::Network,
			Self::Unauthorized { .. } => ErrorKind::Unauthorized,
			Self::Provider { .. } => ErrorKind::ProviderError,
			Self::Denied { .. } => ErrorKind::ProviderDenied,
		}
	}

	/// Returns `true` for errors that must stop the host instead of surfacing as a failure.
	pub fn is_fatal(&self) -> bool {
		matches!(self.kind(), ErrorKind::Configuration)
	}
}

/// Error taxonomy labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// Required configuration is missing or invalid.
	Configuration,
	/// Transport-level failure or timeout.
	Network,
	/// Provider response does not match the expected schema.
	MalformedResponse,
	/// Access token was rejected.
	Unauthorized,
	/// Provider answered with a non-success status.
	ProviderError,
	/// Provider answered with an OAuth error payload.
	ProviderDenied,
}
impl ErrorKind {
	/// Returns a stable snake_case label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Configuration => "configuration_error",
			Self::Network => "network",
			Self::MalformedResponse => "malformed_response",
			Self::Unauthorized => "unauthorized",
			Self::ProviderError => "provider_error",
			Self::ProviderDenied => "provider_denied",
		}
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider configuration failed validation.
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderConfigError),
	/// An endpoint cannot be resolved into an absolute URL.
	#[error("The {endpoint} endpoint `{value}` is not a valid URL.")]
	InvalidEndpoint {
		/// Endpoint being resolved.
		endpoint: Endpoint,
		/// Raw configured value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The provider has no URL configured for the endpoint.
	#[error("Provider `{provider}` does not configure a {endpoint} endpoint.")]
	MissingEndpoint {
		/// Provider identifier string.
		provider: String,
		/// Missing endpoint.
		endpoint: Endpoint,
	},
	/// Neither the provider nor the inbound request supplied a redirect URI.
	#[error("Redirect URI is not configured.")]
	MissingRedirectUri,
	/// Client credentials are missing or empty at call time.
	#[error("Provider `{provider}` is missing the {field}.")]
	MissingCredentials {
		/// Provider identifier string.
		provider: String,
		/// Missing field label.
		field: &'static str,
	},
	/// A per-call site override cannot be parsed.
	#[error("Site override is not a valid URL.")]
	InvalidSiteOverride {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry by the caller).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Transport reported a non-fatal problem (timeouts, unknown client errors).
	#[error("The {endpoint} endpoint call failed: {message}.")]
	Endpoint {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Response body could not be parsed into the expected JSON shape.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint that produced the body.
		endpoint: Endpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider: {source}.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider: {0}.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
