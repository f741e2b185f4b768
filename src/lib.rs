//! Provider-agnostic OAuth 2.0 authorization-code strategy: build provider redirects,
//! exchange codes, fetch profiles, and normalize every provider into one canonical result.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod normalize;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use std::collections::HashMap;

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ProviderId,
		flows::ReqwestStrategy,
		http::ReqwestHttpClient,
		oauth::ReqwestOAuthClient,
		provider::{ProviderConfig, ProviderConfigBuilder},
	};

	/// Client identifier used by test configs.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret used by test configs.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";

	/// Builds a non-redirecting reqwest HTTP client that accepts the self-signed certificates
	/// produced by `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestHttpClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Seeds a config builder whose endpoints live under `base` (typically a mock server URL)
	/// and that carries the test client credentials.
	pub fn test_config_builder(id: &str, base: &str) -> ProviderConfigBuilder {
		let id = ProviderId::new(id).expect("Test provider identifier should be valid.");
		let site = Url::parse(base).expect("Test site should parse.");

		ProviderConfig::builder(id)
			.site(site)
			.authorize_url("/oauth/authorize")
			.token_url("/oauth/token")
			.userinfo_url("/userinfo")
			.logout_url("/oauth/revoke")
			.client_credentials(TEST_CLIENT_ID, TEST_CLIENT_SECRET)
	}

	/// Constructs a [`ReqwestStrategy`] for `config` over the insecure test transport.
	pub fn build_reqwest_test_strategy(config: ProviderConfig) -> ReqwestStrategy {
		ReqwestStrategy::new(config, ReqwestOAuthClient::with_reqwest(test_reqwest_http_client()))
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
