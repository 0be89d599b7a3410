//! Endpoint and timing configuration shared by fetchers and the query client.

// self
use crate::{_prelude::*, error::ConfigError};

/// Path of the one-time access token exchange.
pub const AUTH_TOKEN_PATH: &str = "/api/auth/token";
/// Path of the token refresh endpoint.
pub const AUTH_REFRESH_PATH: &str = "/api/auth/refresh";
/// Path of the Hasura GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/api/graphql-engine/v1/graphql";

/// Validated broker configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// HTTPS origin hosting the auth and GraphQL endpoints.
	pub base_url: Url,
	/// Lead time before `exp` at which a credential is treated as stale (never negative).
	pub pre_notify_window: Duration,
	/// Overall budget for a single HTTP request.
	pub request_timeout: Duration,
}
impl ClientConfig {
	/// Default lead time before expiry.
	pub const DEFAULT_PRE_NOTIFY_WINDOW: Duration = Duration::ZERO;
	/// Default request budget.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(60);

	/// Returns a builder rooted at `https://<domain>`.
	pub fn builder(domain: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(domain)
	}

	/// Builds a configuration for `domain` with default timings.
	pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
		Self::builder(domain).build()
	}

	/// Absolute URL of the access token exchange.
	pub fn auth_token_url(&self) -> Url {
		self.endpoint(AUTH_TOKEN_PATH)
	}

	/// Absolute URL of the refresh endpoint.
	pub fn auth_refresh_url(&self) -> Url {
		self.endpoint(AUTH_REFRESH_PATH)
	}

	/// Absolute URL of the GraphQL endpoint.
	pub fn graphql_url(&self) -> Url {
		self.endpoint(GRAPHQL_PATH)
	}

	/// Request timeout converted for transports built on `std::time`.
	pub fn request_timeout_std(&self) -> std::time::Duration {
		self.request_timeout.unsigned_abs()
	}

	fn endpoint(&self, path: &str) -> Url {
		let mut url = self.base_url.clone();

		url.set_path(path);
		url.set_query(None);

		url
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Bare domain (optionally with port) used when no base URL is supplied.
	pub domain: String,
	/// Explicit base URL overriding the domain.
	pub base_url: Option<Url>,
	/// Lead time before expiry.
	pub pre_notify_window: Duration,
	/// Request budget.
	pub request_timeout: Duration,
}
impl ClientConfigBuilder {
	/// Creates a new builder for `domain`.
	pub fn new(domain: impl Into<String>) -> Self {
		Self {
			domain: domain.into(),
			base_url: None,
			pre_notify_window: ClientConfig::DEFAULT_PRE_NOTIFY_WINDOW,
			request_timeout: ClientConfig::DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the origin, e.g. to target a mock server.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the pre-notify window; negative values clamp to zero.
	pub fn pre_notify_window(mut self, window: Duration) -> Self {
		self.pre_notify_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Overrides the request timeout; negative values clamp to zero.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = if timeout.is_negative() { Duration::ZERO } else { timeout };

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let base_url = match self.base_url {
			Some(url) => url,
			None => Url::parse(&format!("https://{}", self.domain.trim().trim_end_matches('/')))
				.map_err(|source| ConfigError::InvalidBaseUrl { source })?,
		};

		if base_url.scheme() != "https" {
			return Err(ConfigError::InsecureBaseUrl { url: base_url.to_string() });
		}
		if base_url.host_str().is_none_or(str::is_empty) {
			return Err(ConfigError::MissingHost { url: base_url.to_string() });
		}

		Ok(ClientConfig {
			base_url,
			pre_notify_window: self.pre_notify_window,
			request_timeout: self.request_timeout,
		})
	}
}
