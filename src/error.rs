//! Broker-level error types shared across the decoder, fetchers, manager, and query client.
//!
//! Every variant is [`Clone`] so a single refresh outcome can be handed to each task waiting
//! on the same in-flight request; foreign sources are therefore held behind [`Arc`].

// self
use crate::{_prelude::*, auth::DecodeError};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token returned by the auth endpoint could not be decoded.
	#[error("Credential could not be decoded.")]
	Decode(
		#[from]
		#[source]
		DecodeError,
	),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Endpoint answered with a non-success HTTP status.
	#[error("Endpoint responded with HTTP status {code}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		code: u16,
	},
	/// GraphQL endpoint reported an application-level error inside a successful response.
	#[error("GraphQL endpoint returned an error: {message}.")]
	GraphQl {
		/// First error message reported by the endpoint.
		message: String,
	},
	/// GraphQL endpoint responded with a body that is not a `{data, errors}` envelope.
	#[error("GraphQL endpoint returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
}
impl Error {
	/// Returns `true` when retrying the same call later may succeed.
	///
	/// Network failures and 5xx/429 statuses are transient; malformed credentials, rejected
	/// access tokens, and configuration problems are not.
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Transport(_) => true,
			Self::Status { code } => *code == 429 || *code >= 500,
			_ => false,
		}
	}
}

/// Configuration and validation failures raised while wiring the broker.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// Domain or base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL lacks a host component.
	#[error("Base URL `{url}` has no host.")]
	MissingHost {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL must use HTTPS.
	#[error("Base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// One-time access token is empty.
	#[error("Access token must not be empty.")]
	EmptyAccessToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Endpoint path that was being called.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error raised while calling `endpoint`.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Arc::new(src) }
	}
}
