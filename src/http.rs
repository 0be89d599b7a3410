//! Credential fetchers for the Hasura auth endpoints.
//!
//! [`CredentialFetcher`] is the broker's only dependency on an HTTP stack: the manager asks it
//! for an initial credential (one-time access token exchange) or a refreshed one (current
//! token presented in the `x-jwt-token` header) and never sees raw responses. The default
//! [`ReqwestFetcher`] issues both calls as `GET` requests, strips JSON quotes from the body,
//! and hands the remaining token to [`decode`](fn@crate::auth::decode).

// self
use crate::{_prelude::*, auth::Credential};
#[cfg(feature = "reqwest")]
use crate::{
	auth,
	config::{AUTH_REFRESH_PATH, AUTH_TOKEN_PATH, ClientConfig},
	error::{ConfigError, TransportError},
};

/// Header carrying the current token on refresh requests.
pub const REFRESH_HEADER: &str = "x-jwt-token";

/// Boxed future returned by [`CredentialFetcher`] implementations.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Credential>> + 'a + Send>>;

/// Source of freshly issued credentials.
///
/// Implementations must be stateless with respect to credentials; the manager owns caching
/// and refresh coordination. Errors should use [`Error::Transport`] for network failures,
/// [`Error::Status`] for non-success responses, and [`Error::Decode`] for unusable tokens.
pub trait CredentialFetcher
where
	Self: Send + Sync,
{
	/// Exchanges the one-time access token for a credential.
	fn fetch_initial<'a>(&'a self, access_token: &'a str) -> FetchFuture<'a>;

	/// Trades the current encoded token for a new credential.
	fn fetch_refresh<'a>(&'a self, current: &'a str) -> FetchFuture<'a>;
}
impl<T> CredentialFetcher for Arc<T>
where
	T: ?Sized + CredentialFetcher,
{
	fn fetch_initial<'a>(&'a self, access_token: &'a str) -> FetchFuture<'a> {
		(**self).fetch_initial(access_token)
	}

	fn fetch_refresh<'a>(&'a self, current: &'a str) -> FetchFuture<'a> {
		(**self).fetch_refresh(current)
	}
}

/// Strips JSON quoting and surrounding whitespace from an auth response body.
pub fn unquote_token(body: &str) -> String {
	body.trim().replace('"', "")
}

/// Reqwest-backed fetcher talking to the Hasura auth endpoints.
///
/// Redirects are not followed when the fetcher builds its own client; token endpoints answer
/// directly.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
	client: ReqwestClient,
	token_url: Url,
	refresh_url: Url,
	pre_notify_window: Duration,
}
#[cfg(feature = "reqwest")]
impl ReqwestFetcher {
	/// Builds a fetcher with its own client honoring the configured request timeout.
	pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(config.request_timeout_std())
			.redirect(reqwest::redirect::Policy::none())
			.build()?;

		Ok(Self::with_client(config, client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`]; the caller owns its timeout and TLS setup.
	pub fn with_client(config: &ClientConfig, client: ReqwestClient) -> Self {
		Self {
			client,
			token_url: config.auth_token_url(),
			refresh_url: config.auth_refresh_url(),
			pre_notify_window: config.pre_notify_window,
		}
	}

	/// Underlying reqwest client.
	pub fn client(&self) -> &ReqwestClient {
		&self.client
	}

	async fn read_credential(
		&self,
		endpoint: &'static str,
		request: reqwest::RequestBuilder,
	) -> Result<Credential> {
		let response = request.send().await.map_err(|e| TransportError::network(endpoint, e))?;
		let status = response.status();

		if status != reqwest::StatusCode::OK {
			return Err(Error::Status { code: status.as_u16() });
		}

		let body = response.text().await.map_err(|e| TransportError::network(endpoint, e))?;
		let encoded = unquote_token(&body);

		Ok(auth::decode(&encoded, self.pre_notify_window)?)
	}
}
#[cfg(feature = "reqwest")]
impl CredentialFetcher for ReqwestFetcher {
	fn fetch_initial<'a>(&'a self, access_token: &'a str) -> FetchFuture<'a> {
		Box::pin(async move {
			let mut url = self.token_url.clone();

			url.query_pairs_mut().append_pair("token", access_token);

			self.read_credential(AUTH_TOKEN_PATH, self.client.get(url)).await
		})
	}

	fn fetch_refresh<'a>(&'a self, current: &'a str) -> FetchFuture<'a> {
		Box::pin(async move {
			let request = self.client.get(self.refresh_url.clone()).header(REFRESH_HEADER, current);

			self.read_credential(AUTH_REFRESH_PATH, request).await
		})
	}
}
