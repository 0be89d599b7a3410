//! Hasura GraphQL query client that attaches a managed bearer credential to every request.
//!
//! The query and variables are passed through untouched; the client only unwraps the
//! `{"data": ..., "errors": [...]}` envelope.

// crates.io
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	config::{ClientConfig, GRAPHQL_PATH},
	error::TransportError,
	http::{CredentialFetcher, ReqwestFetcher},
	manager::CredentialManager,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

#[derive(Serialize)]
struct QueryEnvelope<'a, V>
where
	V: ?Sized + Serialize,
{
	query: &'a str,
	variables: &'a V,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponseEnvelope {
	data: Option<Value>,
	errors: Vec<ResponseError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponseError {
	message: String,
}

/// GraphQL client bound to one Hasura deployment and one access token.
pub struct Client<F = ReqwestFetcher>
where
	F: ?Sized + CredentialFetcher,
{
	manager: Arc<CredentialManager<F>>,
	http_client: ReqwestClient,
	endpoint: Url,
}
impl Client<ReqwestFetcher> {
	/// Creates a client for `https://<domain>` using default timings.
	pub fn new(domain: impl Into<String>, access_token: impl Into<Arc<str>>) -> Result<Self> {
		Self::with_config(&ClientConfig::new(domain)?, access_token)
	}

	/// Creates a client from an explicit configuration.
	pub fn with_config(config: &ClientConfig, access_token: impl Into<Arc<str>>) -> Result<Self> {
		let fetcher = ReqwestFetcher::new(config)?;
		let http_client = fetcher.client().clone();
		let manager = CredentialManager::new(fetcher, access_token)?;

		Ok(Self::with_manager(config, Arc::new(manager), http_client))
	}

	/// Creates a client that shares `http_client` between the auth and query endpoints.
	pub fn with_http_client(
		config: &ClientConfig,
		access_token: impl Into<Arc<str>>,
		http_client: ReqwestClient,
	) -> Result<Self> {
		let fetcher = ReqwestFetcher::with_client(config, http_client.clone());
		let manager = CredentialManager::new(fetcher, access_token)?;

		Ok(Self::with_manager(config, Arc::new(manager), http_client))
	}
}
impl<F> Client<F>
where
	F: ?Sized + CredentialFetcher,
{
	/// Creates a client around an existing manager.
	pub fn with_manager(
		config: &ClientConfig,
		manager: Arc<CredentialManager<F>>,
		http_client: ReqwestClient,
	) -> Self {
		Self { manager, http_client, endpoint: config.graphql_url() }
	}

	/// Credential manager shared by every query sent through this client.
	pub fn manager(&self) -> &Arc<CredentialManager<F>> {
		&self.manager
	}

	/// Runs `query` with `variables` and returns the `data` member.
	///
	/// A missing or `null` `data` member yields [`Value::Null`]. The first non-empty error
	/// message in the response becomes [`Error::GraphQl`].
	pub async fn run<V>(&self, query: &str, variables: &V) -> Result<Value>
	where
		V: ?Sized + Serialize + Sync,
	{
		const KIND: FlowKind = FlowKind::Query;

		let span = FlowSpan::new(KIND, "run");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let bearer = self.manager.authorize().await?;
				let response = self
					.http_client
					.post(self.endpoint.clone())
					.header(AUTHORIZATION, format!("Bearer {}", bearer.expose()))
					.header(CONTENT_TYPE, "application/json")
					.json(&QueryEnvelope { query, variables })
					.send()
					.await
					.map_err(|e| TransportError::network(GRAPHQL_PATH, e))?;
				let status = response.status();

				if status != reqwest::StatusCode::OK {
					return Err(Error::Status { code: status.as_u16() });
				}

				let body =
					response.bytes().await.map_err(|e| TransportError::network(GRAPHQL_PATH, e))?;

				unwrap_envelope(&body)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
impl<F> Clone for Client<F>
where
	F: ?Sized + CredentialFetcher,
{
	fn clone(&self) -> Self {
		Self {
			manager: self.manager.clone(),
			http_client: self.http_client.clone(),
			endpoint: self.endpoint.clone(),
		}
	}
}
impl<F> Debug for Client<F>
where
	F: ?Sized + CredentialFetcher,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("endpoint", &self.endpoint.as_str())
			.field("manager", &self.manager)
			.finish()
	}
}

fn unwrap_envelope(body: &[u8]) -> Result<Value> {
	let envelope = serde_json::from_slice::<ResponseEnvelope>(body)
		.map_err(|e| Error::MalformedResponse { source: Arc::new(e) })?;

	if let Some(error) = envelope.errors.into_iter().next().filter(|e| !e.message.is_empty()) {
		return Err(Error::GraphQl { message: error.message });
	}

	Ok(envelope.data.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn data_is_passed_through() {
		let data = unwrap_envelope(br#"{"data":{"user":[{"login":"root"}]}}"#)
			.expect("Data envelope should unwrap.");

		assert_eq!(data, serde_json::json!({ "user": [{ "login": "root" }] }));
	}

	#[test]
	fn null_or_missing_data_is_null() {
		assert_eq!(unwrap_envelope(br#"{"data":null}"#).expect("Null data is valid."), Value::Null);
		assert_eq!(unwrap_envelope(b"{}").expect("Empty envelope is valid."), Value::Null);
	}

	#[test]
	fn first_error_message_wins() {
		let err = unwrap_envelope(
			br#"{"data":null,"errors":[{"message":"field 'users' not found"},{"message":"other"}]}"#,
		)
		.expect_err("GraphQL errors must surface.");

		assert!(
			matches!(err, Error::GraphQl { ref message } if message == "field 'users' not found")
		);
	}

	#[test]
	fn empty_error_message_is_ignored() {
		let data = unwrap_envelope(br#"{"data":{"ok":true},"errors":[{"message":""}]}"#)
			.expect("Blank error messages should not fail the query.");

		assert_eq!(data, serde_json::json!({ "ok": true }));
	}

	#[test]
	fn non_envelope_body_is_malformed() {
		let err = unwrap_envelope(b"<html>bad gateway</html>")
			.expect_err("Non-JSON body must be rejected.");

		assert!(matches!(err, Error::MalformedResponse { .. }));
	}
}
