//! Runs a GraphQL query through the broker against a local mock of the Hasura auth and query
//! endpoints, showing that repeated queries reuse one credential.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use hasura_jwt_broker::{config::ClientConfig, graphql::Client, reqwest};

fn demo_token() -> String {
	let exp = (OffsetDateTime::now_utc() + Duration::HOUR).unix_timestamp();
	let claims = json!({
		"sub": "42",
		"iat": exp - 3_600,
		"ip": "127.0.0.1",
		"exp": exp,
		"https://hasura.io/jwt/claims": {
			"x-hasura-allowed-roles": ["user"],
			"x-hasura-campuses": "{}",
			"x-hasura-default-role": "user",
			"x-hasura-user-id": "42",
			"x-hasura-token-id": "demo",
		},
	});

	format!(
		"{}.{}.c2lnbmF0dXJl",
		URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
		URL_SAFE_NO_PAD.encode(claims.to_string()),
	)
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token = demo_token();
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token").query_param("token", "demo-access");
			then.status(200).body(format!("\"{token}\""));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/graphql-engine/v1/graphql")
				.header("authorization", format!("Bearer {token}"));
			then.status(200).body(r#"{"data":{"user":[{"id":42,"login":"demo"}]}}"#);
		})
		.await;

	let config = ClientConfig::builder("localhost")
		.base_url(Url::parse(&server.base_url())?)
		.pre_notify_window(Duration::minutes(5))
		.build()?;
	let http_client = reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let client = Client::with_http_client(&config, "demo-access", http_client)?;

	let query = "query($login: String!) { user(where: {login: {_eq: $login}}) { id login } }";

	for _ in 0..2 {
		let data = client.run(query, &json!({ "login": "demo" })).await?;

		println!("Query result: {data}.");
	}

	// Both queries rode on the same credential.
	token_mock.assert_calls_async(1).await;

	Ok(())
}
