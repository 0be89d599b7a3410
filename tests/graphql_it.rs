#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use hasura_jwt_broker::{_preludet::*, graphql::Client};

const ACCESS_TOKEN: &str = "one-time-access";
const GRAPHQL: &str = "/api/graphql-engine/v1/graphql";
const USER_QUERY: &str = "query($login: String!) { user(where: {login: {_eq: $login}}) { id } }";

async fn mock_token_exchange<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token").query_param("token", ACCESS_TOKEN);
			then.status(200).body(format!("\"{token}\""));
		})
		.await
}

fn build_client(server: &MockServer) -> Client {
	Client::with_http_client(
		&test_config(&server.base_url(), Duration::ZERO),
		ACCESS_TOKEN,
		test_reqwest_client(),
	)
	.expect("GraphQL client should build.")
}

#[tokio::test]
async fn run_sends_bearer_and_returns_data() {
	let server = MockServer::start_async().await;
	let token = test_token("query-user", Duration::HOUR);
	let exchange = mock_token_exchange(&server, &token).await;
	let query = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(GRAPHQL)
				.header("authorization", format!("Bearer {token}"))
				.header("content-type", "application/json")
				.json_body(json!({ "query": USER_QUERY, "variables": { "login": "root" } }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":{"user":[{"id":1}]}}"#);
		})
		.await;
	let client = build_client(&server);

	for _ in 0..2 {
		let data = client
			.run(USER_QUERY, &json!({ "login": "root" }))
			.await
			.expect("Query should succeed.");

		assert_eq!(data, json!({ "user": [{ "id": 1 }] }));
	}

	exchange.assert_calls_async(1).await;
	query.assert_calls_async(2).await;
}

#[tokio::test]
async fn graphql_errors_surface_first_message() {
	let server = MockServer::start_async().await;
	let token = test_token("query-errors", Duration::HOUR);

	mock_token_exchange(&server, &token).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(GRAPHQL);
			then.status(200).body(
				r#"{"errors":[{"message":"field \"users\" not found in type: 'query_root'"}]}"#,
			);
		})
		.await;

	let err = build_client(&server)
		.run("{ users { id } }", &json!({}))
		.await
		.expect_err("GraphQL error must surface.");

	assert!(
		matches!(err, Error::GraphQl { ref message } if message.contains("not found")),
		"unexpected error: {err:?}",
	);
}

#[tokio::test]
async fn non_ok_query_status_is_reported() {
	let server = MockServer::start_async().await;
	let token = test_token("query-status", Duration::HOUR);

	mock_token_exchange(&server, &token).await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(GRAPHQL);
			then.status(502).body("bad gateway");
		})
		.await;

	let err = build_client(&server)
		.run("{ user { id } }", &json!({}))
		.await
		.expect_err("Gateway failure must surface.");

	assert!(matches!(err, Error::Status { code: 502 }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn authorization_failure_skips_query() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(401);
		})
		.await;

	let query = server
		.mock_async(|when, then| {
			when.method(POST).path(GRAPHQL);
			then.status(200).body(r#"{"data":{}}"#);
		})
		.await;
	let err = build_client(&server)
		.run("{ user { id } }", &json!({}))
		.await
		.expect_err("Authorization failure must surface.");

	assert!(matches!(err, Error::Status { code: 401 }), "unexpected error: {err:?}");

	query.assert_calls_async(0).await;
}
