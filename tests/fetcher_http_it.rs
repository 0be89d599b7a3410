#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use hasura_jwt_broker::{
	_preludet::*,
	auth::DecodeError,
	error::TransportError,
	http::{CredentialFetcher, ReqwestFetcher},
};

fn fetcher(server: &MockServer, window: Duration) -> ReqwestFetcher {
	ReqwestFetcher::with_client(&test_config(&server.base_url(), window), test_reqwest_client())
}

#[tokio::test]
async fn initial_fetch_sends_access_token_and_strips_quotes() {
	let server = MockServer::start_async().await;
	let token = test_token("initial", Duration::HOUR);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token").query_param("token", "one-time-access");
			then.status(200).body(format!("\"{token}\""));
		})
		.await;
	let credential = fetcher(&server, Duration::minutes(10))
		.fetch_initial("one-time-access")
		.await
		.expect("Initial fetch should succeed.");

	mock.assert_async().await;

	assert_eq!(credential.encoded().expose(), token);
	assert_eq!(credential.claims().hasura.user_id, "initial");
	assert_eq!(credential.renew_at(), credential.expires_at() - 600);
}

#[tokio::test]
async fn refresh_presents_current_token_in_header() {
	let server = MockServer::start_async().await;
	let current = test_token("current", Duration::seconds(-1));
	let refreshed = test_token("refreshed", Duration::HOUR);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/refresh").header("x-jwt-token", current.as_str());
			then.status(200).body(refreshed.as_str());
		})
		.await;
	let credential = fetcher(&server, Duration::ZERO)
		.fetch_refresh(&current)
		.await
		.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(credential.encoded().expose(), refreshed);
	assert_eq!(credential.claims().sub, "refreshed");
}

#[tokio::test]
async fn non_ok_status_is_a_status_error() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(401).body("{\"error\":\"invalid access token\"}");
		})
		.await;
	let err = fetcher(&server, Duration::ZERO)
		.fetch_initial("revoked")
		.await
		.expect_err("Unauthorized response must fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Status { code: 401 }), "unexpected error: {err:?}");
	assert!(!err.is_transient());
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/refresh");
			then.status(200).body("\"session-expired\"");
		})
		.await;

	let err = fetcher(&server, Duration::ZERO)
		.fetch_refresh("a.b.c")
		.await
		.expect_err("Token without segments must fail.");

	assert!(
		matches!(err, Error::Decode(DecodeError::Format { segments: 1 })),
		"unexpected error: {err:?}",
	);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
	let config = test_config("https://127.0.0.1:9", Duration::ZERO);
	let err = ReqwestFetcher::with_client(&config, test_reqwest_client())
		.fetch_initial("one-time-access")
		.await
		.expect_err("Connection failure must surface.");

	assert!(
		matches!(err, Error::Transport(TransportError::Network { endpoint: "/api/auth/token", .. })),
		"unexpected error: {err:?}",
	);
	assert!(err.is_transient());
}

#[tokio::test]
async fn request_timeout_is_a_network_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(200)
				.body(test_token("slow", Duration::HOUR))
				.delay(std::time::Duration::from_secs(2));
		})
		.await;

	let client = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.timeout(std::time::Duration::from_millis(200))
		.build()
		.expect("Timeout client should build.");
	let err = ReqwestFetcher::with_client(&test_config(&server.base_url(), Duration::ZERO), client)
		.fetch_initial("one-time-access")
		.await
		.expect_err("Slow endpoint must time out.");

	assert!(matches!(err, Error::Transport(_)), "unexpected error: {err:?}");
}
