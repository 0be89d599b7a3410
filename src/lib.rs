//! Single-flight JWT lifecycle manager for Hasura GraphQL endpoints: decode, cache, and
//! transparently refresh bearer tokens so every query leaves with a valid credential, no
//! matter how many tasks ask at once.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
#[cfg(feature = "reqwest")] pub mod graphql;
pub mod http;
pub mod manager;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	#[cfg(feature = "reqwest")]
	use crate::{config::ClientConfig, http::ReqwestFetcher, manager::CredentialManager};

	/// Manager type alias used by reqwest-backed integration tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestManager = CredentialManager<ReqwestFetcher>;

	/// Encodes `claims` as the payload segment of an unsigned three-segment test token.
	///
	/// The header is a fixed HS256 header and the signature segment is a constant; neither is
	/// ever inspected client-side.
	pub fn encode_test_token(claims: &serde_json::Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		format!("{header}.{payload}.c2lnbmF0dXJl")
	}

	/// Builds a Hasura-shaped claims document expiring at `exp` (unix seconds).
	pub fn test_claims(user_id: &str, exp: i64) -> serde_json::Value {
		serde_json::json!({
			"sub": user_id,
			"iat": exp - 3_600,
			"ip": "10.0.0.1",
			"exp": exp,
			"https://hasura.io/jwt/claims": {
				"x-hasura-allowed-roles": ["user", "admin_read_only"],
				"x-hasura-campuses": "{}",
				"x-hasura-default-role": "user",
				"x-hasura-user-id": user_id,
				"x-hasura-token-id": format!("token-{user_id}"),
			},
		})
	}

	/// Returns a test token for `user_id` expiring `lifetime` from now.
	pub fn test_token(user_id: &str, lifetime: Duration) -> String {
		let exp = (OffsetDateTime::now_utc() + lifetime).unix_timestamp();

		encode_test_token(&test_claims(user_id, exp))
	}

	/// Builds a reqwest client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Builds a configuration rooted at a mock server base URL.
	#[cfg(feature = "reqwest")]
	pub fn test_config(base_url: &str, pre_notify_window: Duration) -> ClientConfig {
		let base_url = Url::parse(base_url).expect("Mock server base URL should parse.");

		ClientConfig::builder("localhost")
			.base_url(base_url)
			.pre_notify_window(pre_notify_window)
			.build()
			.expect("Test configuration should be valid.")
	}

	/// Constructs a [`CredentialManager`] that talks to the mock server through the insecure
	/// reqwest client used across integration tests.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_manager(
		config: &ClientConfig,
		access_token: &str,
	) -> ReqwestTestManager {
		let fetcher = ReqwestFetcher::with_client(config, test_reqwest_client());

		CredentialManager::new(fetcher, access_token)
			.expect("Test access token should be accepted by the manager.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::OnceCell as AsyncOnceCell;
	pub use parking_lot::{Mutex, RwLock};
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
#[cfg(test)] use {color_eyre as _, httpmock as _};
