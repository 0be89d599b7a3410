//! Decoded JWT payload issued by the Hasura auth endpoints.

// self
use crate::_prelude::*;

/// Registered and private claims carried by a Hasura-issued JWT.
///
/// Every field defaults to its zero value when absent or `null`, and unknown fields are
/// ignored, so issuers that add or drop claims never break decoding by themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Claims {
	/// Subject identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub sub: String,
	/// Issued-at instant in unix seconds.
	#[serde(deserialize_with = "null_as_default")]
	pub iat: i64,
	/// Client IP address the token was issued to.
	#[serde(deserialize_with = "null_as_default")]
	pub ip: String,
	/// Expiry instant in unix seconds.
	#[serde(deserialize_with = "null_as_default")]
	pub exp: i64,
	/// Hasura authorization block.
	#[serde(rename = "https://hasura.io/jwt/claims", deserialize_with = "null_as_default")]
	pub hasura: HasuraClaims,
}
impl Claims {
	/// Returns the expiry as an [`OffsetDateTime`], or `None` when it is out of range.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.exp).ok()
	}

	/// Returns the issued-at instant as an [`OffsetDateTime`], or `None` when it is out of
	/// range.
	pub fn issued_at(&self) -> Option<OffsetDateTime> {
		OffsetDateTime::from_unix_timestamp(self.iat).ok()
	}
}

/// Role and identity claims consumed by the Hasura GraphQL engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasuraClaims {
	/// Roles the bearer may assume, in issuer order.
	#[serde(rename = "x-hasura-allowed-roles", deserialize_with = "null_as_default")]
	pub allowed_roles: Vec<String>,
	/// Campus identifier (an opaque string, often a Postgres array literal).
	#[serde(rename = "x-hasura-campuses", deserialize_with = "null_as_default")]
	pub campuses: String,
	/// Role used when a request does not pick one explicitly.
	#[serde(rename = "x-hasura-default-role", deserialize_with = "null_as_default")]
	pub default_role: String,
	/// User identifier.
	#[serde(rename = "x-hasura-user-id", deserialize_with = "null_as_default")]
	pub user_id: String,
	/// Token identifier.
	#[serde(rename = "x-hasura-token-id", deserialize_with = "null_as_default")]
	pub token_id: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
