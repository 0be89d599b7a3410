//! Immutable decoded credential and its renewal arithmetic.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{claims::Claims, secret::TokenSecret},
};

/// Decoded JWT together with the instant it should be renewed.
///
/// Credentials are produced by [`decode`](fn@crate::auth::decode) and never mutated; a refresh
/// supersedes the whole value.
#[derive(Clone)]
pub struct Credential {
	encoded: TokenSecret,
	claims: Claims,
	renew_at: i64,
	fingerprint: String,
}
impl Credential {
	pub(crate) fn new(
		encoded: impl Into<Arc<str>>,
		claims: Claims,
		pre_notify_window: Duration,
	) -> Self {
		let encoded = TokenSecret::new(encoded);
		let renew_at = renewal_deadline(claims.exp, pre_notify_window);
		let fingerprint = fingerprint(encoded.expose());

		Self { encoded, claims, renew_at, fingerprint }
	}

	/// Raw `header.payload.signature` token to present as a bearer value.
	pub fn encoded(&self) -> &TokenSecret {
		&self.encoded
	}

	/// Decoded payload claims.
	pub fn claims(&self) -> &Claims {
		&self.claims
	}

	/// Unix second at which the credential is considered stale.
	pub fn renew_at(&self) -> i64 {
		self.renew_at
	}

	/// Unix second at which the issuer expires the credential.
	pub fn expires_at(&self) -> i64 {
		self.claims.exp
	}

	/// Stable, non-secret identifier (unpadded base64 SHA-256 of the encoded token).
	pub fn fingerprint(&self) -> &str {
		&self.fingerprint
	}

	/// Returns `true` if the credential can be used as-is at unix second `now`.
	pub fn is_fresh_at(&self, now: i64) -> bool {
		now < self.renew_at
	}

	/// Returns `true` if the credential is due for renewal relative to the current clock.
	pub fn needs_renewal(&self) -> bool {
		!self.is_fresh_at(OffsetDateTime::now_utc().unix_timestamp())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("encoded", &"<redacted>")
			.field("fingerprint", &self.fingerprint)
			.field("claims", &self.claims)
			.field("renew_at", &self.renew_at)
			.finish()
	}
}

/// `exp - window`, clamping negative windows to zero so the deadline never passes expiry.
pub(crate) fn renewal_deadline(exp: i64, pre_notify_window: Duration) -> i64 {
	let window = pre_notify_window.whole_seconds().max(0);

	exp.saturating_sub(window)
}

fn fingerprint(encoded: &str) -> String {
	STANDARD_NO_PAD.encode(Sha256::digest(encoded.as_bytes()))
}
