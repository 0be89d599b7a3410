//! Pure JWT payload decoder with a padded-base64 fallback.
//!
//! Issuers are inconsistent about how they encode the payload segment: most emit unpadded
//! base64url as RFC 7515 requires, some pad it or use the standard alphabet. [`decode`] tries
//! the strict form first and falls back to padding + alphabet translation before giving up.
//! The signature segment is never inspected.

// crates.io
use base64::{
	DecodeError as Base64Error, Engine,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
// self
use crate::{
	_prelude::*,
	auth::{claims::Claims, credential::Credential},
};

/// Failures raised while turning an encoded token into a [`Credential`].
#[derive(Clone, Debug, ThisError)]
pub enum DecodeError {
	/// Token does not contain a payload segment.
	#[error("Token has too few segments ({segments}).")]
	Format {
		/// Number of dot-delimited segments found.
		segments: usize,
	},
	/// Payload segment is neither raw base64url nor padded standard base64.
	#[error("Payload segment is not base64 (raw base64url: {raw}; padded base64: {padded}).")]
	Encoding {
		/// Failure from the unpadded base64url attempt.
		raw: Base64Error,
		/// Failure from the padded standard-alphabet fallback.
		padded: Base64Error,
	},
	/// Payload bytes are not a valid claims document.
	#[error("Payload claims are malformed at `{path}`.")]
	Payload {
		/// JSON path of the offending value (`.` for the document root).
		path: String,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
}

/// Decodes `encoded` and computes its renewal deadline as `exp - pre_notify_window`.
///
/// Negative windows are treated as zero.
pub fn decode(encoded: &str, pre_notify_window: Duration) -> Result<Credential, DecodeError> {
	let segments = encoded.split('.').collect::<Vec<_>>();

	if segments.len() < 2 {
		return Err(DecodeError::Format { segments: segments.len() });
	}

	let payload = decode_segment(segments[1])?;
	let claims = parse_claims(&payload)?;

	Ok(Credential::new(encoded, claims, pre_notify_window))
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, DecodeError> {
	let raw = match URL_SAFE_NO_PAD.decode(segment) {
		Ok(bytes) => return Ok(bytes),
		Err(e) => e,
	};

	STANDARD.decode(pad_standard(segment)).map_err(|padded| DecodeError::Encoding { raw, padded })
}

/// Pads to a multiple of four and maps the URL-safe alphabet onto the standard one.
fn pad_standard(segment: &str) -> String {
	let padding = (4 - segment.len() % 4) % 4;
	let mut buf = String::with_capacity(segment.len() + padding);

	for c in segment.chars() {
		buf.push(match c {
			'-' => '+',
			'_' => '/',
			c => c,
		});
	}
	for _ in 0..padding {
		buf.push('=');
	}

	buf
}

fn parse_claims(payload: &[u8]) -> Result<Claims, DecodeError> {
	let mut de = serde_json::Deserializer::from_slice(payload);
	let claims = serde_path_to_error::deserialize(&mut de).map_err(|e| DecodeError::Payload {
		path: e.path().to_string(),
		source: Arc::new(e.into_inner()),
	})?;

	de.end()
		.map_err(|e| DecodeError::Payload { path: ".".into(), source: Arc::new(e) })?;

	Ok(claims)
}
