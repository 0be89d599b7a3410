//! Concurrency-safe holder for the current credential.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
};

/// Cheap view of the stored credential taken under the shared lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
	/// Bearer value of the stored credential.
	pub encoded: TokenSecret,
	/// Unix second at which the stored credential becomes stale.
	pub renew_at: i64,
}
impl Snapshot {
	/// Returns `true` if the snapshot can be used as-is at unix second `now`.
	pub fn is_fresh_at(&self, now: i64) -> bool {
		now < self.renew_at
	}
}

/// Thread-safe slot holding at most one [`Credential`].
///
/// Readers share the lock and writers swap the whole reference, so a reader only ever sees
/// "no credential" or a fully decoded one.
#[derive(Debug, Default)]
pub struct CredentialStore(RwLock<Option<Arc<Credential>>>);
impl CredentialStore {
	/// Returns the bearer value and renewal deadline, or `None` before the first credential.
	pub fn snapshot(&self) -> Option<Snapshot> {
		self.0.read().as_ref().map(|credential| Snapshot {
			encoded: credential.encoded().clone(),
			renew_at: credential.renew_at(),
		})
	}

	/// Returns the full stored credential, if any.
	pub fn current(&self) -> Option<Arc<Credential>> {
		self.0.read().clone()
	}

	/// Replaces the stored credential wholesale.
	pub fn replace(&self, credential: impl Into<Arc<Credential>>) {
		*self.0.write() = Some(credential.into());
	}

	/// Returns `true` once a credential has been stored.
	pub fn is_present(&self) -> bool {
		self.0.read().is_some()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// self
	use super::*;
	use crate::{
		_preludet::{encode_test_token, test_claims},
		auth::decode,
	};

	fn credential(user: &str, exp: i64) -> Credential {
		decode(&encode_test_token(&test_claims(user, exp)), Duration::seconds(10))
			.expect("Test token should decode.")
	}

	#[test]
	fn snapshot_is_absent_before_first_replace() {
		let store = CredentialStore::default();

		assert!(store.snapshot().is_none());
		assert!(store.current().is_none());
		assert!(!store.is_present());
	}

	#[test]
	fn replace_swaps_the_whole_credential() {
		let store = CredentialStore::default();
		let first = credential("first", 1_000);
		let second = credential("second", 2_000);

		store.replace(first.clone());

		let snapshot = store.snapshot().expect("Snapshot should exist after replace.");

		assert_eq!(snapshot.encoded, *first.encoded());
		assert_eq!(snapshot.renew_at, 990);
		assert!(snapshot.is_fresh_at(989));
		assert!(!snapshot.is_fresh_at(990));

		store.replace(Arc::new(second.clone()));

		let current = store.current().expect("Credential should remain present.");

		assert_eq!(current.claims().sub, "second");
		assert_eq!(store.snapshot().map(|s| s.renew_at), Some(1_990));
	}

	#[test]
	fn concurrent_readers_never_observe_mixed_credentials() {
		let store = Arc::new(CredentialStore::default());
		let credentials =
			(0..8).map(|i| credential(&format!("user-{i}"), 10_000 + i)).collect::<Vec<_>>();

		store.replace(credentials[0].clone());

		let readers = (0..4)
			.map(|_| {
				let store = store.clone();
				let credentials = credentials.clone();

				thread::spawn(move || {
					for _ in 0..1_000 {
						let snapshot = store.snapshot().expect("Store should stay populated.");
						let matching = credentials
							.iter()
							.find(|c| *c.encoded() == snapshot.encoded)
							.expect("Snapshot should match a stored credential.");

						assert_eq!(matching.renew_at(), snapshot.renew_at);
					}
				})
			})
			.collect::<Vec<_>>();

		for credential in credentials.iter().cycle().take(1_000) {
			store.replace(credential.clone());
		}
		for reader in readers {
			reader.join().expect("Reader thread should not panic.");
		}
	}
}
