//! Check/refresh/use orchestration with a single-flight refresh guard.
//!
//! [`CredentialManager::authorize`] answers from the [`CredentialStore`] while the stored
//! credential is fresh. Once it is due (`now >= renew_at`), or before the first credential
//! exists, callers are admitted to a *flight*: one fetch/refresh keyed by the stale token it
//! replaces. The first caller drives the request and every other caller of the same episode
//! waits for its outcome, so N concurrent callers cost one round-trip and all of them observe
//! the same credential or the same error. A failed flight leaves the store untouched; the
//! next call opens a new flight.

mod metrics;

pub use metrics::AuthorizeMetrics;

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	error::ConfigError,
	http::CredentialFetcher,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{config::ClientConfig, http::ReqwestFetcher};

/// Manager specialized for the crate's default reqwest fetcher.
#[cfg(feature = "reqwest")]
pub type ReqwestCredentialManager = CredentialManager<ReqwestFetcher>;

/// Long-lived owner of the current credential for one access token.
pub struct CredentialManager<F>
where
	F: ?Sized + CredentialFetcher,
{
	fetcher: Arc<F>,
	store: CredentialStore,
	access_token: TokenSecret,
	flight: Mutex<Option<Arc<Flight>>>,
	metrics: Arc<AuthorizeMetrics>,
}
impl<F> CredentialManager<F>
where
	F: ?Sized + CredentialFetcher,
{
	/// Creates a manager with an empty store.
	///
	/// The one-time access token is kept so a failed initial exchange can be retried.
	pub fn new(fetcher: impl Into<Arc<F>>, access_token: impl Into<Arc<str>>) -> Result<Self> {
		let access_token = TokenSecret::new(access_token);

		if access_token.is_empty() {
			return Err(ConfigError::EmptyAccessToken.into());
		}

		Ok(Self {
			fetcher: fetcher.into(),
			store: CredentialStore::default(),
			access_token,
			flight: Default::default(),
			metrics: Default::default(),
		})
	}

	/// Returns a bearer value that is fresh at the time of the call.
	///
	/// Performs no network call while the stored credential is fresh. Errors from the fetcher
	/// are returned unchanged and are not retried.
	pub async fn authorize(&self) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "authorize");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.check_refresh_use()).await;

		if result.is_err() {
			self.metrics.record_failure();
		}

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Store holding the current credential.
	pub fn store(&self) -> &CredentialStore {
		&self.store
	}

	/// Current credential, including a stale one kept after a failed refresh.
	pub fn current(&self) -> Option<Arc<Credential>> {
		self.store.current()
	}

	/// Shared counters describing authorize outcomes.
	pub fn metrics(&self) -> &Arc<AuthorizeMetrics> {
		&self.metrics
	}

	/// Fetcher used for initial and refresh requests.
	pub fn fetcher(&self) -> &Arc<F> {
		&self.fetcher
	}

	async fn check_refresh_use(&self) -> Result<TokenSecret> {
		self.metrics.record_attempt();

		let now = OffsetDateTime::now_utc().unix_timestamp();

		if let Some(snapshot) = self.store.snapshot().filter(|s| s.is_fresh_at(now)) {
			self.metrics.record_cache_hit();
			obs::trace_credential(FlowKind::Authorize, "cache hit", None);

			return Ok(snapshot.encoded);
		}

		let flight = match self.admit(now) {
			Admission::Ready(encoded) => {
				self.metrics.record_cache_hit();

				return Ok(encoded);
			},
			Admission::Join(flight) => flight,
		};
		let outcome = flight.outcome.get_or_init(|| self.fly(flight.stale.as_ref())).await.clone();

		self.retire(&flight);

		outcome.map(|credential| credential.encoded().clone())
	}

	/// Joins the flight for the current staleness episode, opening one if needed.
	fn admit(&self, now: i64) -> Admission {
		let mut slot = self.flight.lock();
		// Re-read under the slot lock; a flight retired before this point already replaced
		// the store.
		let snapshot = self.store.snapshot();

		if let Some(snapshot) = snapshot.as_ref().filter(|s| s.is_fresh_at(now)) {
			return Admission::Ready(snapshot.encoded.clone());
		}

		self.metrics.record_flight_join();

		let stale = snapshot.map(|s| s.encoded);

		// A settled flight still waiting for `retire` belongs to a finished episode.
		if let Some(flight) =
			slot.as_ref().filter(|f| f.stale == stale && !f.outcome.is_initialized())
		{
			obs::record_flight_join();
			obs::trace_credential(FlowKind::Authorize, "joined in-flight refresh", None);

			return Admission::Join(flight.clone());
		}

		let flight = Arc::new(Flight { stale, outcome: AsyncOnceCell::new() });

		*slot = Some(flight.clone());

		Admission::Join(flight)
	}

	/// Drops `flight` from the slot unless a newer episode already replaced it.
	fn retire(&self, flight: &Arc<Flight>) {
		let mut slot = self.flight.lock();

		if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, flight)) {
			*slot = None;
		}
	}

	async fn fly(&self, stale: Option<&TokenSecret>) -> Result<Arc<Credential>> {
		let kind = if stale.is_some() { FlowKind::Refresh } else { FlowKind::Initial };
		let span = FlowSpan::new(kind, "fetch");

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);
		self.metrics.record_fetch();

		let result = span
			.instrument(async move {
				let credential = match stale {
					Some(current) => self.fetcher.fetch_refresh(current.expose()).await?,
					None => self.fetcher.fetch_initial(self.access_token.expose()).await?,
				};
				let credential = Arc::new(credential);

				self.store.replace(credential.clone());
				obs::trace_credential(kind, "credential replaced", Some(credential.fingerprint()));

				Ok::<_, Error>(credential)
			})
			.await;

		obs::record_flow_outcome(kind, FlowOutcome::of(&result));

		result
	}
}
#[cfg(feature = "reqwest")]
impl CredentialManager<ReqwestFetcher> {
	/// Creates a manager backed by a reqwest fetcher built from `config`.
	pub fn from_config(config: &ClientConfig, access_token: impl Into<Arc<str>>) -> Result<Self> {
		Self::new(ReqwestFetcher::new(config)?, access_token)
	}
}
impl<F> Debug for CredentialManager<F>
where
	F: ?Sized + CredentialFetcher,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialManager")
			.field("current", &self.store.current())
			.field("refresh_in_flight", &self.flight.lock().is_some())
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// One fetch/refresh shared by every caller of a staleness episode.
struct Flight {
	/// Token being replaced; `None` for the initial exchange.
	stale: Option<TokenSecret>,
	outcome: AsyncOnceCell<Result<Arc<Credential>>>,
}

enum Admission {
	Ready(TokenSecret),
	Join(Arc<Flight>),
}
