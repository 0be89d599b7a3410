// self
use crate::obs::{FlowKind, FlowOutcome};

/// Counter incremented once per flow attempt and once per settled outcome.
pub const FLOW_TOTAL: &str = "hasura_jwt_broker_flow_total";
/// Counter incremented whenever a caller waits on a refresh started by another caller.
pub const FLIGHT_JOIN_TOTAL: &str = "hasura_jwt_broker_flight_join_total";

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_TOTAL, "flow" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a caller joining an in-flight refresh instead of issuing its own.
pub fn record_flight_join() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLIGHT_JOIN_TOTAL).increment(1);
	}
}
