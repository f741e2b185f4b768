// self
use crate::{
	auth::Completion,
	obs::{FlowKind, FlowOutcome},
};

/// Metric name of the per-flow outcome counter.
pub const FLOW_COUNTER: &str = "oauth2_strategy_flow_total";

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(FLOW_COUNTER, "flow" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records success or failure for a finished provider call.
pub fn record_result<T, E>(kind: FlowKind, result: &Result<T, E>) {
	record_flow_outcome(kind, FlowOutcome::from_ok(result.is_ok()));
}

/// Records the terminal outcome of a callback phase.
pub fn record_completion(completion: &Completion) {
	record_flow_outcome(FlowKind::Callback, FlowOutcome::from_ok(completion.is_success()));
}

impl FlowOutcome {
	fn from_ok(ok: bool) -> Self {
		if ok { FlowOutcome::Success } else { FlowOutcome::Failure }
	}
}
