//! Optional observability helpers for strategy phases and provider calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_strategy.flow` with the `flow`
//!   (phase or provider call) and `stage` (call site) fields, plus a `warn` event whenever a
//!   callback ends in a failure.
//! - Enable `metrics` to increment the `oauth2_strategy_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Strategy phases and provider calls observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorize redirect construction.
	Request,
	/// Callback handling from code to result.
	Callback,
	/// Authorization-code exchange against the token endpoint.
	TokenExchange,
	/// Refresh token grant.
	Refresh,
	/// Userinfo fetch.
	UserInfo,
	/// Token revocation.
	Logout,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Request => "request",
			FlowKind::Callback => "callback",
			FlowKind::TokenExchange => "token_exchange",
			FlowKind::Refresh => "refresh",
			FlowKind::UserInfo => "userinfo",
			FlowKind::Logout => "logout",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a phase or provider call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
