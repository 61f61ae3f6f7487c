//! Per-subscription aggregation and the run that fans it out
//!
//! [`Collector`] lists subscriptions, runs one [`SubscriptionPipeline`] per
//! subscription on a bounded worker pool, joins them, runs the
//! cross-reference linker, and reports a [`RunSummary`].

mod collector;
mod subscription;

pub use collector::{Collector, RunSummary};
pub use subscription::{SubscriptionPipeline, SubscriptionSummary};
