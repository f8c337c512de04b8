use async_trait::async_trait;

use crate::{config::EventEncodingType, ids::NamespaceId};

/// Outcome of an [`ActivityTimerRefresher::refresh`] attempt. `Conflict` means a concurrent
/// replication apply already advanced the mutable state past the version this refresh was
/// conditioned on -- not an error, just a lost race the caller drops silently (§5 "Single write
/// path").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
	Applied,
	Conflict,
}

/// The standby executor's only write path (§4.2, §4.4, §9): an idempotent, no-visible-event
/// update to an activity's timer bookkeeping, gated by optimistic concurrency on the mutable
/// state version the executor loaded. Writing no new history events keeps this outside the
/// replicated log entirely -- it is purely local bookkeeping.
#[async_trait]
pub trait ActivityTimerRefresher: Send + Sync {
	/// `observed_next_event_id` is the `next_event_id` the executor saw when it loaded mutable
	/// state; the implementation must reject (return `Conflict`) if the stored mutable state has
	/// since moved past it, so a concurrent replication apply is never clobbered.
	async fn refresh(
		&self,
		namespace_id: NamespaceId,
		workflow_id: &str,
		run_id: uuid::Uuid,
		schedule_event_id: i64,
		observed_next_event_id: i64,
		encoding: EventEncodingType,
	) -> anyhow::Result<RefreshOutcome>;
}
