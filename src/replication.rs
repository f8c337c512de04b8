use async_trait::async_trait;

use crate::ids::{EventId, NamespaceId};

/// Outcome of a [`HistoryReplicator::fetch`] call. `NotAvailable` is the benign case the gate
/// treats as an ordinary retry signal (§4.4); any other failure is returned as `Err` and
/// propagates as [`crate::error::StandbyError::Fatal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
	Ok,
	NotAvailable,
}

/// On-demand pull of a range of history events from the active cluster into this (lagging)
/// replica (§2 component 3). Idempotent: re-fetching an already-applied range is a no-op for the
/// caller. The RPC transport and the active-side source are external collaborators (§1).
#[async_trait]
pub trait HistoryReplicator: Send + Sync {
	/// Inclusive-exclusive range `[begin_event_id, end_event_id)`.
	async fn fetch(
		&self,
		namespace_id: NamespaceId,
		workflow_id: &str,
		run_id: uuid::Uuid,
		begin_event_id: EventId,
		end_event_id: EventId,
	) -> anyhow::Result<FetchOutcome>;
}
