//! Standby-side timer task dispatch and reconciliation for a shard of a multi-cluster
//! workflow-history service.
//!
//! A shard's timer queue hands each due [`task::TimerTaskInfo`] to a
//! [`executor::StandbyTaskExecutor`], which decides whether the local (possibly stale) replica
//! already reflects the task's expected post-firing effect. See `SPEC_FULL.md` at the repository
//! root for the full design.
//!
//! This crate deliberately does not own the timer queue, the storage backend, the namespace
//! cache, or the history replicator itself -- those are external collaborators, reached through
//! the narrow traits in [`loader`], [`replication`], and [`namespace`].

pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod ids;
pub mod loader;
pub mod metrics;
pub mod namespace;
mod gate;
mod predicate;
pub mod refresh;
pub mod replication;
pub mod state;
pub mod task;

pub mod prelude {
	pub use crate::{
		clock::ShardClock,
		config::{EventEncodingType, StandbyExecutorConfig},
		error::{StandbyError, StandbyResult},
		executor::StandbyTaskExecutor,
		ids::{ClusterId, EventId, FailoverVersion, NamespaceId, Timestamp},
		loader::{LoadedMutableState, MutableStateLoader},
		namespace::{NamespaceCache, NamespaceEntry},
		refresh::{ActivityTimerRefresher, RefreshOutcome},
		replication::{FetchOutcome, HistoryReplicator},
		state::{
			DecisionInfo, DecisionStatus, MutableState, PendingActivityInfo, PendingUserTimerInfo,
			VersionHistoryItem, WorkflowExecutionStatus,
		},
		task::{TaskKind, TimeoutSubtype, TimerTaskInfo},
	};
}
