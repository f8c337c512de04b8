use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::ids::{ClusterId, EventId, FailoverVersion, NamespaceId, Timestamp};

/// Tag for the seven timer task varieties the standby path can observe. Dispatch on this is a
/// single `match` in [`crate::predicate::evaluate`] rather than a class hierarchy per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum TaskKind {
	UserTimer,
	ActivityTimeout,
	DecisionTimeout,
	WorkflowBackoffTimer,
	WorkflowTimeout,
	ActivityRetryTimer,
	DecisionRetryTimer,
}

impl TaskKind {
	/// Task kinds the active side owns outright: the standby executor has no reconciliation work
	/// and must not load mutable state for them (§4.1 step 2).
	pub fn requires_no_local_state(&self, subtype: Option<TimeoutSubtype>) -> bool {
		match self {
			TaskKind::ActivityRetryTimer | TaskKind::DecisionRetryTimer => true,
			TaskKind::DecisionTimeout => subtype == Some(TimeoutSubtype::ScheduleToStart),
			_ => false,
		}
	}
}

/// Meaningful only for `ActivityTimeout` and `DecisionTimeout` tasks; `None` for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum TimeoutSubtype {
	ScheduleToStart,
	ScheduleToClose,
	StartToClose,
	Heartbeat,
}

/// One scheduled timer, handed to the executor read-only by the shard's timer queue. Never
/// mutated on the standby path -- the active side owns creation and the standby side only ever
/// observes it (§3 "Lifecycle").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerTaskInfo {
	/// Monotonic within the shard; used only for logging/metrics, never for reconciliation logic.
	pub task_id: u64,
	pub task_kind: TaskKind,
	pub timeout_subtype: Option<TimeoutSubtype>,
	pub namespace_id: NamespaceId,
	pub workflow_id: String,
	pub run_id: uuid::Uuid,
	/// Failover version at task creation; compared against the replica's last-write version for
	/// the task's event id to detect a branch change that superseded this task.
	pub version: FailoverVersion,
	/// The remote cluster this task's replica tracks lag against.
	pub remote_cluster: ClusterId,
	pub visibility_timestamp: Timestamp,
	/// The scheduling event this task points at. Unused for workflow-level timers (backoff,
	/// workflow timeout), where the predicate only cares about overall execution status.
	pub event_id: EventId,
	/// The decision/activity attempt this task was created for. Meaningful only for
	/// `DecisionTimeout` (compared against the replica's current decision attempt); a stale
	/// attempt means a later attempt already superseded this task.
	pub attempt: i32,
}
