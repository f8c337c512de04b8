use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ClusterId, EventId, FailoverVersion, Timestamp};

/// The replica snapshot of a workflow execution (§3). Mutated exclusively by the replication
/// applier on the standby path; the executor only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutableState {
	pub next_event_id: i64,
	pub execution_status: WorkflowExecutionStatus,
	/// Ordered by `event_id` ascending. Each entry marks the failover version that was authoritative
	/// starting at that event id -- a branch point. `version_at_event_id` resolves "who wrote the
	/// state as of event id E" against this list rather than a flat per-cluster map, so the single
	/// source of truth for a version lives in one place.
	pub version_history: Vec<VersionHistoryItem>,
	pub pending_activity_infos: HashMap<i64, PendingActivityInfo>,
	pub pending_user_timer_infos: HashMap<String, PendingUserTimerInfo>,
	pub decision_info: Option<DecisionInfo>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VersionHistoryItem {
	pub event_id: i64,
	pub version: FailoverVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowExecutionStatus {
	Running,
	Completed,
	Terminated,
	TimedOut,
	Canceled,
	ContinuedAsNew,
}

impl WorkflowExecutionStatus {
	pub fn is_running(&self) -> bool {
		matches!(self, WorkflowExecutionStatus::Running)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingActivityInfo {
	pub schedule_event_id: i64,
	pub started_event_id: Option<i64>,
	pub started_time: Option<Timestamp>,
	pub last_heartbeat_time: Option<Timestamp>,
	pub heartbeat_timeout_ms: Option<i64>,
	pub attempt: i32,
	/// Whether the replica has already created the next activity timer task for this activity.
	/// When this is false but the predicate determines one should exist, the executor issues the
	/// single idempotent bookkeeping refresh described in §4.2.
	pub next_timer_task_created: bool,
}

impl PendingActivityInfo {
	/// `max(lastHeartbeat, startedTime) + heartbeatTimeout` (§4.2 ActivityTimeout/Heartbeat).
	pub fn heartbeat_deadline(&self) -> Option<Timestamp> {
		let heartbeat_timeout_ms = self.heartbeat_timeout_ms?;
		let base = match (self.last_heartbeat_time, self.started_time) {
			(Some(last), Some(started)) => last.max(started),
			(Some(last), None) => last,
			(None, Some(started)) => started,
			(None, None) => return None,
		};
		Some(base.saturating_add_millis(heartbeat_timeout_ms))
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingUserTimerInfo {
	pub timer_id: String,
	pub started_event_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStatus {
	Scheduled,
	Started,
	Completed,
	Failed,
	TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionInfo {
	pub scheduled_event_id: i64,
	pub started_event_id: Option<i64>,
	pub status: DecisionStatus,
	pub attempt: i32,
}

impl MutableState {
	/// The failover version that was authoritative when `event_id` was written. Returns the
	/// version of the last watermark at or before `event_id`, or `None` if the history has no
	/// watermark that old (should not happen for a well-formed replica, but callers treat this
	/// conservatively as "versions diverge").
	pub fn version_at_event_id(&self, event_id: i64) -> Option<FailoverVersion> {
		self.version_history
			.iter()
			.rev()
			.find(|item| item.event_id <= event_id)
			.map(|item| item.version)
	}

	/// COMPLETE iff the workflow has reached a terminal close event at or before `event_id`.
	pub fn closed_before(&self, event_id: EventId) -> bool {
		match event_id {
			EventId::End => false,
			EventId::Id(id) => !self.execution_status.is_running() && self.next_event_id <= id,
		}
	}
}
