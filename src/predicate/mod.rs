pub(crate) mod activity_timeout;
mod decision_timeout;
mod user_timer;
mod workflow_backoff;
mod workflow_timeout;

use crate::{
	ids::{EventId, FailoverVersion},
	state::MutableState,
	task::{TaskKind, TimerTaskInfo},
};

/// The two outcomes a per-kind predicate can reach (§4.2). `Complete` covers both "task's effect
/// already present" and the COMPLETE-NOOP heartbeat case from §4.2 -- both resolve to `nil` and
/// no fetch, so the executor doesn't need to distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOutcome {
	Complete,
	Pending { next_event_id: EventId },
}

/// Single dispatcher on [`TaskKind`] (§9 "Polymorphism over task kinds"). Callers must have
/// already filtered out the kinds that require no local state (§4.1 step 2) before loading
/// mutable state and calling this.
pub fn evaluate(task: &TimerTaskInfo, state: &MutableState) -> PredicateOutcome {
	match task.task_kind {
		TaskKind::UserTimer => user_timer::evaluate(task, state),
		TaskKind::ActivityTimeout => activity_timeout::evaluate(task, state),
		TaskKind::DecisionTimeout => decision_timeout::evaluate(task, state),
		TaskKind::WorkflowBackoffTimer => workflow_backoff::evaluate(task, state),
		TaskKind::WorkflowTimeout => workflow_timeout::evaluate(task, state),
		// Filtered out by TaskKind::requires_no_local_state before this is ever reached; treat
		// defensively as COMPLETE rather than panicking on a contract violation by the caller.
		TaskKind::ActivityRetryTimer | TaskKind::DecisionRetryTimer => PredicateOutcome::Complete,
	}
}

/// A branch change superseded this task: the version authoritative at the task's event id no
/// longer matches the version the task was created under (§4.1 "Version check"). Shared by every
/// predicate keyed off a scheduling event id.
pub(crate) fn version_diverged(state: &MutableState, event_id: i64, task_version: FailoverVersion) -> bool {
	match state.version_at_event_id(event_id) {
		Some(replica_version) => replica_version != task_version,
		// No watermark that old on this replica -- conservatively treat as diverged rather than
		// risk acting against a branch this replica never actually held.
		None => true,
	}
}
