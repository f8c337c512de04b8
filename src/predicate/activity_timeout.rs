use crate::{
	ids::EventId,
	state::MutableState,
	task::{TimeoutSubtype, TimerTaskInfo},
};

use super::{PredicateOutcome, version_diverged};

/// Looks up the pending activity info by the scheduled-event id, which the task stores as its
/// `event_id` (§4.2 ActivityTimeout).
pub(super) fn evaluate(task: &TimerTaskInfo, state: &MutableState) -> PredicateOutcome {
	let EventId::Id(schedule_event_id) = task.event_id else {
		return PredicateOutcome::Complete;
	};

	if version_diverged(state, schedule_event_id, task.version) {
		return PredicateOutcome::Complete;
	}

	let Some(activity) = state.pending_activity_infos.get(&schedule_event_id) else {
		return PredicateOutcome::Complete;
	};

	if task.timeout_subtype == Some(TimeoutSubtype::Heartbeat) {
		// A later heartbeat pushed the deadline past this task's visibility timestamp: this
		// particular firing is stale and the replica's current deadline already supersedes it.
		if let Some(deadline) = activity.heartbeat_deadline() {
			if task.visibility_timestamp < deadline {
				return PredicateOutcome::Complete;
			}
		}
	}

	PredicateOutcome::Pending {
		next_event_id: EventId::Id(schedule_event_id + 1),
	}
}

/// Whether the activity-timer bookkeeping refresh (§4.2, the executor's only write path) should
/// run for this activity: the replica hasn't recorded the next activity timer yet. This applies
/// regardless of whether the predicate resolved to `Pending` or to the Heartbeat COMPLETE-NOOP
/// branch (§8 scenario 4) -- a stale heartbeat deadline still leaves the activity live and still
/// awaiting its next timer, the predicate's `outcome` is unrelated to that bookkeeping gap.
pub fn needs_timer_refresh(_outcome: PredicateOutcome, state: &MutableState, schedule_event_id: i64) -> bool {
	state
		.pending_activity_infos
		.get(&schedule_event_id)
		.is_some_and(|activity| !activity.next_timer_task_created)
}
