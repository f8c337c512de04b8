use crate::{
	ids::EventId,
	state::MutableState,
	task::TimerTaskInfo,
};

use super::{PredicateOutcome, version_diverged};

/// Looks up the pending user-timer entry by the timer's started-event id, which the task stores
/// as its `event_id` (§4.2 UserTimer).
pub(super) fn evaluate(task: &TimerTaskInfo, state: &MutableState) -> PredicateOutcome {
	let EventId::Id(started_event_id) = task.event_id else {
		// A user timer always points at a concrete started event; `End` is never valid here.
		return PredicateOutcome::Complete;
	};

	if version_diverged(state, started_event_id, task.version) {
		return PredicateOutcome::Complete;
	}

	let fired = !state
		.pending_user_timer_infos
		.values()
		.any(|timer| timer.started_event_id == started_event_id);

	if fired {
		PredicateOutcome::Complete
	} else {
		PredicateOutcome::Pending {
			next_event_id: EventId::Id(started_event_id + 1),
		}
	}
}
