use crate::{
	ids::EventId,
	state::{DecisionStatus, MutableState},
	task::{TimeoutSubtype, TimerTaskInfo},
};

use super::{PredicateOutcome, version_diverged};

/// §4.2 DecisionTimeout. `ScheduleToStart` is filtered out before mutable state is ever loaded
/// (see [`crate::task::TaskKind::requires_no_local_state`]); this function only ever sees
/// `StartToClose` in practice, but handles the other subtype defensively.
pub(super) fn evaluate(task: &TimerTaskInfo, state: &MutableState) -> PredicateOutcome {
	if task.timeout_subtype != Some(TimeoutSubtype::StartToClose) {
		return PredicateOutcome::Complete;
	}

	let EventId::Id(scheduled_event_id) = task.event_id else {
		return PredicateOutcome::Complete;
	};

	if version_diverged(state, scheduled_event_id, task.version) {
		return PredicateOutcome::Complete;
	}

	let Some(decision) = &state.decision_info else {
		return PredicateOutcome::Complete;
	};

	let still_started = matches!(decision.status, DecisionStatus::Started);
	let attempt_matches = decision.attempt == task.attempt;

	if decision.scheduled_event_id == scheduled_event_id && still_started && attempt_matches {
		let Some(started_event_id) = decision.started_event_id else {
			return PredicateOutcome::Complete;
		};

		PredicateOutcome::Pending {
			next_event_id: EventId::Id(started_event_id + 1),
		}
	} else {
		PredicateOutcome::Complete
	}
}
