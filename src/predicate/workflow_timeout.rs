use crate::{ids::EventId, state::MutableState, task::TimerTaskInfo};

use super::PredicateOutcome;

/// §4.2 WorkflowTimeout. PENDING iff the workflow execution is still running; the `event_id` on
/// this task kind is unused, so there is no per-event version check to run. `next_event_id` is
/// the replica's own `next_event_id`, not the task's (unused) `event_id` -- the gate needs a real
/// lower bound to fetch from, and the task's `event_id` is `EventId::End` for this kind, which
/// would produce a useless `[End, End)` range.
pub(super) fn evaluate(_task: &TimerTaskInfo, state: &MutableState) -> PredicateOutcome {
	if state.execution_status.is_running() {
		PredicateOutcome::Pending {
			next_event_id: EventId::Id(state.next_event_id),
		}
	} else {
		PredicateOutcome::Complete
	}
}
