use crate::{ids::EventId, state::MutableState, task::TimerTaskInfo};

use super::PredicateOutcome;

/// §4.2 WorkflowBackoffTimer. PENDING iff the workflow has not yet produced its first
/// decision-scheduled event. There is no per-activity/timer event id to key off of -- the task's
/// `event_id` is unused here (§3) -- so there is no version check to run either; the workflow's
/// own execution progress is the only signal.
pub(super) fn evaluate(_task: &TimerTaskInfo, state: &MutableState) -> PredicateOutcome {
	// The first event written after the workflow-start event is the first decision-scheduled
	// event; `next_event_id` still pointing at that slot means no decision has been scheduled yet.
	const POST_START_EVENT_ID: i64 = 2;

	if state.next_event_id <= POST_START_EVENT_ID {
		PredicateOutcome::Pending {
			next_event_id: EventId::Id(POST_START_EVENT_ID),
		}
	} else {
		PredicateOutcome::Complete
	}
}
