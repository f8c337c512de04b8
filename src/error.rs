use thiserror::Error;

use crate::ids::EventId;

/// Outcome taxonomy for [`crate::executor::StandbyTaskExecutor::execute`].
///
/// `Ok(())` is the "nil" outcome: the queue may ack the task. The two structured variants here
/// are the queue's other two sentinels; anything else bubbles up through `Fatal` and the queue's
/// own retry infrastructure takes over.
#[derive(Debug, Error)]
pub enum StandbyError {
	#[error(
		"task {task_id} ({workflow_id}/{run_id}) retrying: replica has not observed event {next_event_id}"
	)]
	Retry {
		task_id: u64,
		workflow_id: String,
		run_id: uuid::Uuid,
		next_event_id: EventId,
	},

	#[error(
		"task {task_id} ({workflow_id}/{run_id}) discarded: replica fell behind past the discard deadline waiting on event {next_event_id}"
	)]
	Discarded {
		task_id: u64,
		workflow_id: String,
		run_id: uuid::Uuid,
		next_event_id: EventId,
	},

	#[error(transparent)]
	Fatal(#[from] anyhow::Error),
}

impl StandbyError {
	pub fn is_retry(&self) -> bool {
		matches!(self, StandbyError::Retry { .. })
	}

	pub fn is_discarded(&self) -> bool {
		matches!(self, StandbyError::Discarded { .. })
	}

	pub fn is_fatal(&self) -> bool {
		matches!(self, StandbyError::Fatal(_))
	}
}

pub type StandbyResult<T> = Result<T, StandbyError>;
