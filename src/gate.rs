use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
	config::StandbyExecutorConfig,
	error::{StandbyError, StandbyResult},
	ids::{EventId, Timestamp},
	metrics,
	replication::{FetchOutcome, HistoryReplicator},
	task::TimerTaskInfo,
};

/// §4.3. Time-driven rather than attempt-count-driven: tolerates arbitrary requeues within the
/// resend window and bounds the worst case by the discard deadline, regardless of how many times
/// the queue has already handed this task back to us.
#[tracing::instrument(skip_all, fields(task_id = task.task_id, workflow_id = %task.workflow_id, run_id = %task.run_id, %next_event_id))]
pub(crate) async fn reconcile(
	task: &TimerTaskInfo,
	next_event_id: EventId,
	now: Timestamp,
	config: &StandbyExecutorConfig,
	replicator: &Arc<dyn HistoryReplicator>,
	cancel: Option<&CancellationToken>,
) -> StandbyResult<()> {
	let lag = now - task.visibility_timestamp;

	if lag < config.resend_delay() {
		tracing::debug!(?lag, "replica lagging within resend window, retrying without fetch");
		metrics::TASK_RETRY_TOTAL
			.with_label_values(&[task.task_kind.to_string().as_str(), "false"])
			.inc();
		return Err(retry(task, next_event_id));
	}

	if lag < config.discard_delay() {
		tracing::debug!(?lag, "replica lagging past resend window, issuing history fetch");

		let fetch_fut = replicator.fetch(
			task.namespace_id,
			&task.workflow_id,
			task.run_id,
			next_event_id,
			EventId::End,
		);

		let outcome = match cancel {
			Some(cancel) => {
				tokio::select! {
					res = fetch_fut => res,
					_ = cancel.cancelled() => {
						tracing::debug!("fetch cancelled by shard shutdown, retrying without result");
						return Err(retry(task, next_event_id));
					}
				}
			}
			None => fetch_fut.await,
		};

		return match outcome {
			Ok(FetchOutcome::Ok) => {
				metrics::FETCH_ATTEMPT_TOTAL.with_label_values(&["ok"]).inc();
				metrics::TASK_RETRY_TOTAL
					.with_label_values(&[task.task_kind.to_string().as_str(), "true"])
					.inc();
				Err(retry(task, next_event_id))
			}
			Ok(FetchOutcome::NotAvailable) => {
				metrics::FETCH_ATTEMPT_TOTAL
					.with_label_values(&["not_available"])
					.inc();
				metrics::TASK_RETRY_TOTAL
					.with_label_values(&[task.task_kind.to_string().as_str(), "true"])
					.inc();
				Err(retry(task, next_event_id))
			}
			Err(err) => {
				metrics::FETCH_ATTEMPT_TOTAL.with_label_values(&["error"]).inc();
				Err(StandbyError::Fatal(
					err.context("history re-replicator fetch failed"),
				))
			}
		};
	}

	tracing::warn!(?lag, "replica past discard deadline, discarding task");
	metrics::TASK_DISCARDED_TOTAL
		.with_label_values(&[task.task_kind.to_string().as_str()])
		.inc();

	Err(StandbyError::Discarded {
		task_id: task.task_id,
		workflow_id: task.workflow_id.clone(),
		run_id: task.run_id,
		next_event_id,
	})
}

fn retry(task: &TimerTaskInfo, next_event_id: EventId) -> StandbyError {
	StandbyError::Retry {
		task_id: task.task_id,
		workflow_id: task.workflow_id.clone(),
		run_id: task.run_id,
		next_event_id,
	}
}
