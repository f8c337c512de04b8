use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
	clock::ShardClock,
	config::StandbyExecutorConfig,
	error::StandbyResult,
	gate,
	ids::EventId,
	loader::{LoadedMutableState, MutableStateLoader},
	metrics,
	namespace::NamespaceCache,
	predicate::{self, PredicateOutcome},
	predicate::activity_timeout::needs_timer_refresh,
	refresh::{ActivityTimerRefresher, RefreshOutcome},
	replication::HistoryReplicator,
	task::{TaskKind, TimerTaskInfo},
};

/// Retry interval for the activity-timer bookkeeping write: a tight bounded-retry loop around
/// a single idempotent db action.
const REFRESH_RETRY_INTERVAL: Duration = Duration::from_millis(150);
const MAX_REFRESH_RETRIES: usize = 5;

/// Orchestrates load → predicate → outcome for a single timer task (§2 component 5, §4.1). One
/// instance is shared (behind an `Arc`) across the shard's timer-queue worker pool; `execute` is
/// stateless per call beyond the read-only collaborators and metric handles it holds.
pub struct StandbyTaskExecutor {
	this_cluster: crate::ids::ClusterId,
	namespace_cache: Arc<dyn NamespaceCache>,
	loader: Arc<dyn MutableStateLoader>,
	replicator: Arc<dyn HistoryReplicator>,
	clock: Arc<dyn ShardClock>,
	activity_timer_refresher: Option<Arc<dyn ActivityTimerRefresher>>,
	config: StandbyExecutorConfig,
}

impl StandbyTaskExecutor {
	pub fn new(
		this_cluster: crate::ids::ClusterId,
		namespace_cache: Arc<dyn NamespaceCache>,
		loader: Arc<dyn MutableStateLoader>,
		replicator: Arc<dyn HistoryReplicator>,
		clock: Arc<dyn ShardClock>,
		config: StandbyExecutorConfig,
	) -> Self {
		StandbyTaskExecutor {
			this_cluster,
			namespace_cache,
			loader,
			replicator,
			clock,
			activity_timer_refresher: None,
			config,
		}
	}

	/// Registers the single write path (§4.2). Without this, activities that need a timer
	/// bookkeeping refresh simply skip the write and still reconcile normally -- the refresh is
	/// an optimization, not a correctness requirement of `execute`.
	pub fn with_activity_timer_refresher(mut self, refresher: Arc<dyn ActivityTimerRefresher>) -> Self {
		self.activity_timer_refresher = Some(refresher);
		self
	}

	/// §6 inbound operation. `should_process` is the queue's own belief that this shard is
	/// standby for the task's version; the executor re-validates it against the namespace cache
	/// rather than trusting it blindly, since the queue's filter can be stale across a failover
	/// window (§4.1 step 1).
	#[tracing::instrument(
		skip_all,
		fields(
			task_id = task.task_id,
			task_kind = %task.task_kind,
			namespace_id = %task.namespace_id,
			workflow_id = %task.workflow_id,
			run_id = %task.run_id,
		)
	)]
	pub async fn execute(
		&self,
		task: &TimerTaskInfo,
		should_process: bool,
		cancel: Option<&CancellationToken>,
	) -> StandbyResult<()> {
		let _timer = metrics::EXECUTE_DURATION
			.with_label_values(&[task.task_kind.to_string().as_str()])
			.start_timer();

		let res = self.execute_inner(task, should_process, cancel).await;

		match &res {
			Ok(()) => {
				metrics::TASK_ACK_TOTAL
					.with_label_values(&[task.task_kind.to_string().as_str()])
					.inc();
			}
			Err(err) if err.is_fatal() => {
				metrics::TASK_FATAL_TOTAL
					.with_label_values(&[task.task_kind.to_string().as_str()])
					.inc();
				tracing::error!(?err, "standby task execution failed fatally");
			}
			// Retry/Discarded are recorded by the reconciliation gate itself, which is closer to
			// the decision that produced them.
			Err(_) => {}
		}

		res
	}

	async fn execute_inner(
		&self,
		task: &TimerTaskInfo,
		should_process: bool,
		cancel: Option<&CancellationToken>,
	) -> StandbyResult<()> {
		// Step 1: re-validate cluster membership against the namespace cache.
		if !should_process {
			tracing::debug!("queue filter marked this task as not ours, acking");
			return Ok(());
		}

		let namespace = self.namespace_cache.by_id(task.namespace_id).await?;
		let Some(namespace) = namespace else {
			tracing::debug!("namespace not found, acking (likely removed concurrently)");
			return Ok(());
		};

		if !namespace.belongs_to_standby(task.version, &self.this_cluster) {
			tracing::debug!(
				owner_cluster = %namespace.owner_cluster,
				task_version = %task.version,
				namespace_version = %namespace.failover_version,
				"task version does not belong to this standby cluster, acking"
			);
			return Ok(());
		}

		// Step 2: kinds that require no local state.
		if task
			.task_kind
			.requires_no_local_state(task.timeout_subtype)
		{
			tracing::debug!("task kind requires no standby reconciliation, acking");
			return Ok(());
		}

		// Step 3: load mutable state.
		let loaded = self.load_with_cancel(task, cancel).await?;
		let state = match loaded {
			LoadedMutableState::NotFound => {
				tracing::debug!("workflow not found, acking");
				return Ok(());
			}
			LoadedMutableState::Found(state) => state,
		};

		if state.closed_before(task.event_id) {
			tracing::debug!("workflow closed before task's event id, acking");
			return Ok(());
		}

		// Step 4: kind-specific predicate.
		let outcome = predicate::evaluate(task, &state);

		// The activity-timeout predicate may also require the single idempotent write path.
		if task.task_kind == TaskKind::ActivityTimeout {
			if let EventId::Id(schedule_event_id) = task.event_id {
				if needs_timer_refresh(outcome, &state, schedule_event_id) {
					self.refresh_activity_timer(task, state.next_event_id, schedule_event_id)
						.await;
				}
			}
		}

		match outcome {
			PredicateOutcome::Complete => {
				tracing::debug!("predicate resolved complete, acking");
				Ok(())
			}
			PredicateOutcome::Pending { next_event_id } => {
				let now = self.clock.now_for(&task.remote_cluster);
				gate::reconcile(task, next_event_id, now, &self.config, &self.replicator, cancel).await
			}
		}
	}

	async fn load_with_cancel(
		&self,
		task: &TimerTaskInfo,
		cancel: Option<&CancellationToken>,
	) -> anyhow::Result<LoadedMutableState> {
		let load_fut = self
			.loader
			.load(task.namespace_id, &task.workflow_id, task.run_id);

		match cancel {
			Some(cancel) => {
				tokio::select! {
					res = load_fut => res,
					_ = cancel.cancelled() => anyhow::bail!("mutable state load cancelled by shard shutdown"),
				}
			}
			None => load_fut.await,
		}
	}

	/// Best-effort: failures here are logged, not propagated, since the refresh is an
	/// optimization (§4.2) -- the reconciliation outcome above has already been decided.
	async fn refresh_activity_timer(&self, task: &TimerTaskInfo, observed_next_event_id: i64, schedule_event_id: i64) {
		let Some(refresher) = &self.activity_timer_refresher else {
			return;
		};

		let mut retries = 0;
		let mut interval = tokio::time::interval(REFRESH_RETRY_INTERVAL);
		interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

		loop {
			interval.tick().await;

			match refresher
				.refresh(
					task.namespace_id,
					&task.workflow_id,
					task.run_id,
					schedule_event_id,
					observed_next_event_id,
					self.config.event_encoding_type,
				)
				.await
			{
				Ok(RefreshOutcome::Applied) => {
					metrics::ACTIVITY_TIMER_REFRESH_TOTAL
						.with_label_values(&["applied"])
						.inc();
					return;
				}
				Ok(RefreshOutcome::Conflict) => {
					// A concurrent replication apply already moved the state past what we saw;
					// dropping this write silently is correct, not an error.
					metrics::ACTIVITY_TIMER_REFRESH_TOTAL
						.with_label_values(&["conflict"])
						.inc();
					return;
				}
				Err(err) => {
					if retries >= MAX_REFRESH_RETRIES {
						metrics::ACTIVITY_TIMER_REFRESH_TOTAL
							.with_label_values(&["failed"])
							.inc();
						tracing::error!(?err, "activity timer refresh failed after max retries");
						return;
					}
					retries += 1;
					tracing::debug!(?err, retries, "activity timer refresh failed, retrying");
				}
			}
		}
	}
}
