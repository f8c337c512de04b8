use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use ember::prelude::*;

use ember::clock::VirtualShardClock;
use ember::loader::LoadedMutableState;
use ember::replication::FetchOutcome;

/// A logfmt-under-EnvFilter subscriber; harmless to call more than once since `try_init`
/// silently no-ops after the first successful install.
fn init_tracing() {
	use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

	let _ = tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ember=debug")))
		.with(tracing_logfmt::layer())
		.try_init();
}

struct FixedNamespaceCache(NamespaceEntry);

#[async_trait]
impl NamespaceCache for FixedNamespaceCache {
	async fn by_id(&self, _namespace_id: NamespaceId) -> anyhow::Result<Option<NamespaceEntry>> {
		Ok(Some(self.0.clone()))
	}
}

struct FixedLoader(MutableState);

#[async_trait]
impl MutableStateLoader for FixedLoader {
	async fn load(
		&self,
		_namespace_id: NamespaceId,
		_workflow_id: &str,
		_run_id: uuid::Uuid,
	) -> anyhow::Result<LoadedMutableState> {
		Ok(LoadedMutableState::Found(self.0.clone()))
	}
}

struct CountingReplicator {
	outcome: FetchOutcome,
	calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl HistoryReplicator for CountingReplicator {
	async fn fetch(
		&self,
		_namespace_id: NamespaceId,
		_workflow_id: &str,
		_run_id: uuid::Uuid,
		_begin_event_id: EventId,
		_end_event_id: EventId,
	) -> anyhow::Result<FetchOutcome> {
		self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
		Ok(self.outcome)
	}
}

const OWNER: &str = "active";
const STANDBY: &str = "standby";

fn namespace_entry() -> NamespaceEntry {
	NamespaceEntry {
		namespace_id: NamespaceId(uuid::Uuid::nil()),
		failover_version: FailoverVersion(1),
		owner_cluster: ClusterId(OWNER.to_string()),
	}
}

fn base_task(kind: TaskKind, event_id: EventId, visibility_millis: i64) -> TimerTaskInfo {
	TimerTaskInfo {
		task_id: 1,
		task_kind: kind,
		timeout_subtype: None,
		namespace_id: NamespaceId(uuid::Uuid::nil()),
		workflow_id: "wf".to_string(),
		run_id: uuid::Uuid::nil(),
		version: FailoverVersion(1),
		remote_cluster: ClusterId(OWNER.to_string()),
		visibility_timestamp: Timestamp::from_millis(visibility_millis),
		event_id,
		attempt: 1,
	}
}

fn running_state() -> MutableState {
	MutableState {
		next_event_id: 10,
		execution_status: WorkflowExecutionStatus::Running,
		version_history: vec![VersionHistoryItem {
			event_id: 1,
			version: FailoverVersion(1),
		}],
		pending_activity_infos: HashMap::new(),
		pending_user_timer_infos: HashMap::new(),
		decision_info: None,
	}
}

fn make_executor(
	state: MutableState,
	clock: Arc<VirtualShardClock>,
	replicator: Arc<CountingReplicator>,
) -> StandbyTaskExecutor {
	StandbyTaskExecutor::new(
		ClusterId(STANDBY.to_string()),
		Arc::new(FixedNamespaceCache(namespace_entry())),
		Arc::new(FixedLoader(state)),
		replicator,
		clock,
		StandbyExecutorConfig::default(),
	)
}

/// Scenario 1: user timer pending progresses retry (no fetch) -> retry (with fetch) -> discard as
/// the shard clock advances across the resend/discard windows.
#[tokio::test]
async fn user_timer_pending_progresses_through_resend_and_discard_windows() {
	init_tracing();
	let mut state = running_state();
	state.pending_user_timer_infos.insert(
		"timer".to_string(),
		PendingUserTimerInfo {
			timer_id: "timer".to_string(),
			started_event_id: 5,
		},
	);

	let clock = Arc::new(VirtualShardClock::new(0));
	let replicator = Arc::new(CountingReplicator {
		outcome: FetchOutcome::Ok,
		calls: std::sync::atomic::AtomicUsize::new(0),
	});
	let config = StandbyExecutorConfig::default();
	let executor = make_executor(state, clock.clone(), replicator.clone());
	let task = base_task(TaskKind::UserTimer, EventId::Id(5), 0);

	let err = executor.execute(&task, true, None).await.unwrap_err();
	assert!(err.is_retry());
	assert_eq!(replicator.calls.load(std::sync::atomic::Ordering::SeqCst), 0);

	let midpoint = (config.resend_delay().as_millis() as i64 + config.discard_delay().as_millis() as i64) / 2;
	clock.advance_all(midpoint);

	let err = executor.execute(&task, true, None).await.unwrap_err();
	assert!(err.is_retry());
	assert_eq!(replicator.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

	clock.advance_all(2 * config.discard_delay().as_millis() as i64);

	let err = executor.execute(&task, true, None).await.unwrap_err();
	assert!(err.is_discarded());
}

/// Scenario 2: user timer already fired in the replica acknowledges immediately.
#[tokio::test]
async fn user_timer_fired_acks_immediately() {
	init_tracing();
	let state = running_state();
	let clock = Arc::new(VirtualShardClock::new(0));
	let replicator = Arc::new(CountingReplicator {
		outcome: FetchOutcome::Ok,
		calls: std::sync::atomic::AtomicUsize::new(0),
	});
	let executor = make_executor(state, clock, replicator);
	let task = base_task(TaskKind::UserTimer, EventId::Id(5), 0);

	let res = executor.execute(&task, true, None).await;
	assert!(res.is_ok());
}

/// Scenario 3: a heartbeat extended past the task's stale visibility timestamp is a silent noop.
#[tokio::test]
async fn activity_heartbeat_noop_when_extended() {
	use ember::state::PendingActivityInfo;

	init_tracing();
	let mut state = running_state();
	state.pending_activity_infos.insert(
		3,
		PendingActivityInfo {
			schedule_event_id: 3,
			started_event_id: Some(4),
			started_time: Some(Timestamp::from_millis(0)),
			last_heartbeat_time: Some(Timestamp::from_millis(0)),
			heartbeat_timeout_ms: Some(1_000),
			attempt: 1,
			next_timer_task_created: true,
		},
	);

	let clock = Arc::new(VirtualShardClock::new(0));
	let replicator = Arc::new(CountingReplicator {
		outcome: FetchOutcome::Ok,
		calls: std::sync::atomic::AtomicUsize::new(0),
	});
	let executor = make_executor(state, clock, replicator.clone());
	let mut task = base_task(TaskKind::ActivityTimeout, EventId::Id(3), 0);
	task.timeout_subtype = Some(TimeoutSubtype::Heartbeat);

	let res = executor.execute(&task, true, None).await;
	assert!(res.is_ok());
	assert_eq!(replicator.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

/// Scenario 4: two activities scheduled, one completed (absent from the replica), the other
/// still started with a recent heartbeat whose deadline the task's visibility timestamp falls
/// 5s short of -- a COMPLETE-NOOP heartbeat outcome that still owes exactly one idempotent
/// activity-timer bookkeeping refresh, since the replica hasn't recorded the next timer yet.
#[tokio::test]
async fn activity_heartbeat_needs_refresh() {
	use ember::refresh::RefreshOutcome;
	use ember::state::PendingActivityInfo;

	init_tracing();
	struct CountingRefresher(std::sync::atomic::AtomicUsize);

	#[async_trait]
	impl ActivityTimerRefresher for CountingRefresher {
		async fn refresh(
			&self,
			_namespace_id: NamespaceId,
			_workflow_id: &str,
			_run_id: uuid::Uuid,
			_schedule_event_id: i64,
			_observed_next_event_id: i64,
			_encoding: ember::config::EventEncodingType,
		) -> anyhow::Result<RefreshOutcome> {
			self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
			Ok(RefreshOutcome::Applied)
		}
	}

	let mut state = running_state();
	// Activity 3 already completed: absent from the replica, so it contributes nothing.
	// Activity 7 is still live, with a heartbeat-derived deadline the task's stale visibility
	// timestamp falls 5s short of.
	state.pending_activity_infos.insert(
		7,
		PendingActivityInfo {
			schedule_event_id: 7,
			started_event_id: Some(8),
			started_time: Some(Timestamp::from_millis(0)),
			last_heartbeat_time: Some(Timestamp::from_millis(0)),
			heartbeat_timeout_ms: Some(10_000),
			attempt: 1,
			next_timer_task_created: false,
		},
	);

	let clock = Arc::new(VirtualShardClock::new(0));
	let replicator = Arc::new(CountingReplicator {
		outcome: FetchOutcome::Ok,
		calls: std::sync::atomic::AtomicUsize::new(0),
	});
	let refresher = Arc::new(CountingRefresher(std::sync::atomic::AtomicUsize::new(0)));
	let executor = make_executor(state, clock, replicator).with_activity_timer_refresher(refresher.clone());
	let mut task = base_task(TaskKind::ActivityTimeout, EventId::Id(7), 5_000);
	task.timeout_subtype = Some(TimeoutSubtype::Heartbeat);

	// deadline = max(0, 0) + 10_000 = 10_000; task visibility (5_000) < 10_000 -> nil (COMPLETE-NOOP).
	let res = executor.execute(&task, true, None).await;
	assert!(res.is_ok());
	assert_eq!(refresher.0.load(std::sync::atomic::Ordering::SeqCst), 1);
}

/// Scenario 5: DecisionTimeout/ScheduleToStart is always the active side's responsibility.
#[tokio::test]
async fn decision_schedule_to_start_acks_without_load() {
	init_tracing();
	let clock = Arc::new(VirtualShardClock::new(0));
	let replicator = Arc::new(CountingReplicator {
		outcome: FetchOutcome::Ok,
		calls: std::sync::atomic::AtomicUsize::new(0),
	});
	// A loader that errors if called at all, proving step 2's early return skips the load.
	struct PanicLoader;
	#[async_trait]
	impl MutableStateLoader for PanicLoader {
		async fn load(
			&self,
			_namespace_id: NamespaceId,
			_workflow_id: &str,
			_run_id: uuid::Uuid,
		) -> anyhow::Result<LoadedMutableState> {
			panic!("loader must not be called for ScheduleToStart");
		}
	}

	let executor = StandbyTaskExecutor::new(
		ClusterId(STANDBY.to_string()),
		Arc::new(FixedNamespaceCache(namespace_entry())),
		Arc::new(PanicLoader),
		replicator,
		clock,
		StandbyExecutorConfig::default(),
	);
	let mut task = base_task(TaskKind::DecisionTimeout, EventId::Id(3), 0);
	task.timeout_subtype = Some(TimeoutSubtype::ScheduleToStart);

	let res = executor.execute(&task, true, None).await;
	assert!(res.is_ok());
}

/// Scenario 6: a workflow timeout task against an already-completed workflow acks.
#[tokio::test]
async fn workflow_timeout_after_completion_acks() {
	init_tracing();
	let mut state = running_state();
	state.execution_status = WorkflowExecutionStatus::Completed;

	let clock = Arc::new(VirtualShardClock::new(0));
	let replicator = Arc::new(CountingReplicator {
		outcome: FetchOutcome::Ok,
		calls: std::sync::atomic::AtomicUsize::new(0),
	});
	let executor = make_executor(state, clock, replicator);
	let task = base_task(TaskKind::WorkflowTimeout, EventId::End, 0);

	let res = executor.execute(&task, true, None).await;
	assert!(res.is_ok());
}
