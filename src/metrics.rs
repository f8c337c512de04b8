use prometheus::{
	HistogramVec, IntCounterVec, Registry, register_histogram_vec_with_registry,
	register_int_counter_vec_with_registry,
};

const DURATION_BUCKETS: &[f64] = &[
	0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

lazy_static::lazy_static! {
	pub static ref REGISTRY: Registry = Registry::new_custom(Some("ember".to_string()), None)
		.expect("failed to create ember metrics registry");

	// MARK: Executor outcomes
	pub static ref TASK_ACK_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"standby_task_ack_total",
		"Total number of standby timer tasks acknowledged (nil outcome).",
		&["task_kind"],
		REGISTRY
	).unwrap();

	pub static ref TASK_RETRY_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"standby_task_retry_total",
		"Total number of standby timer tasks returned to the queue for retry.",
		&["task_kind", "fetched"],
		REGISTRY
	).unwrap();

	pub static ref TASK_DISCARDED_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"standby_task_discarded_total",
		"Total number of standby timer tasks discarded past the discard deadline.",
		&["task_kind"],
		REGISTRY
	).unwrap();

	pub static ref TASK_FATAL_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"standby_task_fatal_total",
		"Total number of standby timer tasks that propagated a fatal error.",
		&["task_kind"],
		REGISTRY
	).unwrap();

	// MARK: Reconciliation gate
	pub static ref FETCH_ATTEMPT_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"standby_history_fetch_attempt_total",
		"Total number of history re-replication fetches issued by the reconciliation gate.",
		&["result"],
		REGISTRY
	).unwrap();

	// MARK: Single write path
	pub static ref ACTIVITY_TIMER_REFRESH_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
		"standby_activity_timer_refresh_total",
		"Total number of idempotent activity-timer bookkeeping refreshes written by the standby path.",
		&["result"],
		REGISTRY
	).unwrap();

	pub static ref EXECUTE_DURATION: HistogramVec = register_histogram_vec_with_registry!(
		"standby_task_execute_duration",
		"Duration of a single execute() call in seconds.",
		&["task_kind"],
		DURATION_BUCKETS.to_vec(),
		REGISTRY
	).unwrap();
}
