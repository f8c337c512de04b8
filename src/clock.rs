use std::{
	collections::HashMap,
	sync::RwLock,
	time::{SystemTime, UNIX_EPOCH},
};

use crate::ids::{ClusterId, Timestamp};

/// "Current time as observed from cluster C" (§2). Monotonic per cluster, advanced by replication
/// progress -- the shard owns advancing it, this crate only ever reads it.
///
/// Injected rather than read from the wall clock directly so tests can drive the resend/discard
/// boundary deterministically (§9 "Clocks").
pub trait ShardClock: Send + Sync {
	fn now_for(&self, cluster: &ClusterId) -> Timestamp;
}

/// Production clock: tracks a watermark per remote cluster, bumped by the shard's replication
/// progress tracker. Clusters with no recorded watermark fall back to the process wall clock,
/// which is the correct behavior for a cluster this shard has never replicated from yet.
pub struct SystemShardClock {
	watermarks: RwLock<HashMap<ClusterId, i64>>,
}

impl SystemShardClock {
	pub fn new() -> Self {
		SystemShardClock {
			watermarks: RwLock::new(HashMap::new()),
		}
	}

	/// Called by the shard's replication progress tracker as events are applied. Never called
	/// from within this crate.
	pub fn advance(&self, cluster: &ClusterId, millis: i64) {
		let mut watermarks = self.watermarks.write().expect("shard clock lock poisoned");
		let entry = watermarks.entry(cluster.clone()).or_insert(millis);
		*entry = (*entry).max(millis);
	}
}

impl Default for SystemShardClock {
	fn default() -> Self {
		Self::new()
	}
}

impl ShardClock for SystemShardClock {
	fn now_for(&self, cluster: &ClusterId) -> Timestamp {
		let watermarks = self.watermarks.read().expect("shard clock lock poisoned");
		match watermarks.get(cluster) {
			Some(millis) => Timestamp::from_millis(*millis),
			None => Timestamp::from_millis(
				SystemTime::now()
					.duration_since(UNIX_EPOCH)
					.expect("system clock before epoch")
					.as_millis() as i64,
			),
		}
	}
}

/// Advanceable clock for tests: every cluster shares one value unless set individually.
#[cfg(any(test, feature = "test-util"))]
pub struct VirtualShardClock {
	watermarks: RwLock<HashMap<ClusterId, i64>>,
	default_millis: RwLock<i64>,
}

#[cfg(any(test, feature = "test-util"))]
impl VirtualShardClock {
	pub fn new(start_millis: i64) -> Self {
		VirtualShardClock {
			watermarks: RwLock::new(HashMap::new()),
			default_millis: RwLock::new(start_millis),
		}
	}

	pub fn set(&self, cluster: &ClusterId, millis: i64) {
		self.watermarks
			.write()
			.expect("virtual clock lock poisoned")
			.insert(cluster.clone(), millis);
	}

	pub fn advance_all(&self, delta_millis: i64) {
		*self.default_millis.write().expect("virtual clock lock poisoned") += delta_millis;
		for v in self
			.watermarks
			.write()
			.expect("virtual clock lock poisoned")
			.values_mut()
		{
			*v += delta_millis;
		}
	}
}

#[cfg(any(test, feature = "test-util"))]
impl ShardClock for VirtualShardClock {
	fn now_for(&self, cluster: &ClusterId) -> Timestamp {
		let watermarks = self.watermarks.read().expect("virtual clock lock poisoned");
		match watermarks.get(cluster) {
			Some(millis) => Timestamp::from_millis(*millis),
			None => Timestamp::from_millis(*self.default_millis.read().expect("virtual clock lock poisoned")),
		}
	}
}
