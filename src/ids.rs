use std::{fmt, ops::Sub};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, matching the replicated-log convention of a plain `i64`
/// timestamp rather than a wall-clock `DateTime` type -- this is a replicated-log quantity, not
/// a display quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn from_millis(millis: i64) -> Self {
		Timestamp(millis)
	}

	pub fn as_millis(&self) -> i64 {
		self.0
	}

	pub fn saturating_add_millis(&self, millis: i64) -> Timestamp {
		Timestamp(self.0.saturating_add(millis))
	}
}

/// Duration between two [`Timestamp`]s, clamped to zero if `self` is earlier than `other`.
impl Sub for Timestamp {
	type Output = std::time::Duration;

	fn sub(self, other: Timestamp) -> std::time::Duration {
		std::time::Duration::from_millis(self.0.saturating_sub(other.0).max(0) as u64)
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Monotonic event id within a single (namespace, workflow, run). `End` is the `+∞` sentinel
/// used by the history re-replicator's exclusive range end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventId {
	Id(i64),
	End,
}

impl EventId {
	pub fn next(self) -> EventId {
		match self {
			EventId::Id(id) => EventId::Id(id + 1),
			EventId::End => EventId::End,
		}
	}
}

impl fmt::Display for EventId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EventId::Id(id) => write!(f, "{id}"),
			EventId::End => write!(f, "end"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceId(pub uuid::Uuid);

impl fmt::Display for NamespaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Identifies a remote cluster in a multi-cluster replication topology (the shard clock is keyed
/// by this, not by a datacenter/region string, since a single region can host multiple clusters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub String);

impl fmt::Display for ClusterId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Failover version: a monotonic integer identifying which cluster last wrote a given piece of
/// state (see GLOSSARY). Ordering is meaningful -- a higher version always supersedes a lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FailoverVersion(pub i64);

impl fmt::Display for FailoverVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
