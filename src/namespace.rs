use async_trait::async_trait;

use crate::ids::{ClusterId, FailoverVersion, NamespaceId};

/// A namespace's replication-relevant attributes, as resolved by the (external) namespace cache.
#[derive(Debug, Clone)]
pub struct NamespaceEntry {
	pub namespace_id: NamespaceId,
	pub failover_version: FailoverVersion,
	pub owner_cluster: ClusterId,
}

impl NamespaceEntry {
	/// Whether `this_cluster` is currently standby (i.e. not the owner) for `task_version`. The
	/// task only belongs to us if its version doesn't currently belong to the owning cluster --
	/// see §4.1 step 1.
	pub fn belongs_to_standby(&self, task_version: FailoverVersion, this_cluster: &ClusterId) -> bool {
		task_version == self.failover_version && self.owner_cluster != *this_cluster
	}
}

/// Resolves a namespace id to its current failover version and owning cluster. The real
/// implementation is a control-plane-fed cache external to this crate (§1 "out of scope").
#[async_trait]
pub trait NamespaceCache: Send + Sync {
	async fn by_id(&self, namespace_id: NamespaceId) -> anyhow::Result<Option<NamespaceEntry>>;
}
