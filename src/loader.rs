use async_trait::async_trait;

use crate::{
	ids::NamespaceId,
	state::MutableState,
};

/// Result of a mutable-state load: distinct from an error because "not found" is a perfectly
/// routine outcome on the standby path (the run may have been replicated-out, GC'd, or simply
/// not yet arrived) -- see §4.4.
#[derive(Debug)]
pub enum LoadedMutableState {
	Found(MutableState),
	NotFound,
}

/// Loads the current mutable-state snapshot for a workflow execution. The storage engine behind
/// this is an external collaborator (§1); this crate only depends on the narrow read interface.
#[async_trait]
pub trait MutableStateLoader: Send + Sync {
	async fn load(
		&self,
		namespace_id: NamespaceId,
		workflow_id: &str,
		run_id: uuid::Uuid,
	) -> anyhow::Result<LoadedMutableState>;
}
