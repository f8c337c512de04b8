use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Byte encoding used for the single persistence write path (the activity-timer bookkeeping
/// refresh, §4.2). Recognized option `eventEncodingType` from §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum EventEncodingType {
	Json,
	Proto3,
}

impl Default for EventEncodingType {
	fn default() -> Self {
		EventEncodingType::Proto3
	}
}

/// Typed configuration for the standby task executor: a plain `Deserialize` struct with a
/// `JsonSchema` derive and `deny_unknown_fields`, assembled from layered sources via the
/// `config` crate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StandbyExecutorConfig {
	/// Duration (in seconds) after which a PENDING task triggers a history fetch rather than a
	/// pure wait. Must be strictly less than `standby_task_missing_events_discard_delay`.
	standby_task_missing_events_resend_delay_secs: Option<u64>,
	/// Duration (in seconds) after which a PENDING task is discarded outright.
	standby_task_missing_events_discard_delay_secs: Option<u64>,
	#[serde(default)]
	pub event_encoding_type: EventEncodingType,
}

impl Default for StandbyExecutorConfig {
	fn default() -> Self {
		StandbyExecutorConfig {
			standby_task_missing_events_resend_delay_secs: None,
			standby_task_missing_events_discard_delay_secs: None,
			event_encoding_type: EventEncodingType::default(),
		}
	}
}

impl StandbyExecutorConfig {
	/// Defaults to 30s, a conservative default for a replication-lag knob.
	pub fn resend_delay(&self) -> Duration {
		Duration::from_secs(self.standby_task_missing_events_resend_delay_secs.unwrap_or(30))
	}

	/// Defaults to 10 minutes.
	pub fn discard_delay(&self) -> Duration {
		Duration::from_secs(
			self.standby_task_missing_events_discard_delay_secs
				.unwrap_or(10 * 60),
		)
	}

	/// Builds a config from layered sources: defaults, then an optional file, then environment
	/// variables prefixed `EMBER_`.
	pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
		let mut builder = config::Config::builder();

		if let Some(path) = path {
			builder = builder.add_source(config::File::with_name(path).required(false));
		}

		builder = builder.add_source(
			config::Environment::with_prefix("EMBER")
				.try_parsing(true)
				.separator("__"),
		);

		let raw = builder.build()?;
		Ok(raw.try_deserialize()?)
	}

	pub fn validate(&self) -> anyhow::Result<()> {
		if self.resend_delay() >= self.discard_delay() {
			anyhow::bail!(
				"standby_task_missing_events_resend_delay ({:?}) must be strictly less than standby_task_missing_events_discard_delay ({:?})",
				self.resend_delay(),
				self.discard_delay(),
			);
		}
		Ok(())
	}
}
