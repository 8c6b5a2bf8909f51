//! Cross-window messages posted by the embedded frame.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Topic posted once the hosted workspace acknowledges a job outcome.
pub const TOPIC_JOB_OUTCOME_ACKNOWLEDGED: &str = "job:outcome-acknowledged";
/// Payload status of a finished job.
pub const STATUS_COMPLETE: &str = "complete";

/// A message received from the embedded frame.
///
/// ```json
/// {
///   "topic": "job:outcome-acknowledged",
///   "payload": { "status": "complete", "operation": "submitActionFg", "jobId": "..." }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
	pub topic: String,
	pub payload: MessagePayload,
}

/// Payload of an inbound message. Fields beyond `status` and `operation`
/// are preserved in `extra` and handed to the close callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
	#[serde(default)]
	pub status: String,
	#[serde(default)]
	pub operation: String,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl InboundMessage {
	/// Parses untrusted frame data. Anything without a string `topic` and an
	/// object `payload` yields `None`.
	pub fn parse(data: &Value) -> Option<Self> {
		let object = data.as_object()?;
		object.get("topic")?.as_str()?;
		object.get("payload")?.as_object()?;
		serde_json::from_value(data.clone()).ok()
	}

	/// Whether this reports completion of `operation`.
	pub fn is_completed_operation(&self, operation: &str) -> bool {
		self.topic == TOPIC_JOB_OUTCOME_ACKNOWLEDGED && self.payload.status == STATUS_COMPLETE && self.payload.operation == operation
	}
}
