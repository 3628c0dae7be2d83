use serde_json::Value;

use crate::models::Id;

/// Emits an audit event under the `audit` tracing target.
pub fn log_audit(user_id: Option<&Id>, action: &str, resource: Option<&str>, metadata: Option<Value>) {
    let user_id = user_id.map(Id::to_string).unwrap_or_else(|| "-".to_string());
    let metadata = metadata.unwrap_or(Value::Null);
    tracing::info!(
        target: "audit",
        user_id = %user_id,
        action,
        resource = resource.unwrap_or("-"),
        metadata = %metadata,
        "audit"
    );
}
