use crate::errors::{GatewayError, Result};
use serde_json::Value;
use tracker::{Credentials, TrackerClient};

/// Pulls the assignee identifier out of either accepted form: a bare string,
/// or a structured object carrying the identifier in an `id` field. The two
/// forms are alternatives; there is no merging between them.
pub fn assignee_identifier(value: &Value) -> Option<&str> {
    match value {
        Value::String(identifier) => Some(identifier),
        Value::Object(map) => map.get("id").and_then(Value::as_str),
        _ => None,
    }
}

/// Resolves an assignee value to the tracker's internal account id.
///
/// An identifier the tracker cannot match is a caller-facing validation error
/// naming the identifier, never a generic failure: the caller supplied an
/// unresolvable identity and should be told which one.
pub async fn resolve_assignee(
    client: &TrackerClient,
    creds: &Credentials,
    value: &Value,
) -> Result<String> {
    let Some(identifier) = assignee_identifier(value) else {
        return Err(GatewayError::Validation(
            "assignee must be a string or an object with an \"id\" field".to_string(),
        ));
    };

    match client.find_account_by_email(creds, identifier).await? {
        Some(identity) => Ok(identity.account_id),
        None => Err(GatewayError::Validation(format!(
            "assignee '{identifier}' could not be resolved to a tracker account"
        ))),
    }
}
