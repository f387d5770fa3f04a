use crate::assignee::resolve_assignee;
use crate::errors::{GatewayError, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracker::{Credentials, TrackerClient};

/// Keys the builder consumes itself. Everything else in the input document
/// passes through into the fields map verbatim; the caller is trusted for
/// anything beyond this set.
const RESERVED_KEYS: &[&str] = &["project_key", "summary", "issuetype", "assignee", "description"];

/// The tracker-native issue-creation shape.
#[derive(Debug, Serialize, PartialEq)]
pub struct IssuePayload {
    pub fields: Map<String, Value>,
}

/// Builds a tracker-native issue payload from a loosely-typed input document.
///
/// The mandatory fields are checked before anything else, so a malformed
/// request never reaches the tracker. An assignee, when present, is resolved
/// to an account id first; an unresolvable one stops the build. Passthrough
/// keys are merged last and are disjoint from the reserved set by
/// construction.
pub async fn build_issue_payload(
    client: &TrackerClient,
    creds: &Credentials,
    request: &Map<String, Value>,
    default_issue_type: &str,
) -> Result<IssuePayload> {
    let project_key = required_field(request, "project_key")?;
    let summary = required_field(request, "summary")?;
    let issue_type = request
        .get("issuetype")
        .and_then(Value::as_str)
        .unwrap_or(default_issue_type);

    let mut fields = Map::new();
    fields.insert("project".to_string(), json!({ "key": project_key }));
    fields.insert("summary".to_string(), Value::String(summary.to_string()));
    fields.insert("issuetype".to_string(), json!({ "name": issue_type }));

    if let Some(assignee) = request.get("assignee") {
        let account_id = resolve_assignee(client, creds, assignee).await?;
        fields.insert("assignee".to_string(), json!({ "id": account_id }));
    }

    if let Some(description) = request.get("description") {
        // The tracker rejects plain strings here; text gets wrapped in the
        // rich-text document shape. Anything already structured passes
        // through untouched.
        let wrapped = match description {
            Value::String(text) => rich_text_document(text),
            other => other.clone(),
        };
        fields.insert("description".to_string(), wrapped);
    }

    for (key, value) in request {
        if !RESERVED_KEYS.contains(&key.as_str()) {
            fields.insert(key.clone(), value.clone());
        }
    }

    Ok(IssuePayload { fields })
}

fn required_field<'a>(request: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    request
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| GatewayError::Validation(format!("{key} is required")))
}

/// A single paragraph holding the raw text as one text run.
fn rich_text_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request_from(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test request must be an object"),
        }
    }

    // Points at a closed port; a builder that never needs the tracker must
    // never notice.
    fn offline() -> (TrackerClient, Credentials) {
        (
            TrackerClient::default(),
            Credentials::new("http://127.0.0.1:1", "bob@example.com", "token-1"),
        )
    }

    #[tokio::test]
    async fn test_mandatory_fields_and_default_type() {
        let (client, creds) = offline();
        let request = request_from(json!({
            "project_key": "ENG",
            "summary": "Fix bug"
        }));

        let payload = build_issue_payload(&client, &creds, &request, "Story")
            .await
            .unwrap();
        assert_eq!(payload.fields["project"], json!({"key": "ENG"}));
        assert_eq!(payload.fields["summary"], json!("Fix bug"));
        assert_eq!(payload.fields["issuetype"], json!({"name": "Story"}));
        assert!(!payload.fields.contains_key("assignee"));
        assert!(!payload.fields.contains_key("description"));
    }

    #[tokio::test]
    async fn test_missing_project_key_fails_before_any_tracker_call() {
        let (client, creds) = offline();
        let request = request_from(json!({"summary": "Fix bug"}));

        let err = build_issue_payload(&client, &creds, &request, "Story")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_summary_fails() {
        let (client, creds) = offline();
        let request = request_from(json!({"project_key": "ENG", "summary": ""}));

        let err = build_issue_payload(&client, &creds, &request, "Story")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_explicit_issue_type_wins() {
        let (client, creds) = offline();
        let request = request_from(json!({
            "project_key": "ENG",
            "summary": "Fix bug",
            "issuetype": "Bug"
        }));

        let payload = build_issue_payload(&client, &creds, &request, "Story")
            .await
            .unwrap();
        assert_eq!(payload.fields["issuetype"], json!({"name": "Bug"}));
    }

    #[tokio::test]
    async fn test_resolved_assignee_becomes_account_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/user/search"))
            .and(query_param("query", "alice@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"accountId": "acc-123", "displayName": "Alice"}
            ])))
            .mount(&server)
            .await;

        let creds = Credentials::new(&server.uri(), "bob@example.com", "token-1");
        let request = request_from(json!({
            "project_key": "ENG",
            "summary": "Fix bug",
            "assignee": "alice@example.com"
        }));

        let payload = build_issue_payload(&TrackerClient::default(), &creds, &request, "Story")
            .await
            .unwrap();
        assert_eq!(payload.fields["project"], json!({"key": "ENG"}));
        assert_eq!(payload.fields["summary"], json!("Fix bug"));
        assert_eq!(payload.fields["issuetype"], json!({"name": "Story"}));
        assert_eq!(payload.fields["assignee"], json!({"id": "acc-123"}));
    }

    #[tokio::test]
    async fn test_unresolvable_assignee_stops_the_build() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/user/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let creds = Credentials::new(&server.uri(), "bob@example.com", "token-1");
        let request = request_from(json!({
            "project_key": "ENG",
            "summary": "Fix bug",
            "assignee": "alice@example.com"
        }));

        let err = build_issue_payload(&TrackerClient::default(), &creds, &request, "Story")
            .await
            .unwrap_err();
        match err {
            GatewayError::Validation(message) => assert!(message.contains("alice@example.com")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_description_is_always_the_wrapped_document() {
        let (client, creds) = offline();
        let request = request_from(json!({
            "project_key": "ENG",
            "summary": "Fix bug",
            "description": "It crashes on login."
        }));

        let payload = build_issue_payload(&client, &creds, &request, "Story")
            .await
            .unwrap();
        assert_eq!(
            payload.fields["description"],
            json!({
                "type": "doc",
                "version": 1,
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": "It crashes on login."}]
                }]
            })
        );
    }

    #[tokio::test]
    async fn test_extension_fields_pass_through_verbatim() {
        let (client, creds) = offline();
        let request = request_from(json!({
            "project_key": "ENG",
            "summary": "Fix bug",
            "labels": ["backend", "urgent"],
            "customfield_10016": 5
        }));

        let payload = build_issue_payload(&client, &creds, &request, "Story")
            .await
            .unwrap();
        assert_eq!(payload.fields["labels"], json!(["backend", "urgent"]));
        assert_eq!(payload.fields["customfield_10016"], json!(5));
        // Reserved keys were consumed, not duplicated into the passthrough
        assert_eq!(payload.fields["project"], json!({"key": "ENG"}));
        assert_eq!(payload.fields.len(), 5);
    }

    #[test]
    fn test_payload_serializes_under_fields() {
        let mut fields = Map::new();
        fields.insert("summary".to_string(), json!("Fix bug"));
        let serialized = serde_json::to_value(IssuePayload { fields }).unwrap();
        assert_eq!(serialized, json!({"fields": {"summary": "Fix bug"}}));
    }
}
