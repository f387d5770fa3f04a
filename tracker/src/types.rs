use serde::{Deserialize, Serialize};

/// Credentials for one tracker call. Every client operation takes these
/// explicitly; the client never holds credential state of its own.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// Tracker domain, e.g. "yourco.atlassian.net". A scheme may be included
    /// for non-TLS test servers; otherwise https is assumed.
    pub domain: String,
    /// Account email, the basic-auth username.
    pub email: String,
    pub api_token: String,
}

impl Credentials {
    pub fn new(domain: &str, email: &str, api_token: &str) -> Self {
        Credentials {
            domain: domain.to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
        }
    }
}

/// A tracker account as returned by user search and the "myself" endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdentity {
    pub account_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// A project as returned by the project listing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub key: String,
    pub name: String,
}

/// Identifiers of a freshly created issue, read from the 201 response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// A flattened issue row for listings. `assignee` carries the display name,
/// or the literal "Unassigned" when the issue has no assignee.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub created: String,
}

pub(crate) const UNASSIGNED: &str = "Unassigned";

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<SearchedIssue>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Deserialize)]
pub(crate) struct SearchedIssue {
    pub key: String,
    pub fields: SearchedIssueFields,
}

#[derive(Deserialize)]
pub(crate) struct SearchedIssueFields {
    #[serde(default)]
    pub summary: String,
    pub status: Option<SearchedStatus>,
    pub assignee: Option<SearchedAssignee>,
    #[serde(default)]
    pub created: String,
}

#[derive(Deserialize)]
pub(crate) struct SearchedStatus {
    pub name: String,
}

#[derive(Deserialize)]
pub(crate) struct SearchedAssignee {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl From<SearchedIssue> for IssueSummary {
    fn from(issue: SearchedIssue) -> Self {
        IssueSummary {
            key: issue.key,
            summary: issue.fields.summary,
            status: issue.fields.status.map(|s| s.name).unwrap_or_default(),
            assignee: issue
                .fields
                .assignee
                .map(|a| a.display_name)
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            created: issue.fields.created,
        }
    }
}
