use crate::errors::Result;
use serde::Serialize;
use tokio::task::JoinSet;
use tracker::{Credentials, IssueSummary, TrackerClient};

/// A project enriched with its story count. `story_count` is absent, not
/// zero, when the count call failed; the two must never be conflated.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AggregateProjectView {
    pub key: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_count: Option<u64>,
}

/// JQL filter scoping a count to one project and issue type.
pub fn count_filter(project_key: &str, issue_type: &str) -> String {
    format!("project = \"{project_key}\" AND issuetype = \"{issue_type}\"")
}

/// Lists all projects and enriches each with an independently fetched story
/// count.
///
/// The count calls fan out in parallel; each failure is isolated to its own
/// entry, which keeps an absent count while the siblings proceed. Only a
/// failure of the initial project listing fails the whole operation. Output
/// order follows the listing order regardless of completion order.
pub async fn projects_with_counts(
    client: &TrackerClient,
    creds: &Credentials,
    issue_type: &str,
) -> Result<Vec<AggregateProjectView>> {
    let projects = client.list_projects(creds).await?;

    let mut join_set = JoinSet::new();
    for (index, project) in projects.iter().enumerate() {
        let client = client.clone();
        let creds = creds.clone();
        let jql = count_filter(&project.key, issue_type);
        join_set.spawn(async move { (index, client.count_issues(&creds, &jql).await) });
    }

    let mut views: Vec<AggregateProjectView> = projects
        .into_iter()
        .map(|project| AggregateProjectView {
            key: project.key,
            name: project.name,
            story_count: None,
        })
        .collect();

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(count))) => views[index].story_count = Some(count),
            Ok((index, Err(err))) => {
                let view = &views[index];
                tracing::warn!(project = %view.key, error = %err, "story count failed, leaving it absent");
            }
            Err(err) => tracing::error!("count task panicked: {err}"),
        }
    }

    Ok(views)
}

/// Fetches one page of issues for a project. There is a single underlying
/// call, so its failure aborts the whole operation; no partial list.
pub async fn list_issues_for_project(
    client: &TrackerClient,
    creds: &Credentials,
    project_key: &str,
    page_size: u32,
) -> Result<Vec<IssueSummary>> {
    let issues = client.search_issues(creds, project_key, page_size).await?;
    tracing::debug!(project = project_key, count = issues.len(), "fetched issue listing");
    Ok(issues)
}
