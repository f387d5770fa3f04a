use crate::errors::{Result, TrackerError};
use crate::types::{
    AccountIdentity, CreatedIssue, Credentials, IssueSummary, ProjectSummary, SearchResponse,
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Thin client over the tracker's REST surface.
///
/// Every operation is parameterized by the credentials resolved for the
/// current tenant; the client holds no ambient credential state. Each request
/// carries basic auth and a bounded timeout, and any non-2xx response is
/// surfaced with its status and body preserved verbatim.
#[derive(Clone)]
pub struct TrackerClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl TrackerClient {
    pub fn new(timeout_secs: u64) -> Self {
        TrackerClient {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Authenticated identity check, used to validate a candidate credential
    /// triple before it is persisted.
    pub async fn myself(&self, creds: &Credentials) -> Result<AccountIdentity> {
        let url = api_url(creds, "/rest/api/3/myself")?;
        let response = self.send(self.client.get(url), creds).await?;
        Ok(response.json().await?)
    }

    /// Searches tracker accounts for the given identifier (typically an
    /// email) and returns the first match, or `None` when the search comes
    /// back empty.
    pub async fn find_account_by_email(
        &self,
        creds: &Credentials,
        query: &str,
    ) -> Result<Option<AccountIdentity>> {
        let url = api_url(creds, "/rest/api/3/user/search")?;
        let request = self.client.get(url).query(&[("query", query)]);
        let response = self.send(request, creds).await?;
        let mut accounts: Vec<AccountIdentity> = response.json().await?;
        if accounts.is_empty() {
            tracing::debug!(query, "user search returned no accounts");
            return Ok(None);
        }
        Ok(Some(accounts.swap_remove(0)))
    }

    /// Creates an issue from a tracker-native payload and reads the new
    /// issue's id and key from the response body.
    pub async fn create_issue<P>(&self, creds: &Credentials, payload: &P) -> Result<CreatedIssue>
    where
        P: Serialize + ?Sized,
    {
        let url = api_url(creds, "/rest/api/3/issue")?;
        let request = self.client.post(url).json(payload);
        let response = self.send(request, creds).await?;
        Ok(response.json().await?)
    }

    pub async fn list_projects(&self, creds: &Credentials) -> Result<Vec<ProjectSummary>> {
        let url = api_url(creds, "/rest/api/3/project")?;
        let response = self.send(self.client.get(url), creds).await?;
        Ok(response.json().await?)
    }

    /// Counts the issues matching a JQL filter. Requests zero result rows and
    /// reads only the total metadata; issue bodies are never fetched to count
    /// them.
    pub async fn count_issues(&self, creds: &Credentials, jql: &str) -> Result<u64> {
        let url = api_url(creds, "/rest/api/3/search")?;
        let request = self
            .client
            .get(url)
            .query(&[("jql", jql), ("maxResults", "0")]);
        let response = self.send(request, creds).await?;
        let search: SearchResponse = response.json().await?;
        Ok(search.total)
    }

    /// Lists the accounts that issues in the given project can be assigned to.
    pub async fn list_assignable_users(
        &self,
        creds: &Credentials,
        project_key: &str,
    ) -> Result<Vec<AccountIdentity>> {
        let url = api_url(creds, "/rest/api/3/user/assignable/search")?;
        let request = self.client.get(url).query(&[("project", project_key)]);
        let response = self.send(request, creds).await?;
        Ok(response.json().await?)
    }

    /// Fetches up to `max_results` issues in a project, flattened to
    /// [`IssueSummary`] rows.
    pub async fn search_issues(
        &self,
        creds: &Credentials,
        project_key: &str,
        max_results: u32,
    ) -> Result<Vec<IssueSummary>> {
        let url = api_url(creds, "/rest/api/3/search")?;
        let jql = format!("project = \"{project_key}\" ORDER BY created DESC");
        let max_results = max_results.to_string();
        let request = self.client.get(url).query(&[
            ("jql", jql.as_str()),
            ("maxResults", max_results.as_str()),
            ("fields", "summary,status,assignee,created"),
        ]);
        let response = self.send(request, creds).await?;
        let search: SearchResponse = response.json().await?;
        Ok(search.issues.into_iter().map(IssueSummary::from).collect())
    }

    /// Attaches auth and timeout, sends, and turns non-2xx statuses into
    /// typed failures carrying the upstream body.
    async fn send(&self, request: RequestBuilder, creds: &Credentials) -> Result<Response> {
        let response = request
            .basic_auth(&creds.email, Some(&creds.api_token))
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "tracker returned an error");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TrackerError::Auth {
                status: status.as_u16(),
                body,
            }),
            _ => Err(TrackerError::Upstream {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl Default for TrackerClient {
    fn default() -> Self {
        TrackerClient::new(DEFAULT_TIMEOUT_SECS)
    }
}

fn api_url(creds: &Credentials, path: &str) -> Result<Url> {
    // Plain domains are assumed https; a full scheme is accepted as-is so
    // test servers can be reached over http.
    let base = if creds.domain.contains("://") {
        creds.domain.clone()
    } else {
        format!("https://{}", creds.domain)
    };
    Ok(Url::parse(&base)?.join(path)?)
}
