use crate::aggregate::{self, AggregateProjectView};
use crate::config::TrackerConfig;
use crate::credentials::{CredentialStore, StoreError};
use crate::errors::{GatewayError, Result};
use crate::payload::build_issue_payload;
use crate::validation;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracker::{
    AccountIdentity, CreatedIssue, Credentials, IssueSummary, ProjectSummary, TrackerClient,
};

/// The operations surface consumed by the external routing layer.
///
/// Every operation takes an explicit tenant key and resolves that tenant's
/// credentials before touching the tracker; an unknown or inactive tenant is
/// a not-found error, never a default credential set.
pub struct Gateway {
    store: Arc<dyn CredentialStore>,
    client: TrackerClient,
    issue_page_size: u32,
    default_issue_type: String,
}

impl Gateway {
    pub fn new(store: Arc<dyn CredentialStore>, config: &TrackerConfig) -> Self {
        Gateway {
            store,
            client: TrackerClient::new(config.timeout_secs),
            issue_page_size: config.issue_page_size,
            default_issue_type: config.default_issue_type.clone(),
        }
    }

    /// Verifies a candidate credential triple against the tracker and stores
    /// it for the tenant on success.
    pub async fn validate_tenant(
        &self,
        tenant_key: &str,
        api_token: &str,
        domain: &str,
    ) -> Result<AccountIdentity> {
        validation::validate_tenant(
            self.store.as_ref(),
            &self.client,
            tenant_key,
            api_token,
            domain,
        )
        .await
    }

    /// Creates an issue in the tenant's tracker from a loosely-typed input
    /// document.
    pub async fn create_issue(
        &self,
        tenant_key: &str,
        request: &Map<String, Value>,
    ) -> Result<CreatedIssue> {
        let creds = self.credentials_for(tenant_key).await?;
        let payload =
            build_issue_payload(&self.client, &creds, request, &self.default_issue_type).await?;
        let created = self.client.create_issue(&creds, &payload).await?;
        tracing::info!(tenant = tenant_key, issue = %created.key, "created issue");
        Ok(created)
    }

    pub async fn list_projects(&self, tenant_key: &str) -> Result<Vec<ProjectSummary>> {
        let creds = self.credentials_for(tenant_key).await?;
        Ok(self.client.list_projects(&creds).await?)
    }

    /// Project listing enriched with per-project story counts; one count's
    /// failure degrades that entry rather than the response.
    pub async fn list_projects_with_counts(
        &self,
        tenant_key: &str,
    ) -> Result<Vec<AggregateProjectView>> {
        let creds = self.credentials_for(tenant_key).await?;
        aggregate::projects_with_counts(&self.client, &creds, &self.default_issue_type).await
    }

    pub async fn team_members(
        &self,
        tenant_key: &str,
        project_key: &str,
    ) -> Result<Vec<AccountIdentity>> {
        require_project_key(project_key)?;
        let creds = self.credentials_for(tenant_key).await?;
        Ok(self
            .client
            .list_assignable_users(&creds, project_key)
            .await?)
    }

    pub async fn list_issues(
        &self,
        tenant_key: &str,
        project_key: &str,
    ) -> Result<Vec<IssueSummary>> {
        require_project_key(project_key)?;
        let creds = self.credentials_for(tenant_key).await?;
        aggregate::list_issues_for_project(&self.client, &creds, project_key, self.issue_page_size)
            .await
    }

    pub async fn story_count(&self, tenant_key: &str, project_key: &str) -> Result<u64> {
        require_project_key(project_key)?;
        let creds = self.credentials_for(tenant_key).await?;
        let jql = aggregate::count_filter(project_key, &self.default_issue_type);
        Ok(self.client.count_issues(&creds, &jql).await?)
    }

    async fn credentials_for(&self, tenant_key: &str) -> Result<Credentials> {
        if tenant_key.is_empty() {
            return Err(GatewayError::Validation("tenant key is required".into()));
        }
        match self.store.resolve(tenant_key).await {
            Ok(record) => Ok(record.tracker_credentials()),
            Err(StoreError::NotFound(key)) => Err(GatewayError::TenantNotFound(key)),
            Err(err) => Err(GatewayError::Persistence(err.to_string())),
        }
    }
}

fn require_project_key(project_key: &str) -> Result<()> {
    if project_key.is_empty() {
        return Err(GatewayError::Validation("project_key is required".into()));
    }
    Ok(())
}
