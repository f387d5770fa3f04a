use crate::credentials::CredentialStore;
use crate::errors::{GatewayError, Result};
use tracker::{AccountIdentity, Credentials, TrackerClient};

/// Verifies a candidate credential triple against the tracker and persists it
/// on success.
///
/// The "who am I" call proves the triple authenticates. Only then is the
/// store written; a rejection or transport failure persists nothing. A store
/// write that fails after the tracker accepted the triple is reported as the
/// distinct persistence failure, since the validation itself succeeded.
pub async fn validate_tenant(
    store: &dyn CredentialStore,
    client: &TrackerClient,
    tenant_key: &str,
    api_token: &str,
    domain: &str,
) -> Result<AccountIdentity> {
    if tenant_key.is_empty() || api_token.is_empty() || domain.is_empty() {
        return Err(GatewayError::Validation(
            "username, api_token, and domain are required".to_string(),
        ));
    }

    let creds = Credentials::new(domain, tenant_key, api_token);
    let identity = client.myself(&creds).await.inspect_err(|err| {
        tracing::warn!(tenant = tenant_key, error = %err, "tenant validation failed");
    })?;

    store
        .upsert(tenant_key, domain, api_token)
        .await
        .map_err(|err| GatewayError::Persistence(err.to_string()))?;

    tracing::info!(tenant = tenant_key, "tenant credentials validated and stored");
    Ok(identity)
}
