//! Multi-tenant mediation core between front-end clients and an external
//! issue tracker.
//!
//! Each tenant owns one set of tracker credentials, resolved per request
//! through the credential store; generic JSON payloads are translated into
//! the tracker's issue-creation schema, and composite views (project listings
//! with story counts, normalized issue and member listings) are built by
//! fanning out tracker calls and tolerating partial failures. The HTTP
//! routing layer that fronts these operations lives outside this crate.

pub mod aggregate;
pub mod assignee;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod payload;
pub mod service;
pub mod validation;

pub use aggregate::AggregateProjectView;
pub use config::Config;
pub use credentials::{CredentialStore, FilesystemStore, MemoryStore, TenantCredential};
pub use errors::{GatewayError, Result};
pub use payload::IssuePayload;
pub use service::Gateway;
