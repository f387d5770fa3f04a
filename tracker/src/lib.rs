//! Client for an issue tracker's REST surface.
//!
//! Exposes narrow, purpose-built operations (user search, issue creation,
//! project listing, issue search/count, assignable-user search) rather than a
//! raw HTTP passthrough. Every call is independently authenticated with the
//! credentials passed in, and failures carry the upstream status and body
//! verbatim so callers can surface them unchanged.

pub mod client;
pub mod errors;
pub mod types;

pub use client::TrackerClient;
pub use errors::{Result, TrackerError};
pub use types::{AccountIdentity, CreatedIssue, Credentials, IssueSummary, ProjectSummary};
