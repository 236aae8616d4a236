//! Capability-gated operations
//!
//! [`guard`] is the reusable check: the wrapped operation runs only when the
//! required capability is in the caller's set. Every decision, granted or
//! denied, writes exactly one record to the audit logger.

use std::collections::BTreeSet;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::ports::{ActivityLogger, SharedLogger};
use crate::support::errors::{DomainError, DomainResult};

/// Capability required to rent or return a vehicle
pub const VERIFIED_USER: &str = "verified user";

/// Capabilities a caller holds for the duration of one operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, capability: impl Into<String>) -> Self {
        self.0.insert(capability.into());
        self
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Record the decision and turn it into a result. Shared by the sync and
/// async wrappers so both log exactly once.
fn decide(required: &str, granted: &CapabilitySet, audit: &dyn ActivityLogger) -> DomainResult<()> {
    if granted.contains(required) {
        audit.log(&format!("Access '{}' granted", required));
        metrics::counter!("permission_checks_total", "capability" => required.to_string(), "decision" => "granted")
            .increment(1);
        Ok(())
    } else {
        audit.log(&format!("Access '{}' denied", required));
        metrics::counter!("permission_checks_total", "capability" => required.to_string(), "decision" => "denied")
            .increment(1);
        Err(DomainError::PermissionDenied {
            capability: required.to_string(),
        })
    }
}

/// Run `operation` only if `required ∈ granted`.
///
/// On denial the operation is never invoked.
pub fn guard<T, F>(
    required: &str,
    granted: &CapabilitySet,
    audit: &dyn ActivityLogger,
    operation: F,
) -> DomainResult<T>
where
    F: FnOnce() -> DomainResult<T>,
{
    decide(required, granted, audit)?;
    operation()
}

/// Async counterpart of [`guard`]. The future is not created on denial.
pub async fn guard_async<T, F, Fut>(
    required: &str,
    granted: &CapabilitySet,
    audit: &dyn ActivityLogger,
    operation: F,
) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    decide(required, granted, audit)?;
    operation().await
}

/// A capability requirement bound to its audit log, reusable across calls
#[derive(Clone)]
pub struct PermissionGuard {
    required: String,
    audit: SharedLogger,
}

impl PermissionGuard {
    pub fn new(required: impl Into<String>, audit: SharedLogger) -> Self {
        Self {
            required: required.into(),
            audit,
        }
    }

    pub fn required(&self) -> &str {
        &self.required
    }

    pub fn audit(&self) -> SharedLogger {
        self.audit.clone()
    }

    pub fn check(&self, granted: &CapabilitySet) -> DomainResult<()> {
        decide(&self.required, granted, self.audit.as_ref())
    }

    pub fn run<T, F>(&self, granted: &CapabilitySet, operation: F) -> DomainResult<T>
    where
        F: FnOnce() -> DomainResult<T>,
    {
        guard(&self.required, granted, self.audit.as_ref(), operation)
    }

    pub async fn run_async<T, F, Fut>(&self, granted: &CapabilitySet, operation: F) -> DomainResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        guard_async(&self.required, granted, self.audit.as_ref(), operation).await
    }
}

impl std::fmt::Debug for PermissionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGuard")
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

// ── Tests ──────────────────────────────────────────────────────
