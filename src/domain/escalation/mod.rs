//! Tiered escalation of station change requests
//!
//! Handlers are wired tail-first into an immutable chain
//! `StationOperator → Manager → Admin`. Each handler either resolves a
//! request or hands it to its successor. Admin resolves everything, so a
//! chain ending in Admin never leaves a request unresolved.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Change type the station operator resolves
pub const EASY: &str = "easy";
/// Change type the manager resolves
pub const MIDDLE: &str = "middle";

/// Administrative change request; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: Uuid,
    /// Free-form classification; `"easy"` and `"middle"` are recognised
    pub change_type: String,
    pub description: String,
}

impl ChangeRequest {
    pub fn new(change_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            change_type: change_type.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for ChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.change_type, self.description)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerRole {
    StationOperator,
    Manager,
    Admin,
}

impl HandlerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StationOperator => "station_operator",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for HandlerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a request left the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Resolved { by: HandlerRole },
    /// The chain ended at `last` without a handler accepting the request
    Unresolved { last: HandlerRole },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

pub trait ChangeHandler: Send + Sync {
    fn role(&self) -> HandlerRole;
    fn handle(&self, request: &ChangeRequest) -> Resolution;
}

pub type SharedHandler = Arc<dyn ChangeHandler>;

fn resolved(role: HandlerRole, request: &ChangeRequest) -> Resolution {
    info!(role = %role, request_id = %request.id, change_type = %request.change_type, "Change request resolved");
    metrics::counter!("change_requests_total", "resolved_by" => role.as_str()).increment(1);
    Resolution::Resolved { by: role }
}

/// Delegate to `next`, or report the request as unresolved at `role`.
fn escalate(role: HandlerRole, next: Option<&SharedHandler>, request: &ChangeRequest) -> Resolution {
    match next {
        Some(next) => next.handle(request),
        None => {
            warn!(role = %role, request_id = %request.id, change_type = %request.change_type, "Change request could not be resolved");
            metrics::counter!("change_requests_total", "resolved_by" => "none").increment(1);
            Resolution::Unresolved { last: role }
        }
    }
}

/// Resolves `"easy"` requests
pub struct StationOperator {
    next: Option<SharedHandler>,
}

impl StationOperator {
    pub fn new(next: Option<SharedHandler>) -> Self {
        Self { next }
    }
}

impl ChangeHandler for StationOperator {
    fn role(&self) -> HandlerRole {
        HandlerRole::StationOperator
    }

    fn handle(&self, request: &ChangeRequest) -> Resolution {
        if request.change_type == EASY {
            resolved(self.role(), request)
        } else {
            escalate(self.role(), self.next.as_ref(), request)
        }
    }
}

/// Resolves `"middle"` requests
pub struct Manager {
    next: Option<SharedHandler>,
}

impl Manager {
    pub fn new(next: Option<SharedHandler>) -> Self {
        Self { next }
    }
}

impl ChangeHandler for Manager {
    fn role(&self) -> HandlerRole {
        HandlerRole::Manager
    }

    fn handle(&self, request: &ChangeRequest) -> Resolution {
        if request.change_type == MIDDLE {
            resolved(self.role(), request)
        } else {
            escalate(self.role(), self.next.as_ref(), request)
        }
    }
}

/// Terminal handler; resolves unconditionally
#[derive(Debug, Default)]
pub struct Admin;

impl ChangeHandler for Admin {
    fn role(&self) -> HandlerRole {
        HandlerRole::Admin
    }

    fn handle(&self, request: &ChangeRequest) -> Resolution {
        resolved(self.role(), request)
    }
}

/// An assembled chain. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct EscalationChain {
    head: SharedHandler,
}

impl EscalationChain {
    /// `StationOperator → Manager → Admin`
    pub fn standard() -> Self {
        let admin: SharedHandler = Arc::new(Admin);
        let manager: SharedHandler = Arc::new(Manager::new(Some(admin)));
        Self {
            head: Arc::new(StationOperator::new(Some(manager))),
        }
    }

    /// Build a chain in the given order, wiring from the tail.
    ///
    /// `Admin` has no successor, so roles after it are discarded. Returns
    /// `None` for an empty list.
    pub fn from_roles(roles: &[HandlerRole]) -> Option<Self> {
        let mut next: Option<SharedHandler> = None;
        for role in roles.iter().rev() {
            let handler: SharedHandler = match role {
                HandlerRole::StationOperator => Arc::new(StationOperator::new(next.take())),
                HandlerRole::Manager => Arc::new(Manager::new(next.take())),
                HandlerRole::Admin => Arc::new(Admin),
            };
            next = Some(handler);
        }
        next.map(|head| Self { head })
    }

    pub fn head_role(&self) -> HandlerRole {
        self.head.role()
    }

    pub fn submit(&self, request: &ChangeRequest) -> Resolution {
        self.head.handle(request)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_stops_at_operator() {
        let chain = EscalationChain::standard();
        let resolution = chain.submit(&ChangeRequest::new("easy", "replace cable"));
        assert_eq!(resolution, Resolution::Resolved { by: HandlerRole::StationOperator });
    }

    #[test]
    fn middle_stops_at_manager() {
        let chain = EscalationChain::standard();
        let resolution = chain.submit(&ChangeRequest::new("middle", "change tariff"));
        assert_eq!(resolution, Resolution::Resolved { by: HandlerRole::Manager });
    }

    #[test]
    fn anything_else_reaches_admin() {
        let chain = EscalationChain::standard();
        for change_type in ["urgent", "", "EASY", "Middle"] {
            let resolution = chain.submit(&ChangeRequest::new(change_type, "relocate station"));
            assert_eq!(resolution, Resolution::Resolved { by: HandlerRole::Admin });
        }
    }

    #[test]
    fn chain_without_admin_reports_unresolved() {
        let chain = EscalationChain::from_roles(&[HandlerRole::StationOperator, HandlerRole::Manager]).unwrap();

        let resolution = chain.submit(&ChangeRequest::new("urgent", "relocate station"));
        assert_eq!(resolution, Resolution::Unresolved { last: HandlerRole::Manager });
        assert!(!resolution.is_resolved());

        // Recognised types still resolve
        assert!(chain.submit(&ChangeRequest::new("easy", "x")).is_resolved());
    }

    #[test]
    fn lone_operator_reports_itself_unresolved() {
        let operator = StationOperator::new(None);
        assert_eq!(
            operator.handle(&ChangeRequest::new("middle", "x")),
            Resolution::Unresolved { last: HandlerRole::StationOperator }
        );
    }

    #[test]
    fn from_roles_preserves_order() {
        let chain = EscalationChain::from_roles(&[HandlerRole::Manager, HandlerRole::Admin]).unwrap();
        assert_eq!(chain.head_role(), HandlerRole::Manager);
        // Manager first: "easy" is not its type, so Admin takes it
        assert_eq!(
            chain.submit(&ChangeRequest::new("easy", "x")),
            Resolution::Resolved { by: HandlerRole::Admin }
        );
        assert!(EscalationChain::from_roles(&[]).is_none());
    }

    #[test]
    fn roles_after_admin_are_discarded() {
        let chain = EscalationChain::from_roles(&[
            HandlerRole::Admin,
            HandlerRole::StationOperator,
            HandlerRole::Manager,
        ])
        .unwrap();
        assert_eq!(chain.head_role(), HandlerRole::Admin);
        for change_type in [EASY, MIDDLE] {
            assert_eq!(
                chain.submit(&ChangeRequest::new(change_type, "x")),
                Resolution::Resolved { by: HandlerRole::Admin }
            );
        }
    }

    #[test]
    fn concurrent_submissions_share_the_chain() {
        let chain = EscalationChain::standard();
        let handles: Vec<_> = ["easy", "middle", "other"]
            .into_iter()
            .map(|t| {
                let chain = chain.clone();
                std::thread::spawn(move || chain.submit(&ChangeRequest::new(t, "parallel")))
            })
            .collect();

        let roles: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(
            roles,
            vec![
                Resolution::Resolved { by: HandlerRole::StationOperator },
                Resolution::Resolved { by: HandlerRole::Manager },
                Resolution::Resolved { by: HandlerRole::Admin },
            ]
        );
    }
}
