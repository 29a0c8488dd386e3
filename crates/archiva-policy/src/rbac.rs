//! Role-Based Access Control: an ordered branch chain per role.
//!
//! Branch order is load-bearing. The top-secret lockout (active only in
//! deployments that define a tier above the standard three) runs before
//! any per-role branch, so a higher classification overrides role-specific
//! allowances; swapping that order would silently change Manager and HR
//! behavior for maximum-classification resources.

use archiva_core::{Role, SecurityLevel};

use crate::types::{AccessDecision, PolicyOptions, RequestContext, Resource, Subject};

pub fn evaluate(
    subject: &Subject,
    resource: &Resource,
    _context: &RequestContext,
    options: &PolicyOptions,
) -> AccessDecision {
    // Deployment-defined top-secret tier locks out everyone but Admin,
    // ahead of the role branches.
    if let Some(top_secret) = options.rbac_top_secret {
        if resource.classification >= top_secret && subject.role != Role::Admin {
            return AccessDecision::deny(
                "RBAC: Top Secret classification restricted to Admin role.",
            );
        }
    }

    match subject.role {
        Role::Admin => AccessDecision::allow("RBAC: Admin role has full access."),

        Role::Manager => {
            if resource.department == "IT"
                && resource.classification >= SecurityLevel::Confidential
            {
                AccessDecision::deny("RBAC: Manager cannot access Confidential IT resources.")
            } else {
                AccessDecision::allow("RBAC: Manager role has access.")
            }
        }

        Role::Staff => {
            if resource.classification == SecurityLevel::Public {
                AccessDecision::allow("RBAC: Staff role has access to Public resources.")
            } else {
                AccessDecision::deny("RBAC: Staff role restricted to Public resources only.")
            }
        }

        Role::Hr => {
            if resource.department == "HR" {
                AccessDecision::allow("RBAC: HR role has access to HR department resources.")
            } else if resource.classification == SecurityLevel::Public {
                AccessDecision::allow("RBAC: HR role has access to Public resources.")
            } else {
                AccessDecision::deny(
                    "RBAC: HR role restricted to HR department and Public resources.",
                )
            }
        }

        Role::It => {
            if resource.department == "IT" || resource.classification == SecurityLevel::Public {
                AccessDecision::allow(
                    "RBAC: IT role has access to IT department and Public resources.",
                )
            } else {
                AccessDecision::deny(
                    "RBAC: IT role restricted to IT department and Public resources.",
                )
            }
        }
    }
}
