//! Attribute-Based Access Control: an ordered list of (condition, effect)
//! policies over subject, resource, and context attributes.
//!
//! First matching condition wins — contrast with RuBAC's AND-chain.
//! Policies are data, not imperative code, so the list can later move
//! into a stored policy table; what must survive any such move is the
//! strict ordering, because later generic policies (department match,
//! clearance fallback) would otherwise shadow the earlier specific ones
//! (the salary carve-outs). Reordering silently changes authorization
//! outcomes.

use archiva_core::{Role, SecurityLevel};

use crate::types::{AccessDecision, PolicyOptions, RequestContext, Resource, Subject};

type Predicate = fn(&Subject, &Resource, &RequestContext, &PolicyOptions) -> bool;

/// Effect applied when a policy's condition matches.
pub enum Effect {
    Allow,
    Deny,
    /// Allow only when the inner predicate holds; deny otherwise.
    AllowIf(Predicate),
}

/// One attribute policy. `reason` is the deterministic audit string for
/// whichever outcome the effect produces.
pub struct AbacPolicy {
    pub name: &'static str,
    pub reason: &'static str,
    pub condition: Predicate,
    pub effect: Effect,
}

fn resource_name_contains(resource: &Resource, needle: &str) -> bool {
    resource
        .name
        .as_deref()
        .map(|n| n.to_lowercase().contains(needle))
        .unwrap_or(false)
}

fn within_window_hours(context: &RequestContext, options: &PolicyOptions) -> bool {
    let hour = context.timestamp.hour_of_day();
    hour >= options.working_hours.start_hour && hour < options.working_hours.end_hour
}

/// The canonical policy list, in evaluation order.
pub fn policies() -> Vec<AbacPolicy> {
    vec![
        AbacPolicy {
            name: "admin-role",
            reason: "ABAC: Admin role attribute",
            condition: |s, _, _, _| s.role == Role::Admin,
            effect: Effect::Allow,
        },
        AbacPolicy {
            name: "department-match",
            reason: "ABAC: Department match with role requirements",
            // Confidential Finance resources are deferred to the
            // finance-working-hours policy; matching them here would
            // shadow the time gate for Finance managers.
            condition: |s, r, _, _| {
                s.department == r.department
                    && !(r.department == "Finance"
                        && r.classification == SecurityLevel::Confidential)
            },
            effect: Effect::AllowIf(|s, r, _, _| {
                if r.classification == SecurityLevel::Confidential {
                    matches!(s.role, Role::Manager | Role::Hr | Role::It)
                } else {
                    true
                }
            }),
        },
        AbacPolicy {
            name: "public-resource",
            reason: "ABAC: Public resource attribute",
            condition: |_, r, _, _| r.classification == SecurityLevel::Public,
            effect: Effect::Allow,
        },
        AbacPolicy {
            name: "finance-working-hours",
            reason: "ABAC: Finance department time-based access",
            condition: |s, r, _, _| r.department == "Finance" && s.department == "Finance",
            effect: Effect::AllowIf(|_, r, c, o| {
                if r.classification == SecurityLevel::Confidential {
                    within_window_hours(c, o)
                } else {
                    true
                }
            }),
        },
        AbacPolicy {
            name: "payroll-salary-access",
            reason: "ABAC: Payroll department salary access",
            condition: |s, r, _, _| {
                resource_name_contains(r, "salary") && s.department == "Payroll"
            },
            effect: Effect::Allow,
        },
        AbacPolicy {
            name: "it-salary-carveout",
            reason: "ABAC: IT department denied salary access",
            condition: |s, r, _, _| resource_name_contains(r, "salary") && s.department == "IT",
            effect: Effect::Deny,
        },
        AbacPolicy {
            name: "resource-owner",
            reason: "ABAC: Subject is resource owner attribute",
            condition: |s, r, _, _| r.owner_id == s.id,
            effect: Effect::Allow,
        },
        AbacPolicy {
            name: "manager-role",
            reason: "ABAC: Manager role attribute",
            condition: |s, _, _, _| s.role == Role::Manager,
            effect: Effect::AllowIf(|_, r, _, _| {
                !(r.department == "IT" && r.classification == SecurityLevel::Confidential)
            }),
        },
        AbacPolicy {
            name: "clearance-fallback",
            reason: "ABAC: Subject clearance level attribute sufficient for resource classification",
            condition: |s, r, _, _| s.clearance >= r.classification,
            effect: Effect::Allow,
        },
    ]
}

pub fn evaluate(
    subject: &Subject,
    resource: &Resource,
    context: &RequestContext,
    options: &PolicyOptions,
) -> AccessDecision {
    for policy in policies() {
        if !(policy.condition)(subject, resource, context, options) {
            continue;
        }
        let allowed = match policy.effect {
            Effect::Allow => true,
            Effect::Deny => false,
            Effect::AllowIf(predicate) => predicate(subject, resource, context, options),
        };
        return if allowed {
            AccessDecision::allow(policy.reason)
        } else {
            AccessDecision::deny(policy.reason)
        };
    }

    AccessDecision::deny("ABAC: No matching policy")
}
