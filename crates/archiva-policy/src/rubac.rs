//! Rule-Based Access Control: an ordered AND-chain.
//!
//! Unlike the first-match-wins chains of the other evaluators, every
//! declared rule must pass. Declaration order does not change the AND
//! result but does pick which reason surfaces: the earliest-declared
//! failing rule becomes the decision's reason, keeping the output
//! deterministic no matter how many rules fail.

use archiva_core::Role;

use crate::types::{
    AccessDecision, PolicyOptions, RequestContext, Resource, ResourceRule, Subject,
    ACTION_APPROVE_LEAVE,
};

struct RuleOutcome {
    passed: bool,
    reason: String,
}

impl RuleOutcome {
    fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            reason: reason.into(),
        }
    }

    fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: reason.into(),
        }
    }
}

pub fn evaluate(
    subject: &Subject,
    resource: &Resource,
    context: &RequestContext,
    options: &PolicyOptions,
) -> AccessDecision {
    let mut outcomes = Vec::new();

    // Rule 1: working-hours window.
    if options.working_hours.contains(context.timestamp) {
        outcomes.push(RuleOutcome::pass("RuBAC: Within working hours"));
    } else if subject.role == Role::Admin {
        outcomes.push(RuleOutcome::pass("RuBAC: Admin override for working hours"));
    } else if context.preapproved {
        outcomes.push(RuleOutcome::pass(
            "RuBAC: Preapproved access outside working hours",
        ));
    } else {
        let window = &options.working_hours;
        let days = if window.weekdays_only { ", Mon-Fri" } else { "" };
        outcomes.push(RuleOutcome::fail(format!(
            "RuBAC: Access denied outside working hours ({:02}:00 - {:02}:00{})",
            window.start_hour, window.end_hour, days
        )));
    }

    // Rule 2: location allow-list.
    if options.allowed_locations.contains(&context.location) {
        outcomes.push(RuleOutcome::pass(format!(
            "RuBAC: Allowed location: {}",
            context.location
        )));
    } else if subject.role == Role::Admin {
        outcomes.push(RuleOutcome::pass("RuBAC: Admin override for location"));
    } else {
        outcomes.push(RuleOutcome::fail(format!(
            "RuBAC: Access denied from location: {}",
            context.location
        )));
    }

    // Rule 3: device allow-list.
    if options.allowed_devices.contains(&context.device) {
        outcomes.push(RuleOutcome::pass(format!(
            "RuBAC: Allowed device: {}",
            context.device
        )));
    } else if subject.role == Role::Admin {
        outcomes.push(RuleOutcome::pass("RuBAC: Admin override for device"));
    } else {
        outcomes.push(RuleOutcome::fail(format!(
            "RuBAC: Access denied from device: {}",
            context.device
        )));
    }

    // Rule 4: resource-attached conditions, in declared order.
    for rule in &resource.rules {
        outcomes.push(evaluate_resource_rule(rule, subject));
    }

    // Rule 5: business rule keyed by action.
    if context.action == ACTION_APPROVE_LEAVE {
        outcomes.push(evaluate_leave_approval(subject, context, options));
    }

    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.passed)
        .map(|o| o.reason.clone())
        .collect();

    if let Some(first) = failed.first() {
        AccessDecision::deny_with_failures(first.clone(), failed)
    } else {
        AccessDecision::allow("RuBAC: All rules passed")
    }
}

fn evaluate_resource_rule(rule: &ResourceRule, subject: &Subject) -> RuleOutcome {
    match rule {
        ResourceRule::Role(any_of) => {
            let names: Vec<String> = any_of.iter().map(|r| r.to_string()).collect();
            let wanted = names.join("/");
            if any_of.contains(&subject.role) {
                RuleOutcome::pass(format!("RuBAC: Subject has required role {}", wanted))
            } else {
                RuleOutcome::fail(format!("RuBAC: Subject lacks required role {}", wanted))
            }
        }
        ResourceRule::Department(value) => {
            if subject.department == *value {
                RuleOutcome::pass(format!("RuBAC: Subject department matches {}", value))
            } else {
                RuleOutcome::fail(format!("RuBAC: Subject department does not match {}", value))
            }
        }
    }
}

fn evaluate_leave_approval(
    subject: &Subject,
    context: &RequestContext,
    options: &PolicyOptions,
) -> RuleOutcome {
    let days = context.leave_days.unwrap_or(0);
    if days <= options.leave_days_threshold {
        return RuleOutcome::pass("RuBAC: Leave request within standard approval limits");
    }

    let authorized = subject.role == Role::Admin
        || (subject.department == "HR"
            && matches!(subject.role, Role::Hr | Role::Manager));
    if authorized {
        RuleOutcome::pass("RuBAC: Approver authorized for extended leave")
    } else {
        RuleOutcome::fail(format!(
            "RuBAC: Leave approval over {} days requires an HR-department HR/Manager or an Admin",
            options.leave_days_threshold
        ))
    }
}
