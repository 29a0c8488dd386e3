use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use archiva_core::{Permission, ResourceId, Role, SecurityLevel, SubjectId, Timestamp};

/// Default action tag for a plain resource access attempt.
pub const ACTION_ACCESS: &str = "ACCESS";

/// Action tag for the leave-approval business rule (RuBAC).
pub const ACTION_APPROVE_LEAVE: &str = "APPROVE_LEAVE";

// ---------------------------------------------------------------------------
// Subject — user attributes relevant to access decisions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub username: String,
    pub role: Role,
    /// Organizational department; "All" when unassigned.
    pub department: String,
    pub clearance: SecurityLevel,
}

impl Subject {
    pub fn new(id: impl Into<SubjectId>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
            department: "All".to_string(),
            clearance: SecurityLevel::Public,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_clearance(mut self, clearance: SecurityLevel) -> Self {
        self.clearance = clearance;
        self
    }
}

// ---------------------------------------------------------------------------
// Resource — archived document attributes relevant to access decisions
// ---------------------------------------------------------------------------

/// One discretionary grant on a resource: which permissions a grantee
/// holds, who granted them, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub permissions: BTreeSet<Permission>,
    pub granted_by: SubjectId,
    pub granted_at: Timestamp,
}

/// A resource-attached RuBAC condition. Evaluated independently and
/// appended to the evaluator's AND-chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum ResourceRule {
    /// Subject must hold one of the listed roles.
    Role(Vec<Role>),
    /// Subject's department must equal the given value.
    Department(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub owner_id: SubjectId,
    /// Display name; examined by substring match for name-keyed policies
    /// (e.g. "salary" under ABAC).
    pub name: Option<String>,
    pub department: String,
    pub classification: SecurityLevel,
    /// Subjects granted discretionary access by the owner.
    pub shared_with: HashSet<SubjectId>,
    /// Per-subject permission grants.
    pub grants: HashMap<SubjectId, PermissionGrant>,
    /// Optional resource-specific rules for RuBAC.
    pub rules: Vec<ResourceRule>,
}

impl Resource {
    pub fn new(id: impl Into<ResourceId>, owner_id: impl Into<SubjectId>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            name: None,
            department: "All".to_string(),
            classification: SecurityLevel::Public,
            shared_with: HashSet::new(),
            grants: HashMap::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn with_classification(mut self, classification: SecurityLevel) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_rule(mut self, rule: ResourceRule) -> Self {
        self.rules.push(rule);
        self
    }
}

// ---------------------------------------------------------------------------
// RequestContext — request-time attributes, supplied by the caller
// ---------------------------------------------------------------------------

/// Attributes of the request itself, never persisted with the resource.
/// The timestamp is injected by the caller so time-based rules evaluate
/// deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    pub action: String,
    pub location: String,
    pub device: String,
    pub preapproved: bool,
    /// Leave-days count for the leave-approval business rule.
    pub leave_days: Option<u32>,
    pub address: String,
    pub timestamp: Timestamp,
}

impl RequestContext {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            action: ACTION_ACCESS.to_string(),
            location: "office".to_string(),
            device: "company-laptop".to_string(),
            preapproved: false,
            leave_days: None,
            address: "127.0.0.1".to_string(),
            timestamp,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn preapproved(mut self) -> Self {
        self.preapproved = true;
        self
    }

    pub fn with_leave_days(mut self, days: u32) -> Self {
        self.leave_days = Some(days);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
}

// ---------------------------------------------------------------------------
// AccessDecision — the evaluator output
// ---------------------------------------------------------------------------

/// Outcome of one evaluation. The reason string is the audit record: it
/// names the model and the rule that fired, and is deterministic given
/// identical inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: String,
    /// Reasons of every failed sub-rule (RuBAC only; empty elsewhere).
    pub failed_rules: Vec<String>,
}

impl AccessDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
            failed_rules: Vec::new(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            failed_rules: Vec::new(),
        }
    }

    pub fn deny_with_failures(reason: impl Into<String>, failed_rules: Vec<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            failed_rules,
        }
    }
}

// ---------------------------------------------------------------------------
// PolicyOptions — deployment-level evaluator configuration
// ---------------------------------------------------------------------------

/// Business-hours window for the RuBAC working-hours rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingHours {
    /// First permitted hour, inclusive.
    pub start_hour: u32,
    /// First hour past the window, exclusive.
    pub end_hour: u32,
    /// Whether weekends fall outside the window.
    pub weekdays_only: bool,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            weekdays_only: true,
        }
    }
}

impl WorkingHours {
    pub fn contains(&self, at: Timestamp) -> bool {
        let hour = at.hour_of_day();
        if hour < self.start_hour || hour >= self.end_hour {
            return false;
        }
        if self.weekdays_only && at.is_weekend() {
            return false;
        }
        true
    }
}

/// Deployment policy knobs shared by the evaluators. Injected into the
/// dispatcher so evaluators stay testable with arbitrary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyOptions {
    /// DAC rule 3: Admin may access unshared resources. Documented as
    /// bypassable by deployment policy.
    pub dac_admin_override: bool,

    /// When a deployment defines a tier above the standard three,
    /// resources at that level deny everyone but Admin before the
    /// per-role RBAC branches run. None in the reference deployment.
    pub rbac_top_secret: Option<SecurityLevel>,

    pub working_hours: WorkingHours,
    pub allowed_locations: Vec<String>,
    pub allowed_devices: Vec<String>,

    /// Leave requests above this many days need an HR-department
    /// approver (HR or Manager role) or an Admin.
    pub leave_days_threshold: u32,
}

impl Default for PolicyOptions {
    fn default() -> Self {
        Self {
            dac_admin_override: true,
            rbac_top_secret: None,
            working_hours: WorkingHours::default(),
            allowed_locations: vec!["office".to_string(), "remote-vpn".to_string()],
            allowed_devices: vec![
                "company-laptop".to_string(),
                "company-mobile".to_string(),
            ],
            leave_days_threshold: 10,
        }
    }
}
