//! Archiva policy engine.
//!
//! Five authorization models (MAC, DAC, RBAC, RuBAC, ABAC) evaluate the
//! same (subject, resource, context) triple; a dispatcher routes each
//! request to the evaluator matching the administrator-selected active
//! model. Evaluators are pure functions: they read their arguments and
//! the policy options, produce an [`AccessDecision`], and leave audit
//! writes to the caller.
//!
//! Key properties:
//! - Fail-closed dispatch: an unset or unparseable active model denies.
//! - Deterministic reason strings naming the model and rule that fired.
//! - First-match-wins chains (DAC, RBAC, ABAC) vs. the all-must-pass
//!   AND-chain of RuBAC, which surfaces the earliest-declared failure.
//! - Out-of-range clearance/classification values are clamped, never
//!   panicked on; the decision path is total.

pub mod abac;
pub mod dac;
pub mod dispatcher;
pub mod error;
pub mod mac;
pub mod rbac;
pub mod rubac;
pub mod types;

pub use dispatcher::{ActiveModelStore, Dispatcher, ModelChange, ACCESS_MODEL_KEY};
pub use error::{PolicyError, PolicyResult};
pub use types::{
    AccessDecision, PermissionGrant, PolicyOptions, RequestContext, Resource, ResourceRule,
    Subject, WorkingHours, ACTION_ACCESS, ACTION_APPROVE_LEAVE,
};
