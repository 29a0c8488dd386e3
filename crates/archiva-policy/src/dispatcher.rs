//! Model selection and dispatch.
//!
//! The active model is process-wide shared state: read on every decision,
//! written only through the administrator-gated [`ActiveModelStore::set_model`]
//! path, which persists to the settings collaborator before swapping the
//! in-memory value. Readers may observe a brief staleness window but never
//! a partial write (the value is replaced atomically under the lock).

use std::str::FromStr;
use std::sync::{Arc, RwLock};

use archiva_core::{AccessModel, Role, SettingsStore};

use crate::error::{PolicyError, PolicyResult};
use crate::types::{AccessDecision, PolicyOptions, RequestContext, Resource, Subject};
use crate::{abac, dac, mac, rbac, rubac};

/// Settings key under which the active model is persisted.
pub const ACCESS_MODEL_KEY: &str = "accessModel";

/// Outcome of an administrator model change, for audit and alerting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChange {
    pub from: Option<AccessModel>,
    pub to: AccessModel,
}

// ---------------------------------------------------------------------------
// ActiveModelStore
// ---------------------------------------------------------------------------

pub struct ActiveModelStore {
    current: RwLock<Option<AccessModel>>,
    settings: Arc<dyn SettingsStore>,
}

impl ActiveModelStore {
    /// Load the active model from settings storage. A valid persisted
    /// value wins; an absent value falls back to `default`; an
    /// unparseable value is treated as unset so dispatch fails closed.
    pub fn load(settings: Arc<dyn SettingsStore>, default: Option<AccessModel>) -> Self {
        let persisted = match settings.get(ACCESS_MODEL_KEY) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted access model");
                None
            }
        };

        let current = match persisted {
            Some(raw) => match AccessModel::from_str(&raw) {
                Ok(model) => Some(model),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "persisted access model is invalid; failing closed");
                    None
                }
            },
            None => default,
        };

        Self {
            current: RwLock::new(current),
            settings,
        }
    }

    /// The currently active model, if one is configured.
    pub fn current(&self) -> Option<AccessModel> {
        *self.current.read().expect("model lock poisoned")
    }

    /// Change the active model. Administrator-only; persists to settings
    /// storage before the in-memory swap, so a persistence failure leaves
    /// the running model unchanged.
    pub fn set_model(
        &self,
        model: AccessModel,
        administrator: &Subject,
    ) -> PolicyResult<ModelChange> {
        if administrator.role != Role::Admin {
            return Err(PolicyError::Unauthorized(
                "only system administrators can change access control models".to_string(),
            ));
        }

        self.settings
            .put(ACCESS_MODEL_KEY, model.as_str())
            .map_err(|e| PolicyError::Settings(e.to_string()))?;

        let mut current = self.current.write().expect("model lock poisoned");
        let change = ModelChange {
            from: *current,
            to: model,
        };
        *current = Some(model);

        tracing::info!(
            from = change.from.map(|m| m.as_str()).unwrap_or("unset"),
            to = model.as_str(),
            administrator = %administrator.id,
            "active access model changed"
        );
        Ok(change)
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes each request to the evaluator matching the active model.
/// No side effects beyond delegation; the caller owns the audit write.
pub struct Dispatcher {
    models: Arc<ActiveModelStore>,
    options: PolicyOptions,
}

impl Dispatcher {
    pub fn new(models: Arc<ActiveModelStore>, options: PolicyOptions) -> Self {
        Self { models, options }
    }

    pub fn options(&self) -> &PolicyOptions {
        &self.options
    }

    /// Evaluate one access request under the active model. Fails closed
    /// when no valid model is configured: never silently permit on a
    /// configuration fault.
    pub fn decide(
        &self,
        subject: &Subject,
        resource: &Resource,
        context: &RequestContext,
    ) -> AccessDecision {
        let Some(model) = self.models.current() else {
            return AccessDecision::deny(
                "Access control configuration fault: no valid active model is set; denying by default.",
            );
        };

        tracing::debug!(
            model = model.as_str(),
            subject = %subject.id,
            resource = %resource.id,
            action = %context.action,
            "dispatching access decision"
        );

        match model {
            AccessModel::Mac => mac::evaluate(subject, resource, context, &self.options),
            AccessModel::Dac => dac::evaluate(subject, resource, context, &self.options),
            AccessModel::Rbac => rbac::evaluate(subject, resource, context, &self.options),
            AccessModel::Rubac => rubac::evaluate(subject, resource, context, &self.options),
            AccessModel::Abac => abac::evaluate(subject, resource, context, &self.options),
        }
    }
}
