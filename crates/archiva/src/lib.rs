//! Archiva security kernel.
//!
//! Root orchestration layer for the document-archive access stack. Wires
//! the policy dispatcher, the audit trail, and the alerting pipeline into
//! one [`SecurityKernel`] facade: every access decision flows through
//! [`SecurityKernel::decide`], which dispatches to the active model's
//! evaluator, records the outcome in the audit trail, and, on denial,
//! kicks the suspicious-access detector.
//!
//! Persistence, transport, and delivery concerns stay behind the
//! collaborator traits in `archiva-core`; the kernel works the same over
//! in-memory stores (tests, embedding) and real backends.

pub mod config;
pub mod error;

pub use config::{AlertConfig, ArchivaConfig, RulesConfig};
pub use error::{KernelError, KernelResult};

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use archiva_alert::{
    spawn_periodic_sweep, Alert, AlertKind, AlertPipeline, AlertStore, SweepHandle,
};
use archiva_core::{
    actions, AccessModel, AlertSink, AuditLog, AuditRecord, AuditStatus, InMemoryAlertSink,
    InMemoryAuditLog, InMemoryPermissionLedger, InMemorySettingsStore, Permission,
    PermissionLedger, PermissionLogEntry, SettingsStore, SubjectId, Timestamp,
};
use archiva_policy::{
    dac, AccessDecision, ActiveModelStore, Dispatcher, ModelChange, RequestContext, Resource,
    Subject,
};

/// Collaborator backends for the kernel. Production embeds real
/// persistence behind these traits; tests use the in-memory set.
pub struct KernelStores {
    pub audit: Arc<dyn AuditLog>,
    pub ledger: Arc<dyn PermissionLedger>,
    pub alert_sink: Arc<dyn AlertSink>,
    pub settings: Arc<dyn SettingsStore>,
}

impl KernelStores {
    pub fn in_memory() -> Self {
        Self {
            audit: Arc::new(InMemoryAuditLog::new()),
            ledger: Arc::new(InMemoryPermissionLedger::new()),
            alert_sink: Arc::new(InMemoryAlertSink::new()),
            settings: Arc::new(InMemorySettingsStore::new()),
        }
    }
}

/// The kernel facade. One instance per process; cheap to share behind
/// an `Arc`.
pub struct SecurityKernel {
    config: ArchivaConfig,
    audit: Arc<dyn AuditLog>,
    ledger: Arc<dyn PermissionLedger>,
    models: Arc<ActiveModelStore>,
    dispatcher: Dispatcher,
    pipeline: Arc<AlertPipeline>,
}

impl SecurityKernel {
    pub fn new(config: ArchivaConfig, stores: KernelStores) -> KernelResult<Self> {
        config.validate()?;

        let models = Arc::new(ActiveModelStore::load(
            stores.settings.clone(),
            config.parsed_default_model(),
        ));
        let dispatcher = Dispatcher::new(models.clone(), config.policy_options());

        let store = Arc::new(AlertStore::new(
            config.alerts.capacity,
            stores.alert_sink,
            stores.audit.clone(),
        ));
        let pipeline = Arc::new(AlertPipeline::new(
            store,
            stores.audit.clone(),
            config.detector_thresholds(),
            config.alerts.sweep_slice_len,
        ));

        info!(
            default_model = %config.default_model,
            active_model = models.current().map(|m| m.as_str()).unwrap_or("unset"),
            "security kernel initialized"
        );

        Ok(Self {
            config,
            audit: stores.audit,
            ledger: stores.ledger,
            models,
            dispatcher,
            pipeline,
        })
    }

    pub fn config(&self) -> &ArchivaConfig {
        &self.config
    }

    // -----------------------------------------------------------------
    // Access decisions
    // -----------------------------------------------------------------

    /// Evaluate one access request under the active model, record the
    /// outcome in the audit trail, and on denial run the
    /// suspicious-access check off-thread. Audit and detection are best
    /// effort; the decision is always returned.
    pub fn decide(
        &self,
        subject: &Subject,
        resource: &Resource,
        context: &RequestContext,
    ) -> AccessDecision {
        let decision = self.dispatcher.decide(subject, resource, context);

        let status = if decision.allowed {
            AuditStatus::Success
        } else {
            AuditStatus::Denied
        };
        let record = AuditRecord::new(
            subject.id.clone(),
            subject.username.clone(),
            actions::FILE_ACCESS,
            format!("{} {}: {}", context.action, resource.id, decision.reason),
            status,
            context.address.clone(),
        )
        .at(context.timestamp);
        if let Err(err) = self.audit.append(record) {
            warn!(subject = %subject.id, resource = %resource.id, %err, "audit append failed");
        }

        if !decision.allowed {
            let pipeline = self.pipeline.clone();
            let at = context.timestamp;
            thread::spawn(move || {
                if let Err(err) = pipeline.run_denial_check_at(at) {
                    warn!(%err, "post-denial check failed");
                }
            });
        }

        decision
    }

    // -----------------------------------------------------------------
    // Model administration
    // -----------------------------------------------------------------

    pub fn get_active_model(&self) -> Option<AccessModel> {
        self.models.current()
    }

    /// Switch the active access model. Administrator-only. Persists the
    /// new model, audits the change, and raises a ConfigChange alert.
    pub fn set_active_model(
        &self,
        model: AccessModel,
        administrator: &Subject,
        now: Timestamp,
    ) -> KernelResult<ModelChange> {
        let change = self.models.set_model(model, administrator)?;

        let detail = format!(
            "accessModel: {} -> {}",
            change.from.map(|m| m.as_str()).unwrap_or("unset"),
            change.to.as_str()
        );
        let record = AuditRecord::new(
            administrator.id.clone(),
            administrator.username.clone(),
            actions::CONFIG_CHANGE,
            detail.clone(),
            AuditStatus::Success,
            "127.0.0.1",
        )
        .at(now);
        if let Err(err) = self.audit.append(record) {
            warn!(%err, "config-change audit append failed");
        }

        self.pipeline
            .config_change(administrator.id.clone(), &administrator.username, &detail, now);

        Ok(change)
    }

    // -----------------------------------------------------------------
    // DAC sharing
    // -----------------------------------------------------------------

    /// Share `resource` with `grantee`, recording the grant in the
    /// permission ledger.
    pub fn grant_access(
        &self,
        resource: &mut Resource,
        grantor: &Subject,
        grantee: &SubjectId,
        permissions: &[Permission],
        now: Timestamp,
    ) -> KernelResult<PermissionLogEntry> {
        Ok(dac::grant_access(
            resource,
            grantor,
            grantee,
            permissions,
            self.ledger.as_ref(),
            now,
        )?)
    }

    /// Revoke `grantee`'s share of `resource`.
    pub fn revoke_access(
        &self,
        resource: &mut Resource,
        grantor: &Subject,
        grantee: &SubjectId,
        now: Timestamp,
    ) -> KernelResult<PermissionLogEntry> {
        Ok(dac::revoke_access(
            resource,
            grantor,
            grantee,
            self.ledger.as_ref(),
            now,
        )?)
    }

    // -----------------------------------------------------------------
    // Alerting
    // -----------------------------------------------------------------

    /// Run all detectors over the recent audit trail now. Returns the
    /// number of new alerts recorded.
    pub fn run_detectors(&self) -> KernelResult<usize> {
        Ok(self.pipeline.run_detectors()?)
    }

    /// Detector pass with an explicit reference instant.
    pub fn run_detectors_at(&self, now: Timestamp) -> KernelResult<usize> {
        Ok(self.pipeline.run_detectors_at(now)?)
    }

    pub fn list_alerts(&self, limit: usize) -> Vec<Alert> {
        self.pipeline.store().list(limit)
    }

    pub fn acknowledge_alert(&self, id: &str, now: Timestamp) -> KernelResult<Alert> {
        Ok(self.pipeline.store().acknowledge(id, now)?)
    }

    /// Raise an AccountLocked alert directly, bypassing the detectors.
    pub fn report_account_locked(&self, subject_id: SubjectId, username: &str, now: Timestamp) {
        self.pipeline.account_locked(subject_id, username, now);
    }

    /// Start the background sweep thread using the configured interval.
    pub fn spawn_periodic_sweep(&self) -> SweepHandle {
        spawn_periodic_sweep(
            self.pipeline.clone(),
            Duration::from_secs(self.config.alerts.sweep_interval_secs),
        )
    }
}

// Re-exported so embedders rarely need the subcrates directly.
pub use archiva_alert::AlertSeverity;
pub use archiva_core::{Role, SecurityLevel};
pub use archiva_policy::{PolicyError, PolicyOptions, ResourceRule};
