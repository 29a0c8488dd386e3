//! Discretionary Access Control: owner-controlled sharing.
//!
//! The decision chain is first-match-wins: owner, then shared-with
//! membership, then the optional Admin override. Grant and revoke are
//! mutations owned by the resource owner (or an Admin acting on their
//! behalf) and land in the append-only permission ledger, separate from
//! the access decisions themselves.

use std::collections::BTreeSet;

use archiva_core::{
    EntryId, GrantAction, Permission, PermissionLedger, PermissionLogEntry, Role, SubjectId,
    Timestamp,
};

use crate::error::{PolicyError, PolicyResult};
use crate::types::{
    AccessDecision, PermissionGrant, PolicyOptions, RequestContext, Resource, Subject,
};

pub fn evaluate(
    subject: &Subject,
    resource: &Resource,
    _context: &RequestContext,
    options: &PolicyOptions,
) -> AccessDecision {
    if resource.owner_id == subject.id {
        return AccessDecision::allow("DAC: Subject is the resource owner.");
    }

    if resource.shared_with.contains(&subject.id) {
        return AccessDecision::allow("DAC: Resource explicitly shared with subject by owner.");
    }

    if options.dac_admin_override && subject.role == Role::Admin {
        return AccessDecision::allow("DAC: Admin override (deployment policy).");
    }

    AccessDecision::deny("DAC: Resource not shared with subject by resource owner.")
}

/// Share a resource with a grantee, merging `permissions` into any
/// existing grant. Only the owner or an Admin may grant. Returns the
/// ledger entry that was appended.
pub fn grant_access(
    resource: &mut Resource,
    grantor: &Subject,
    grantee: &SubjectId,
    permissions: &[Permission],
    ledger: &dyn PermissionLedger,
    now: Timestamp,
) -> PolicyResult<PermissionLogEntry> {
    authorize_mutation(resource, grantor)?;

    let grant = resource
        .grants
        .entry(grantee.clone())
        .or_insert_with(|| PermissionGrant {
            permissions: BTreeSet::new(),
            granted_by: grantor.id.clone(),
            granted_at: now,
        });
    grant.permissions.extend(permissions.iter().copied());
    resource.shared_with.insert(grantee.clone());

    let entry = PermissionLogEntry {
        id: EntryId::generate(),
        resource_id: resource.id.clone(),
        grantor: grantor.id.clone(),
        grantee: grantee.clone(),
        permissions: permissions.to_vec(),
        action: GrantAction::Grant,
        timestamp: now,
    };
    ledger
        .append(entry.clone())
        .map_err(|e| PolicyError::Ledger(e.to_string()))?;

    tracing::info!(
        resource = %resource.id,
        grantor = %grantor.id,
        grantee = %grantee,
        "DAC grant recorded"
    );
    Ok(entry)
}

/// Remove a grantee's share and grants. Only the owner or an Admin may
/// revoke. The revoked permission set is recorded in the ledger entry.
pub fn revoke_access(
    resource: &mut Resource,
    grantor: &Subject,
    grantee: &SubjectId,
    ledger: &dyn PermissionLedger,
    now: Timestamp,
) -> PolicyResult<PermissionLogEntry> {
    authorize_mutation(resource, grantor)?;

    let revoked: Vec<Permission> = resource
        .grants
        .remove(grantee)
        .map(|g| g.permissions.into_iter().collect())
        .unwrap_or_default();
    resource.shared_with.remove(grantee);

    let entry = PermissionLogEntry {
        id: EntryId::generate(),
        resource_id: resource.id.clone(),
        grantor: grantor.id.clone(),
        grantee: grantee.clone(),
        permissions: revoked,
        action: GrantAction::Revoke,
        timestamp: now,
    };
    ledger
        .append(entry.clone())
        .map_err(|e| PolicyError::Ledger(e.to_string()))?;

    tracing::info!(
        resource = %resource.id,
        grantor = %grantor.id,
        grantee = %grantee,
        "DAC revocation recorded"
    );
    Ok(entry)
}

fn authorize_mutation(resource: &Resource, grantor: &Subject) -> PolicyResult<()> {
    if resource.owner_id != grantor.id && grantor.role != Role::Admin {
        return Err(PolicyError::Unauthorized(
            "only the resource owner or an administrator may change sharing".to_string(),
        ));
    }
    Ok(())
}
