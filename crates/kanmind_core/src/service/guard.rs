//! Authorization gate shared by the services.

use crate::access::engine::{authorize, Decision, DenyReason, Resource, Verb};
use crate::access::identity::{Actor, Identity};
use crate::access::membership::MembershipResolver;
use crate::service::error::{ServiceError, ServiceResult};
use log::{debug, info};

/// Rejects anonymous actors before any resource lookup.
pub(crate) fn require_identity(actor: &Actor, operation: &'static str) -> ServiceResult<Identity> {
    match actor.identity() {
        Some(identity) => Ok(*identity),
        None => {
            info!(
                "event=authz_decision module=access status=deny op={operation} actor=anonymous reason={}",
                DenyReason::Unauthenticated
            );
            Err(ServiceError::Unauthenticated)
        }
    }
}

/// Runs the decision table and converts a denial into a service error.
pub(crate) fn enforce<M: MembershipResolver + ?Sized>(
    membership: &M,
    actor: &Actor,
    verb: Verb,
    resource: &Resource,
) -> ServiceResult<()> {
    let board = resource
        .board_id()
        .map_or_else(|| "none".to_string(), |id| id.to_string());

    match authorize(membership, actor, verb, resource)? {
        Decision::Allow => {
            debug!(
                "event=authz_decision module=access status=allow actor={} verb={} kind={} board={board}",
                actor.log_label(),
                verb.as_str(),
                resource.kind().as_str()
            );
            Ok(())
        }
        Decision::Deny(DenyReason::Unauthenticated) => Err(ServiceError::Unauthenticated),
        Decision::Deny(reason) => {
            info!(
                "event=authz_decision module=access status=deny actor={} verb={} kind={} board={board} reason={reason}",
                actor.log_label(),
                verb.as_str(),
                resource.kind().as_str()
            );
            Err(ServiceError::Forbidden {
                verb,
                kind: resource.kind(),
                reason,
            })
        }
    }
}
