use serde::{Deserialize, Serialize};

use crate::enums::Role;
use crate::transition::Transition;

/// The state of a service against which a transition's preconditions are
/// evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateContext {
  pub invoice_raised: bool,
  pub invoice_paid: bool,
  pub assignee_present: bool,
  pub actor_role: Role,
}

/// Why a transition may not fire for a given context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GateDenied {
  InvoiceNotRaised,
  InvoiceNotPaid,
  NotAssigned,
  RoleNotAllowed { actor_role: Role },
}

/// Evaluate every gate on a transition. Returns all unmet preconditions so
/// a caller can render precise refusals; an empty result means the
/// transition may fire.
///
/// The preconditions are independent: nothing here relates invoice-paid to
/// invoice-raised, matching the authoring side which never cross-validates
/// that combination.
pub fn evaluate(transition: &Transition, ctx: &GateContext) -> Vec<GateDenied> {
  let mut denied = Vec::new();

  if transition.requires_invoice_raised && !ctx.invoice_raised {
    denied.push(GateDenied::InvoiceNotRaised);
  }
  if transition.requires_invoice_paid && !ctx.invoice_paid {
    denied.push(GateDenied::InvoiceNotPaid);
  }
  if transition.requires_assignment && !ctx.assignee_present {
    denied.push(GateDenied::NotAssigned);
  }
  if !transition.allowed_roles.is_empty() && !transition.allowed_roles.contains(&ctx.actor_role) {
    denied.push(GateDenied::RoleNotAllowed {
      actor_role: ctx.actor_role,
    });
  }

  denied
}

/// Whether a transition may fire for the given context.
pub fn can_fire(transition: &Transition, ctx: &GateContext) -> bool {
  evaluate(transition, ctx).is_empty()
}
