//! Ordered provisioning plan and its validation rules.

use std::collections::HashSet;

use crate::domain::error::PlanError;
use crate::domain::step::{Action, HardeningAction, Stage, Step};

/// Validated, ordered sequence of steps.
///
/// Construction enforces three invariants: stages never go backwards, step ids
/// are unique, and the firewall is only enabled after administrative access
/// has been allow-listed.
#[derive(Debug, Clone)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// Validate `steps` and wrap them in a plan.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError`] naming the first violated invariant.
    pub fn new(steps: Vec<Step>) -> Result<Self, PlanError> {
        let mut seen = HashSet::new();
        let mut current = Stage::Privilege;
        let mut admin_allowed = false;

        for step in &steps {
            if !seen.insert(step.id) {
                return Err(PlanError::DuplicateStep(step.id));
            }
            let stage = step.stage();
            if stage < current {
                return Err(PlanError::StageOutOfOrder {
                    step: step.id,
                    stage: stage.label(),
                });
            }
            current = stage;

            match &step.action {
                Action::Hardening(HardeningAction::AllowAdminAccess(_)) => admin_allowed = true,
                Action::Hardening(HardeningAction::EnableFirewall) if !admin_allowed => {
                    return Err(PlanError::FirewallBeforeAdminAccess);
                }
                _ => {}
            }
        }

        Ok(Self { steps })
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of a step by id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }
}
