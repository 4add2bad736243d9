//! Hardening stage: timezone and firewall.

use anyhow::Result;

use crate::application::ports::HostSystem;
use crate::domain::config::ProvisionConfig;
use crate::domain::report::StepOutcome;
use crate::domain::step::{Action, HardeningAction, Readiness, Step};

pub fn steps(config: &ProvisionConfig) -> Vec<Step> {
    vec![
        Step::warn(
            "set-timezone",
            format!("Setting timezone to {}", config.timezone),
            Action::Hardening(HardeningAction::SetTimezone(config.timezone.clone())),
        ),
        Step::fatal(
            "allow-admin-access",
            format!("Allowing {} through the firewall", config.admin_access_rule),
            Action::Hardening(HardeningAction::AllowAdminAccess(
                config.admin_access_rule.clone(),
            )),
        ),
        Step::fatal(
            "enable-firewall",
            "Enabling firewall",
            Action::Hardening(HardeningAction::EnableFirewall),
        ),
    ]
}

pub async fn readiness(action: &HardeningAction, host: &impl HostSystem) -> Result<Readiness> {
    let done = match action {
        HardeningAction::SetTimezone(tz) => host.timezone().await? == *tz,
        HardeningAction::AllowAdminAccess(_) => false,
        HardeningAction::EnableFirewall => host.firewall_active().await?,
    };
    Ok(if done { Readiness::Satisfied } else { Readiness::Pending })
}

pub async fn apply(action: &HardeningAction, host: &impl HostSystem) -> Result<StepOutcome> {
    match action {
        HardeningAction::SetTimezone(tz) => host.set_timezone(tz).await?,
        HardeningAction::AllowAdminAccess(rule) => host.allow_rule(rule).await?,
        HardeningAction::EnableFirewall => host.enable_firewall().await?,
    }
    Ok(StepOutcome::Applied)
}
