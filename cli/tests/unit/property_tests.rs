//! Property-based tests for plan ordering, stderr capture and settings validation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use birthday_provision::domain::command::{CommandLine, StderrTail};
use birthday_provision::domain::config::{validate_service_name, validate_timezone};
use birthday_provision::domain::error::PlanError;
use birthday_provision::domain::plan::Plan;
use birthday_provision::domain::step::{Action, HardeningAction, PackageAction, Step};
use birthday_provision::domain::users;

fn hardening_steps() -> Vec<Step> {
    vec![
        Step::warn(
            "set-timezone",
            "Setting timezone",
            Action::Hardening(HardeningAction::SetTimezone("UTC".into())),
        ),
        Step::fatal(
            "allow-admin-access",
            "Allowing SSH",
            Action::Hardening(HardeningAction::AllowAdminAccess("OpenSSH".into())),
        ),
        Step::fatal(
            "enable-firewall",
            "Enabling firewall",
            Action::Hardening(HardeningAction::EnableFirewall),
        ),
    ]
}

// ============================================================================
// Plan ordering
// ============================================================================

proptest! {
    /// A plan is accepted exactly when the admin rule precedes enabling the firewall.
    #[test]
    fn prop_firewall_order_is_enforced(steps in Just(hardening_steps()).prop_shuffle()) {
        let allow = steps.iter().position(|s| s.id == "allow-admin-access");
        let enable = steps.iter().position(|s| s.id == "enable-firewall");
        let result = Plan::new(steps);
        if allow < enable {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result.err(), Some(PlanError::FirewallBeforeAdminAccess));
        }
    }

    /// Package steps placed after hardening are always rejected.
    #[test]
    fn prop_stage_regression_rejected(insert_at in 0usize..3) {
        let mut steps = hardening_steps();
        steps.insert(
            insert_at + 1,
            Step::fatal("late-refresh", "Refreshing", Action::Package(PackageAction::RefreshIndex)),
        );
        let rejected = matches!(Plan::new(steps), Err(PlanError::StageOutOfOrder { step: "late-refresh", .. }));
        prop_assert!(rejected);
    }
}

// ============================================================================
// StderrTail
// ============================================================================

proptest! {
    /// The tail keeps exactly the last `capacity` lines, in order.
    #[test]
    fn prop_tail_keeps_last_lines(
        lines in prop::collection::vec("[a-z ]{0,12}", 0..60),
        capacity in 0usize..30,
    ) {
        let mut tail = StderrTail::new(capacity);
        for line in &lines {
            tail.push(line.clone());
        }
        let keep = lines.len().min(capacity);
        let expected = lines[lines.len() - keep..].join("\n");
        prop_assert_eq!(tail.render(), expected);
    }
}

// ============================================================================
// Command display
// ============================================================================

proptest! {
    /// Arguments containing shell metacharacters are always quoted.
    #[test]
    fn prop_command_display_quotes_unsafe_args(arg in "[a-z]{1,8}[ ;|&$][a-z]{0,8}") {
        let shown = CommandLine::new("echo").arg(arg.as_str()).to_string();
        prop_assert!(shown.starts_with("echo '"), "unquoted: {}", shown);
    }
}

// ============================================================================
// Settings and users-list validation
// ============================================================================

proptest! {
    /// Timezones with whitespace or shell syntax never validate.
    #[test]
    fn prop_timezone_with_metacharacters_rejected(
        zone in "[A-Z][a-z]{2,8}",
        bad in "[ ;$`'\"]",
    ) {
        prop_assert!(validate_timezone(&zone).is_ok());
        let joined = format!("{zone}{bad}x");
        prop_assert!(validate_timezone(&joined).is_err());
    }

    /// Service names never accept uppercase or path separators.
    #[test]
    fn prop_service_name_rejects_paths(name in "[a-z]{1,10}", sep in "[/A-Z ]") {
        prop_assert!(validate_service_name(&name).is_ok());
        let joined = format!("{name}{sep}bot");
        prop_assert!(validate_service_name(&joined).is_err());
    }

    /// Every real calendar day passes the users-list birthday check.
    #[test]
    fn prop_valid_birthdays_pass_lint(day in 1u32..=28, month in 1u32..=12) {
        let text = format!(
            r#"{{"users": [{{"name": "Anna", "birthday": "{day:02}.{month:02}", "chat_id": 1}}]}}"#
        );
        let issues = users::lint(&text, false);
        prop_assert!(issues.is_empty(), "{:?}", issues);
    }
}
